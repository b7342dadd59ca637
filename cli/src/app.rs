//! Application context: unified state passed to every command handler.
//!
//! `AppContext` bundles the output context, the output mode, and the `fab`
//! adapter, so command handlers take a single `&AppContext`.

use std::process::ExitCode;

use anyhow::Result;

use crate::domain::report::RunReport;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::environment::resolve_fab_program;
use crate::infra::fabric_cli::FabricCliAdapter;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Exit code for a run that completed with unit failures under `--strict`.
pub const EXIT_PARTIAL: u8 = 2;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Exit non-zero when any unit of work failed.
    pub strict: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// The `fab` command-line client.
    pub fabric: FabricCliAdapter<TokioCommandRunner>,
    /// Treat unit failures as a failed run.
    pub strict: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // JSON mode keeps stdout for the final document.
        let quiet = flags.output.quiet || flags.output.json;

        let program = resolve_fab_program();
        tracing::debug!(program = %program, "using fab executable");

        Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            fabric: FabricCliAdapter::default_runner(program),
            strict: flags.behaviour.strict,
        }
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter and pacer for application services.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Render the report and map it to the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn finish(&self, report: &RunReport) -> Result<ExitCode> {
        self.renderer().render_report(report)?;
        Ok(exit_code(report, self.strict))
    }
}

/// `0` unless `strict` is set and some unit failed.
#[must_use]
pub fn exit_code(report: &RunReport, strict: bool) -> ExitCode {
    if strict && !report.is_clean() {
        ExitCode::from(EXIT_PARTIAL)
    } else {
        ExitCode::SUCCESS
    }
}
