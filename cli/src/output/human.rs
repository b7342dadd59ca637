//! Human-readable terminal renderer.

use crate::domain::report::RunReport;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("fabric-deploy {version}");
    }

    /// Render the end-of-run summary.
    ///
    /// Failures are repeated on stderr even when `quiet` is set.
    pub fn render_report(&self, report: &RunReport) {
        let failed: Vec<_> = report.failures().collect();
        let succeeded = report.results.len() - failed.len();

        self.ctx.header("Summary");
        self.ctx.kv("Command:", &report.command);
        self.ctx.kv("Succeeded:", &succeeded.to_string());
        self.ctx.kv("Failed:", &failed.len().to_string());
        if let Some(finished) = report.finished_at {
            let elapsed = finished - report.started_at;
            self.ctx.kv("Elapsed:", &format_elapsed(elapsed.num_seconds()));
        }

        if failed.is_empty() {
            self.ctx.success("All steps completed");
            return;
        }
        for result in failed {
            self.ctx.error(&format!(
                "{} [{}]: {}",
                result.unit,
                result.step.as_str(),
                result.detail
            ));
        }
    }
}

/// Format seconds as `1h 2m 3s`, omitting leading zero units.
#[must_use]
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}
