//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`
//! and `Pacer`.
//!
//! Wraps `&OutputContext` so application services can emit progress events
//! and wait out propagation delays without depending on any presentation
//! type directly.

use std::time::Duration;

use crate::application::ports::{Pacer, ProgressReporter};
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `warn()` prints `"  ⚠ {message}"` (suppressed when `ctx.quiet`)
/// - `error()` prints `"  ✗ {message}"` to stderr
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn section(&self, title: &str) {
        tracing::info!(section = title);
        self.ctx.header(title);
    }

    fn step(&self, message: &str) {
        tracing::info!("{message}");
        self.ctx.step(message);
    }

    fn success(&self, message: &str) {
        tracing::info!("{message}");
        self.ctx.success(message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
        self.ctx.warn(message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
        self.ctx.error(message);
    }
}

impl Pacer for TerminalReporter<'_> {
    async fn wait(&self, reason: &str, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let label = format!("{reason} ({})", progress::format_wait(duration));
        tracing::info!(seconds = duration.as_secs(), "{reason}");

        if self.ctx.show_progress() {
            let pb = progress::spinner(&label);
            tokio::time::sleep(duration).await;
            progress::finish_ok(&pb, &label);
        } else {
            self.ctx.info(&label);
            tokio::time::sleep(duration).await;
        }
    }
}
