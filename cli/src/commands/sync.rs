//! Sync command

use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;

use crate::app::AppContext;
use crate::application::ports::{ConfigSource, ProgressReporter};
use crate::application::services::dev_sync::{sync_dev_workspaces, sync_targets};
use crate::application::services::session::Session;
use crate::commands::{load_config, login};
use crate::domain::report::RunReport;

/// Run the sync command.
///
/// With no development workspaces configured this warns and exits without
/// logging in.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or authentication
/// fails.
pub async fn run(app: &AppContext, source: &impl ConfigSource) -> Result<ExitCode> {
    let config = load_config(source)?;
    let targets = sync_targets(&config);

    let reporter = app.reporter();
    if targets.is_empty() {
        reporter.warn("No development workspaces with a git folder are configured");
        let mut report = RunReport::start("sync", Utc::now());
        report.finish(Utc::now());
        return app.finish(&report);
    }

    login(app).await?;

    let session = Session {
        cli: &app.fabric,
        pacer: &reporter,
        reporter: &reporter,
        pacing: &config.pacing,
    };
    let report = sync_dev_workspaces(&session, &targets).await;
    app.finish(&report)
}
