//! Provision command

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::ConfigSource;
use crate::application::services::provision::provision_solution;
use crate::application::services::session::Session;
use crate::commands::{load_config, login};

/// Run the provision command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or authentication
/// fails.
pub async fn run(app: &AppContext, source: &impl ConfigSource) -> Result<ExitCode> {
    let config = load_config(source)?;
    let env = login(app).await?;

    let reporter = app.reporter();
    let session = Session {
        cli: &app.fabric,
        pacer: &reporter,
        reporter: &reporter,
        pacing: &config.pacing,
    };
    let report = provision_solution(&session, &config, env.git_token()).await;
    app.finish(&report)
}
