//! Command implementations

pub mod feature;
pub mod provision;
pub mod sync;
pub mod version;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::ConfigSource;
use crate::application::services::auth::authenticate;
use crate::domain::config::SolutionConfig;
use crate::domain::credentials::RunEnvironment;
use crate::infra::environment::read_environment;

/// Load the solution configuration.
pub(crate) fn load_config(source: &impl ConfigSource) -> Result<SolutionConfig> {
    source
        .load()
        .with_context(|| format!("cannot load {}", source.describe()))
}

/// Read credentials from the environment and log the CLI in.
pub(crate) async fn login(app: &AppContext) -> Result<RunEnvironment> {
    let env = read_environment()?;
    let principal = env.service_principal()?;
    authenticate(&app.fabric, &app.reporter(), &principal).await?;
    Ok(env)
}
