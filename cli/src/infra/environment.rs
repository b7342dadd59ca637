//! Process environment: `.env` loading, credential variables, and the
//! location of the `fab` executable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::credentials::RunEnvironment;

/// Set by GitHub Actions runners; secrets come from the workflow there.
const CI_MARKER: &str = "GITHUB_ACTIONS";

/// Explicit override for the executable path.
pub const FABRIC_CLI_VAR: &str = "FABRIC_CLI";

/// What `load_dotenv` found.
#[derive(Debug)]
pub enum DotenvOutcome {
    SkippedInCi,
    NotFound,
    Loaded(PathBuf),
    Failed(dotenvy::Error),
}

impl DotenvOutcome {
    /// Report the outcome. Call once tracing is initialized.
    pub fn log(&self) {
        match self {
            Self::SkippedInCi => tracing::debug!("running in CI; skipping .env"),
            Self::NotFound => {}
            Self::Loaded(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Self::Failed(e) => tracing::warn!(error = %e, "could not read .env"),
        }
    }
}

/// Load `.env` from the working directory unless running in CI.
///
/// Variables already present in the process environment win. Runs before
/// logging is set up, so the outcome is returned for [`DotenvOutcome::log`].
#[must_use]
pub fn load_dotenv() -> DotenvOutcome {
    if std::env::var_os(CI_MARKER).is_some() {
        return DotenvOutcome::SkippedInCi;
    }
    classify(dotenvy::dotenv())
}

fn classify(result: dotenvy::Result<PathBuf>) -> DotenvOutcome {
    match result {
        Ok(path) => DotenvOutcome::Loaded(path),
        Err(e) if e.not_found() => DotenvOutcome::NotFound,
        Err(e) => DotenvOutcome::Failed(e),
    }
}

/// Credential variables from the process environment.
///
/// # Errors
///
/// Returns an error if a variable holds non-UTF-8 data.
pub fn read_environment() -> Result<RunEnvironment> {
    envy::from_env::<RunEnvironment>().context("cannot read credential variables")
}

/// Credential variables from explicit pairs.
///
/// # Errors
///
/// Returns an error if the pairs cannot be deserialized.
pub fn environment_from<I>(vars: I) -> Result<RunEnvironment>
where
    I: IntoIterator<Item = (String, String)>,
{
    envy::from_iter(vars).context("cannot read credential variables")
}

/// Locate the `fab` executable.
///
/// Order: `FABRIC_CLI`, the active virtualenv, `PATH`, then bare `fab`.
#[must_use]
pub fn resolve_fab_program() -> String {
    resolve_fab_with(
        |name| std::env::var(name).ok(),
        Path::exists,
        || which::which("fab").ok(),
    )
}

/// [`resolve_fab_program`] with injected lookups.
pub fn resolve_fab_with<E, X, W>(env: E, exists: X, on_path: W) -> String
where
    E: Fn(&str) -> Option<String>,
    X: Fn(&Path) -> bool,
    W: FnOnce() -> Option<PathBuf>,
{
    if let Some(explicit) = env(FABRIC_CLI_VAR).filter(|v| !v.is_empty()) {
        return explicit;
    }
    if let Some(venv) = env("VIRTUAL_ENV").filter(|v| !v.is_empty()) {
        let venv = PathBuf::from(venv);
        for candidate in [venv.join("Scripts").join("fab.exe"), venv.join("bin").join("fab")] {
            if exists(&candidate) {
                return candidate.display().to_string();
            }
        }
    }
    on_path().map_or_else(|| "fab".to_string(), |p| p.display().to_string())
}
