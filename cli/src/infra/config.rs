//! Infrastructure implementation of the `ConfigSource` port.
//!
//! Loading is three passes over the file text: read `solution_version`,
//! replace every `{{SOLUTION_VERSION}}` token with it, expand `$VAR` and
//! `${VAR}` from the environment (unknown names are left as written), then
//! deserialize.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::ConfigSource;
use crate::domain::config::{DEFAULT_SOLUTION_VERSION, SOLUTION_VERSION_TOKEN, SolutionConfig};
use crate::domain::error::ConfigError;

/// Production implementation of `ConfigSource` that reads a YAML file on disk.
pub struct YamlConfigSource {
    path: PathBuf,
}

impl YamlConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for YamlConfigSource {
    fn load(&self) -> Result<SolutionConfig> {
        let label = self.describe();
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(label.clone())
            } else {
                ConfigError::Invalid {
                    path: label.clone(),
                    reason: e.to_string(),
                }
            }
        })?;
        let config = parse_solution(&text, &label, |name| std::env::var(name).ok())?;
        tracing::debug!(
            path = %label,
            capacities = config.capacities.len(),
            workspaces = config.workspaces.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Substitute and deserialize a solution file.
///
/// `lookup` resolves environment placeholders; names it returns `None` for
/// stay in the text unchanged.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` when the text is not valid YAML or does not
/// match the schema.
pub fn parse_solution<F>(text: &str, label: &str, lookup: F) -> Result<SolutionConfig, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    let invalid = |e: serde_yaml::Error| ConfigError::Invalid {
        path: label.to_string(),
        reason: e.to_string(),
    };

    let version = solution_version(text);
    let versioned = text.replace(SOLUTION_VERSION_TOKEN, &version);
    let expanded = shellexpand::env_with_context_no_errors(&versioned, lookup);

    serde_yaml::from_str(&expanded).map_err(invalid)
}

/// `solution_version` of the raw text.
///
/// Unquoted `{{...}}` tokens make the template invalid YAML until they are
/// replaced, so a top-level line scan backs up the structured read.
fn solution_version(text: &str) -> String {
    let structured = serde_yaml::from_str::<serde_yaml::Value>(text)
        .ok()
        .and_then(|raw| {
            raw.get("solution_version")
                .and_then(serde_yaml::Value::as_str)
                .map(String::from)
        });
    structured
        .or_else(|| {
            text.lines()
                .find_map(|line| line.strip_prefix("solution_version:"))
                .map(|v| v.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_SOLUTION_VERSION.to_string())
}
