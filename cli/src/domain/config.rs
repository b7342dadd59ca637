//! Solution configuration schema and propagation delays.
//!
//! Pure types only: no I/O, no async, no filesystem access. Loading and
//! placeholder substitution live in `crate::infra::config`.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::permissions::Permission;

// ── Constants ────────────────────────────────────────────────────────────────

/// Literal token replaced with `solution_version` before parsing.
pub const SOLUTION_VERSION_TOKEN: &str = "{{SOLUTION_VERSION}}";

/// Version used when the file does not set `solution_version`.
pub const DEFAULT_SOLUTION_VERSION: &str = "AV01";

/// Config path used when neither `--config` nor `CONFIG_FILE` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/templates/v01/v01-template.yml";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level solution file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionConfig {
    #[serde(default = "default_solution_version")]
    pub solution_version: String,
    pub azure: AzureConfig,
    #[serde(default)]
    pub github: Option<GitConfig>,
    #[serde(default)]
    pub capacities: Vec<CapacityConfig>,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceConfig>,
    #[serde(default)]
    pub pacing: Pacing,
}

fn default_solution_version() -> String {
    DEFAULT_SOLUTION_VERSION.to_string()
}

/// `azure:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub subscription_id: String,
    #[serde(default)]
    pub capacity_defaults: CapacityDefaults,
    /// Group display name → principal object id.
    #[serde(default)]
    pub security_groups: BTreeMap<String, String>,
}

/// Fallback values for every capacity entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapacityDefaults {
    pub resource_group: Option<String>,
    pub region: Option<String>,
    pub sku: Option<String>,
    pub capacity_admins: Option<AdminMembers>,
}

/// One `capacities:` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub name: String,
    pub resource_group: Option<String>,
    pub region: Option<String>,
    pub sku: Option<String>,
    pub admin_members: Option<AdminMembers>,
}

impl CapacityConfig {
    /// Capacity entry with only a name; everything else comes from defaults.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_group: None,
            region: None,
            sku: None,
            admin_members: None,
        }
    }

    /// Resource group of this capacity, falling back to the defaults.
    #[must_use]
    pub fn resource_group<'a>(&'a self, defaults: &'a CapacityDefaults) -> Option<&'a str> {
        self.resource_group
            .as_deref()
            .or(defaults.resource_group.as_deref())
    }
}

/// Capacity administrators, written either as a YAML list or as a
/// comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdminMembers {
    List(Vec<String>),
    Csv(String),
}

impl AdminMembers {
    /// Trimmed, non-empty member identifiers.
    #[must_use]
    pub fn normalized(&self) -> Vec<String> {
        let raw: Box<dyn Iterator<Item = &str>> = match self {
            Self::List(items) => Box::new(items.iter().map(String::as_str)),
            Self::Csv(text) => Box::new(text.split(',')),
        };
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// One `workspaces:` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub name: String,
    pub capacity: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Repository directory the workspace syncs with.
    pub connect_to_git_folder: Option<String>,
}

/// `github:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    pub organization: String,
    pub repository: String,
    #[serde(default = "default_git_provider")]
    pub provider: String,
    #[serde(default = "default_git_branch")]
    pub branch: String,
}

fn default_git_provider() -> String {
    "GitHub".to_string()
}

fn default_git_branch() -> String {
    "main".to_string()
}

// ── Pacing ───────────────────────────────────────────────────────────────────

/// Propagation delays and retry bounds, in seconds.
///
/// The service needs time after each of these operations before dependent
/// calls succeed. Every value can be overridden from the `pacing:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Wait after a capacity is created before it can host workspaces.
    pub capacity_ready: u64,
    /// Wait after a workspace is created before its id is queryable.
    pub workspace_ready: u64,
    /// Wait before reading role assignments of a fresh workspace.
    pub role_settle: u64,
    /// Wait between failed suspend attempts.
    pub suspend_retry: u64,
    /// Maximum suspend attempts per capacity.
    pub suspend_attempts: u32,
    /// Wait after workspace work before suspending capacities.
    pub pre_suspend_settle: u64,
}

pub const CAPACITY_READY_SECS: u64 = 40;
pub const WORKSPACE_READY_SECS: u64 = 5;
pub const ROLE_SETTLE_SECS: u64 = 10;
pub const SUSPEND_RETRY_SECS: u64 = 60;
pub const SUSPEND_ATTEMPTS: u32 = 5;
pub const PRE_SUSPEND_SETTLE_SECS: u64 = 20;

impl Default for Pacing {
    fn default() -> Self {
        Self {
            capacity_ready: CAPACITY_READY_SECS,
            workspace_ready: WORKSPACE_READY_SECS,
            role_settle: ROLE_SETTLE_SECS,
            suspend_retry: SUSPEND_RETRY_SECS,
            suspend_attempts: SUSPEND_ATTEMPTS,
            pre_suspend_settle: PRE_SUSPEND_SETTLE_SECS,
        }
    }
}

impl Pacing {
    #[must_use]
    pub fn capacity_ready(&self) -> Duration {
        Duration::from_secs(self.capacity_ready)
    }

    #[must_use]
    pub fn workspace_ready(&self) -> Duration {
        Duration::from_secs(self.workspace_ready)
    }

    #[must_use]
    pub fn role_settle(&self) -> Duration {
        Duration::from_secs(self.role_settle)
    }

    #[must_use]
    pub fn suspend_retry(&self) -> Duration {
        Duration::from_secs(self.suspend_retry)
    }

    #[must_use]
    pub fn pre_suspend_settle(&self) -> Duration {
        Duration::from_secs(self.pre_suspend_settle)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
