//! Run report: the per-unit outcome ledger of one invocation.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which operation a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Capacity,
    Resume,
    Workspace,
    Permissions,
    Connection,
    GitConnect,
    GitInitialize,
    GitUpdate,
    Suspend,
}

impl Step {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Capacity => "capacity",
            Self::Resume => "resume",
            Self::Workspace => "workspace",
            Self::Permissions => "permissions",
            Self::Connection => "connection",
            Self::GitConnect => "git_connect",
            Self::GitInitialize => "git_initialize",
            Self::GitUpdate => "git_update",
            Self::Suspend => "suspend",
        }
    }
}

/// Outcome of one unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitResult {
    /// Capacity or workspace name the step acted on.
    pub unit: String,
    pub step: Step,
    pub ok: bool,
    pub detail: String,
}

/// Ordered results of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub command: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub results: Vec<UnitResult>,
}

impl RunReport {
    #[must_use]
    pub fn start(command: &str, now: DateTime<Utc>) -> Self {
        Self {
            command: command.to_string(),
            started_at: now,
            finished_at: None,
            results: Vec::new(),
        }
    }

    pub fn ok(&mut self, unit: &str, step: Step, detail: impl Into<String>) {
        self.push(unit, step, true, detail.into());
    }

    pub fn failed(&mut self, unit: &str, step: Step, detail: impl Into<String>) {
        self.push(unit, step, false, detail.into());
    }

    fn push(&mut self, unit: &str, step: Step, ok: bool, detail: String) {
        self.results.push(UnitResult {
            unit: unit.to_string(),
            step,
            ok,
            detail,
        });
    }

    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.finished_at = Some(now);
    }

    /// Results that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &UnitResult> {
        self.results.iter().filter(|r| !r.ok)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}
