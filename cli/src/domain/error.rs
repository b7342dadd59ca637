//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Failures of a single unit of provisioning work.
///
/// The drivers record these in the run report and move on to the next unit.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{command} exited with code {code:?}: {stderr}")]
    CliFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{operation}: empty response from fab")]
    EmptyResponse { operation: String },

    #[error("{operation}: unexpected status {status}: {detail}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        detail: String,
    },

    #[error("capacity '{capacity}' has no {setting} and no default is configured")]
    MissingSetting { capacity: String, setting: String },

    #[error("capacity '{0}' could not be suspended after {1} attempts")]
    SuspendExhausted(String, u32),

    #[error("security group '{0}' is not listed under azure.security_groups")]
    MissingPrincipal(String),

    #[error("GITHUB_PAT is not set; cannot create a source control connection")]
    MissingGitToken,

    #[error("no source control connection id returned for {owner}/{repository}")]
    MissingConnectionId { owner: String, repository: String },

    #[error("git status has no remoteCommitHash; nothing to sync to")]
    NoRemoteCommit,

    #[error("github settings are missing from the configuration")]
    MissingGitConfig,

    #[error("workspace '{0}' not found")]
    WorkspaceNotFound(String),

    #[error("unknown workspace type '{0}'")]
    UnknownWorkspaceType(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while loading the solution configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}\n\nSet CONFIG_FILE or pass --config <path>.")]
    NotFound(String),

    #[error("Invalid configuration in {path}: {reason}")]
    Invalid { path: String, reason: String },
}

// ── Auth errors ───────────────────────────────────────────────────────────────

/// Terminal failures: the run cannot continue without a session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing service principal credentials: {0}")]
    MissingCredentials(String),

    #[error("Authentication failed (exit code {code:?}).\n{stderr}")]
    LoginFailed { code: Option<i32>, stderr: String },
}
