//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::api::{ApiRequest, CliReply};
use crate::domain::config::SolutionConfig;
use crate::domain::credentials::ServicePrincipal;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// A non-zero exit is not an error: only spawn failures and timeouts are.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(&self, program: &str, args: &[&str], timeout: Duration)
    -> Result<Output>;
}

// ── Fabric CLI Ports ──────────────────────────────────────────────────────────

/// Session management: `fab auth login`.
#[allow(async_fn_in_trait)]
pub trait SessionAuth {
    /// Log in with a service principal.
    async fn login(&self, principal: &ServicePrincipal) -> Result<CliReply>;
}

/// Item navigation verbs of the CLI: `ls`, `get`, `create`.
#[allow(async_fn_in_trait)]
pub trait ItemCatalog {
    /// List an item path; exit code 0 means the item exists.
    async fn ls(&self, path: &str) -> Result<CliReply>;
    /// Query one property of an item.
    async fn get(&self, path: &str, query: &str) -> Result<CliReply>;
    /// Create an item with `key=value` parameters.
    async fn create(&self, path: &str, params: &[String]) -> Result<CliReply>;
}

/// REST passthrough: `fab api`.
#[allow(async_fn_in_trait)]
pub trait RestApi {
    /// Issue one REST call; decode the reply with `CliReply::api`.
    async fn call(&self, request: &ApiRequest) -> Result<CliReply>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Announce a section of the run.
    fn section(&self, title: &str);
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a failure message.
    fn error(&self, message: &str);
}

// ── Pacing Port ───────────────────────────────────────────────────────────────

/// Abstracts propagation waits so services can be tested without sleeping.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    /// Wait `duration` before the next dependent call. `reason` is shown to
    /// the user while waiting.
    async fn wait(&self, reason: &str, duration: Duration);
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts loading of the solution file.
pub trait ConfigSource {
    /// Load and substitute the solution configuration.
    fn load(&self) -> Result<SolutionConfig>;
    /// Human-readable location of the configuration.
    fn describe(&self) -> String;
}
