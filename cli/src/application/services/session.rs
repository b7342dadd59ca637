//! Shared per-run plumbing for the drivers, and the per-workspace pipeline
//! (create → permissions → git connect → initialize → pull) they all use.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::collections::BTreeMap;

use crate::application::ports::{ItemCatalog, Pacer, ProgressReporter, RestApi};
use crate::application::services::capacity;
use crate::application::services::git_sync::{
    self, ConnectOutcome, ConnectionCache, InitializeOutcome, SyncOutcome,
};
use crate::application::services::permissions;
use crate::application::services::workspace;
use crate::domain::capacity::CapacityRef;
use crate::domain::config::{GitConfig, Pacing};
use crate::domain::error::ProvisionError;
use crate::domain::permissions::Permission;
use crate::domain::report::{RunReport, Step};

/// The collaborators every driver needs, borrowed for the length of a run.
pub struct Session<'a, F, P, R> {
    pub cli: &'a F,
    pub pacer: &'a P,
    pub reporter: &'a R,
    pub pacing: &'a Pacing,
}

/// One workspace to bring to its desired state.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceTarget<'a> {
    pub name: &'a str,
    pub capacity: &'a str,
    pub permissions: &'a [Permission],
    /// Name → principal id.
    pub groups: &'a BTreeMap<String, String>,
    /// Repository folder to bind, if any.
    pub git_folder: Option<&'a str>,
    pub git: Option<&'a GitConfig>,
    /// Call `initializeConnection` right after a fresh connect.
    pub initialize: bool,
}

impl<F, P, R> Session<'_, F, P, R>
where
    F: ItemCatalog + RestApi,
    P: Pacer,
    R: ProgressReporter,
{
    /// Run the workspace pipeline for `target`, recording every step.
    ///
    /// A failed step skips the steps that depend on it; nothing here aborts
    /// the caller's loop.
    pub async fn provision_workspace(
        &self,
        target: WorkspaceTarget<'_>,
        cache: &mut ConnectionCache,
        git_token: Option<&str>,
        report: &mut RunReport,
    ) {
        let name = target.name;
        self.reporter.step(&format!("Workspace {name}"));

        let outcome = match workspace::create(
            self.cli,
            self.pacer,
            self.reporter,
            name,
            target.capacity,
            self.pacing,
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail(report, name, Step::Workspace, &e);
                return;
            }
        };

        let verb = if outcome.was_created() { "created" } else { "exists" };
        let Some(id) = outcome.id().map(str::to_string) else {
            report.ok(name, Step::Workspace, format!("{verb}; id unresolved, later steps skipped"));
            return;
        };
        report.ok(name, Step::Workspace, format!("{verb} ({id})"));

        if !target.permissions.is_empty() {
            let summary = permissions::assign_permissions(
                self.cli,
                self.pacer,
                self.reporter,
                &id,
                target.permissions,
                target.groups,
                self.pacing,
            )
            .await;
            if summary.is_ok() {
                report.ok(name, Step::Permissions, summary.describe());
            } else {
                report.failed(name, Step::Permissions, summary.describe());
            }
        }

        let Some(folder) = target.git_folder else {
            return;
        };
        let Some(git) = target.git else {
            self.fail(report, name, Step::GitConnect, &ProvisionError::MissingGitConfig.into());
            return;
        };

        let connection_id = match cache
            .get_or_create(self.cli, self.reporter, git, git_token)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.fail(report, name, Step::Connection, &e);
                return;
            }
        };

        match git_sync::connect_workspace(self.cli, self.reporter, &id, folder, git, &connection_id)
            .await
        {
            Ok(ConnectOutcome::AlreadyConnected) => {
                report.ok(name, Step::GitConnect, "already connected");
            }
            Ok(ConnectOutcome::Connected) => {
                report.ok(name, Step::GitConnect, format!("{}:{folder}", git.branch));
                if target.initialize {
                    match git_sync::initialize_connection(self.cli, &id).await {
                        Ok(InitializeOutcome::Initialized) => {
                            report.ok(name, Step::GitInitialize, "initialized");
                        }
                        Ok(InitializeOutcome::AcceptedNoContent) => {
                            report.ok(name, Step::GitInitialize, "accepted");
                        }
                        Err(e) => self.fail(report, name, Step::GitInitialize, &e),
                    }
                }
            }
            Err(e) => {
                self.fail(report, name, Step::GitConnect, &e);
                return;
            }
        }

        self.pull(name, &id, report).await;
    }

    /// Pull the workspace's remote commit and record the outcome.
    pub async fn pull(&self, name: &str, workspace_id: &str, report: &mut RunReport) {
        match git_sync::update_from_git(self.cli, self.reporter, workspace_id).await {
            Ok(SyncOutcome::Updated { commit }) => {
                report.ok(name, Step::GitUpdate, format!("updated to {commit}"));
            }
            Ok(SyncOutcome::AcceptedNoContent { commit }) => {
                report.ok(name, Step::GitUpdate, format!("accepted {commit}"));
            }
            Err(e) => self.fail(report, name, Step::GitUpdate, &e),
        }
    }

    /// Suspend each capacity in order, recording each outcome.
    pub async fn suspend_all(&self, capacities: &[CapacityRef], report: &mut RunReport) {
        if capacities.is_empty() {
            return;
        }
        self.reporter.section("Suspending capacities");
        self.pacer
            .wait("letting workspace operations settle", self.pacing.pre_suspend_settle())
            .await;
        for cap in capacities {
            match capacity::suspend(self.cli, self.pacer, self.reporter, cap, self.pacing).await {
                Ok(attempts) => {
                    report.ok(&cap.name, Step::Suspend, format!("suspended after {attempts} attempt(s)"));
                }
                Err(e) => self.fail(report, &cap.name, Step::Suspend, &e),
            }
        }
    }

    /// Report a unit failure to the user and record it.
    pub fn fail(&self, report: &mut RunReport, unit: &str, step: Step, error: &anyhow::Error) {
        self.reporter.error(&format!("{unit}: {error:#}"));
        report.failed(unit, step, format!("{error:#}"));
    }
}
