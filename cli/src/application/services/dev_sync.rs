//! Application service: pull the latest commit into development workspaces.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use chrono::Utc;

use crate::application::ports::{ItemCatalog, Pacer, ProgressReporter, RestApi};
use crate::application::services::session::Session;
use crate::application::services::workspace;
use crate::domain::config::{SolutionConfig, WorkspaceConfig};
use crate::domain::error::ProvisionError;
use crate::domain::report::{RunReport, Step};
use crate::domain::workspace::is_dev_workspace;

/// Configured development workspaces that are bound to a repository folder.
#[must_use]
pub fn sync_targets(config: &SolutionConfig) -> Vec<&WorkspaceConfig> {
    config
        .workspaces
        .iter()
        .filter(|ws| is_dev_workspace(&ws.name) && ws.connect_to_git_folder.is_some())
        .collect()
}

/// Resolve each target's id and pull its remote commit.
pub async fn sync_dev_workspaces<F, P, R>(
    session: &Session<'_, F, P, R>,
    targets: &[&WorkspaceConfig],
) -> RunReport
where
    F: ItemCatalog + RestApi,
    P: Pacer,
    R: ProgressReporter,
{
    let mut report = RunReport::start("sync", Utc::now());
    session.reporter.section("Syncing development workspaces");

    for ws in targets {
        session.reporter.step(&format!("Workspace {}", ws.name));
        let Some(resolved) = workspace::get_id(session.cli, &ws.name).await else {
            let error = ProvisionError::WorkspaceNotFound(ws.name.clone()).into();
            session.fail(&mut report, &ws.name, Step::Workspace, &error);
            continue;
        };
        session.pull(&ws.name, &resolved.id, &mut report).await;
    }

    report.finish(Utc::now());
    report
}
