//! Application service: feature-branch workspaces.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! Each requested workspace type gets `<version>-<branch>-<type>` on its
//! development capacity, bound to `solution/<type>/` on the feature branch.
//! Each capacity is resumed at most once and suspended after every workspace
//! has been handled.

use chrono::Utc;

use crate::application::ports::{ItemCatalog, Pacer, ProgressReporter, RestApi};
use crate::application::services::capacity;
use crate::application::services::git_sync::ConnectionCache;
use crate::application::services::session::{Session, WorkspaceTarget};
use crate::domain::capacity::CapacityRef;
use crate::domain::config::{CapacityConfig, SolutionConfig};
use crate::domain::error::ProvisionError;
use crate::domain::permissions::Permission;
use crate::domain::report::{RunReport, Step};
use crate::domain::workspace::{feature_capacity, feature_git_directory, feature_workspace_name};

/// Parameters of a feature-branch run.
#[derive(Debug, Clone)]
pub struct FeatureRequest<'a> {
    pub branch: &'a str,
    /// Workspace types, e.g. `processing`, `datastores`, `consumption`.
    pub types: &'a [String],
    /// Grant applied to every feature workspace.
    pub grant: Permission,
    pub git_token: Option<&'a str>,
}

/// Create and sync the feature workspaces, then suspend their capacities.
pub async fn create_feature_workspaces<F, P, R>(
    session: &Session<'_, F, P, R>,
    config: &SolutionConfig,
    request: &FeatureRequest<'_>,
) -> RunReport
where
    F: ItemCatalog + RestApi,
    P: Pacer,
    R: ProgressReporter,
{
    let mut report = RunReport::start("feature", Utc::now());
    let version = config.solution_version.as_str();
    let defaults = &config.azure.capacity_defaults;
    let git = config.github.as_ref().map(|g| {
        let mut g = g.clone();
        g.branch = request.branch.to_string();
        g
    });
    let grants = std::slice::from_ref(&request.grant);

    session
        .reporter
        .section(&format!("Feature workspaces for {}", request.branch));

    let mut touched: Vec<CapacityRef> = Vec::new();
    let mut cache = ConnectionCache::new();

    for workspace_type in request.types {
        let name = feature_workspace_name(version, request.branch, workspace_type);
        let Some(capacity_name) = feature_capacity(workspace_type, version) else {
            let error = ProvisionError::UnknownWorkspaceType(workspace_type.clone()).into();
            session.fail(&mut report, &name, Step::Workspace, &error);
            continue;
        };

        let cap = match CapacityRef::resolve(
            &config.azure.subscription_id,
            &CapacityConfig::named(&capacity_name),
            defaults,
        ) {
            Ok(cap) => cap,
            Err(e) => {
                session.fail(&mut report, &capacity_name, Step::Resume, &e.into());
                continue;
            }
        };

        if !touched.contains(&cap) {
            session.reporter.step(&format!("Resuming {capacity_name}"));
            match capacity::resume(session.cli, &cap).await {
                Ok(status) => report.ok(&capacity_name, Step::Resume, format!("status {status}")),
                Err(e) => session.fail(&mut report, &capacity_name, Step::Resume, &e),
            }
            touched.push(cap);
        }

        let folder = feature_git_directory(workspace_type);
        let target = WorkspaceTarget {
            name: &name,
            capacity: &capacity_name,
            permissions: grants,
            groups: &config.azure.security_groups,
            git_folder: Some(&folder),
            git: git.as_ref(),
            initialize: true,
        };
        session
            .provision_workspace(target, &mut cache, request.git_token, &mut report)
            .await;
    }

    session.suspend_all(&touched, &mut report).await;

    report.finish(Utc::now());
    report
}
