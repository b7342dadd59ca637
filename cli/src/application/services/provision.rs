//! Application service: full solution provisioning.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use chrono::Utc;

use crate::application::ports::{ItemCatalog, Pacer, ProgressReporter, RestApi};
use crate::application::services::capacity::{self, CapacityOutcome};
use crate::application::services::git_sync::ConnectionCache;
use crate::application::services::session::{Session, WorkspaceTarget};
use crate::domain::capacity::CapacityRef;
use crate::domain::config::SolutionConfig;
use crate::domain::report::{RunReport, Step};

/// Bring every configured capacity and workspace to its desired state, then
/// suspend the capacities.
///
/// The caller must already be authenticated. Unit failures are recorded in
/// the returned report; nothing here aborts the run.
pub async fn provision_solution<F, P, R>(
    session: &Session<'_, F, P, R>,
    config: &SolutionConfig,
    git_token: Option<&str>,
) -> RunReport
where
    F: ItemCatalog + RestApi,
    P: Pacer,
    R: ProgressReporter,
{
    let mut report = RunReport::start("provision", Utc::now());
    let defaults = &config.azure.capacity_defaults;
    let subscription = config.azure.subscription_id.as_str();

    if !config.capacities.is_empty() {
        session.reporter.section("Capacities");
    }
    let mut touched = Vec::new();
    for cap in &config.capacities {
        session.reporter.step(&format!("Capacity {}", cap.name));
        match capacity::create_or_resume(
            session.cli,
            session.pacer,
            session.reporter,
            subscription,
            cap,
            defaults,
            session.pacing,
        )
        .await
        {
            Ok(CapacityOutcome::Resumed) => report.ok(&cap.name, Step::Capacity, "resumed"),
            Ok(CapacityOutcome::Created) => report.ok(&cap.name, Step::Capacity, "created"),
            Err(e) => session.fail(&mut report, &cap.name, Step::Capacity, &e),
        }
        match CapacityRef::resolve(subscription, cap, defaults) {
            Ok(r) => touched.push(r),
            Err(e) => tracing::debug!(capacity = %cap.name, error = %e, "not suspending"),
        }
    }

    if !config.workspaces.is_empty() {
        session.reporter.section("Workspaces");
    }
    let mut cache = ConnectionCache::new();
    for ws in &config.workspaces {
        let target = WorkspaceTarget {
            name: &ws.name,
            capacity: &ws.capacity,
            permissions: &ws.permissions,
            groups: &config.azure.security_groups,
            git_folder: ws.connect_to_git_folder.as_deref(),
            git: config.github.as_ref(),
            initialize: false,
        };
        session
            .provision_workspace(target, &mut cache, git_token, &mut report)
            .await;
    }

    session.suspend_all(&touched, &mut report).await;

    report.finish(Utc::now());
    report
}
