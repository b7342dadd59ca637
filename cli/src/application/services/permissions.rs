//! Workspace role assignment for security groups.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::collections::BTreeMap;

use crate::application::ports::{Pacer, ProgressReporter, RestApi};
use crate::domain::api::ApiRequest;
use crate::domain::config::Pacing;
use crate::domain::permissions::{
    ExistingAssignments, GrantAction, Permission, assignment_body, assignments_path,
    parse_assignments, plan_grants,
};

/// Per-group results of one `assign_permissions` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PermissionSummary {
    pub assigned: Vec<String>,
    pub unchanged: Vec<String>,
    /// `(group, existing role)` pairs left untouched.
    pub conflicts: Vec<(String, String)>,
    /// `(group, reason)` pairs that could not be granted.
    pub failed: Vec<(String, String)>,
}

impl PermissionSummary {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line description for the run report.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = vec![
            format!("{} assigned", self.assigned.len()),
            format!("{} unchanged", self.unchanged.len()),
        ];
        if !self.conflicts.is_empty() {
            parts.push(format!("{} conflicting", self.conflicts.len()));
        }
        if !self.failed.is_empty() {
            let groups: Vec<&str> = self.failed.iter().map(|(g, _)| g.as_str()).collect();
            parts.push(format!("failed: {}", groups.join(", ")));
        }
        parts.join(", ")
    }
}

/// Current role per principal id. A failed listing yields an empty map.
pub async fn existing_assignments(api: &impl RestApi, workspace_id: &str) -> ExistingAssignments {
    let request = ApiRequest::get(assignments_path(workspace_id));
    match api.call(&request).await {
        Ok(reply) => {
            let response = reply.api();
            if response.status == 200 {
                parse_assignments(response.items())
            } else {
                tracing::warn!(
                    workspace_id,
                    status = response.status,
                    "could not list role assignments; treating as none"
                );
                ExistingAssignments::new()
            }
        }
        Err(e) => {
            tracing::warn!(workspace_id, error = %e, "role assignment listing failed");
            ExistingAssignments::new()
        }
    }
}

/// Grant each desired `(group, role)` pair that is not already satisfied.
///
/// Waits the role-settle delay first: a freshly created workspace rejects
/// assignments for a short while.
pub async fn assign_permissions(
    api: &impl RestApi,
    pacer: &impl Pacer,
    reporter: &impl ProgressReporter,
    workspace_id: &str,
    desired: &[Permission],
    groups: &BTreeMap<String, String>,
    pacing: &Pacing,
) -> PermissionSummary {
    pacer
        .wait("waiting before assigning roles", pacing.role_settle())
        .await;

    let existing = existing_assignments(api, workspace_id).await;
    let mut summary = PermissionSummary::default();

    for grant in plan_grants(desired, &existing, groups) {
        match grant.action {
            GrantAction::AlreadySatisfied => {
                reporter.success(&format!("{} already has {}", grant.group, grant.role));
                summary.unchanged.push(grant.group);
            }
            GrantAction::Conflict { existing } => {
                reporter.warn(&format!(
                    "{} has {existing}, not {}; leaving it unchanged",
                    grant.group, grant.role
                ));
                summary.conflicts.push((grant.group, existing));
            }
            GrantAction::MissingPrincipal => {
                reporter.error(&format!("no principal id configured for {}", grant.group));
                summary
                    .failed
                    .push((grant.group, "missing principal id".to_string()));
            }
            GrantAction::Assign => {
                let Some(principal) = grant.principal_id.as_deref() else {
                    continue;
                };
                let request = ApiRequest::post(
                    assignments_path(workspace_id),
                    assignment_body(principal, grant.role),
                );
                match api.call(&request).await {
                    Ok(reply) => {
                        let response = reply.api();
                        if response.is_any(&[200, 201]) {
                            reporter.success(&format!("Granted {} to {}", grant.role, grant.group));
                            summary.assigned.push(grant.group);
                        } else {
                            tracing::warn!(
                                group = %grant.group,
                                status = response.status,
                                body = %response.summary(),
                                "role assignment rejected"
                            );
                            reporter.error(&format!("could not grant {} to {}", grant.role, grant.group));
                            summary
                                .failed
                                .push((grant.group, format!("status {}", response.status)));
                        }
                    }
                    Err(e) => {
                        reporter.error(&format!("could not grant {} to {}", grant.role, grant.group));
                        summary.failed.push((grant.group, format!("{e:#}")));
                    }
                }
            }
        }
    }

    summary
}
