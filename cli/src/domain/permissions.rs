//! Workspace role assignments: desired-state planning.
//!
//! `plan_grants` diffs desired `(group, role)` pairs against the assignments a
//! workspace already has. Only additive actions are produced; an existing
//! differing role is reported, never replaced.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Fabric workspace roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkspaceRole {
    Admin,
    Member,
    Contributor,
    Viewer,
}

impl WorkspaceRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Member => "Member",
            Self::Contributor => "Contributor",
            Self::Viewer => "Viewer",
        }
    }

    /// Parse a role name as returned by the REST API.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Admin" => Some(Self::Admin),
            "Member" => Some(Self::Member),
            "Contributor" => Some(Self::Contributor),
            "Viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A desired grant as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub group: String,
    pub role: WorkspaceRole,
}

/// Existing role per principal id. Roles outside the known set are kept as
/// raw strings so a mismatch can still be reported.
pub type ExistingAssignments = HashMap<String, String>;

/// What to do for one desired grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantAction {
    /// The principal already holds the desired role.
    AlreadySatisfied,
    /// The principal holds a different role; left untouched.
    Conflict { existing: String },
    /// The principal has no role yet; issue an assignment.
    Assign,
    /// The group name is not in the security group table.
    MissingPrincipal,
}

/// One planned step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGrant {
    pub group: String,
    pub principal_id: Option<String>,
    pub role: WorkspaceRole,
    pub action: GrantAction,
}

/// Diff desired grants against existing assignments.
///
/// Grants planned as `Assign` are folded into the working view, so a
/// duplicate desired entry for the same principal resolves to
/// `AlreadySatisfied` (same role) or `Conflict` (different role).
#[must_use]
pub fn plan_grants(
    desired: &[Permission],
    existing: &ExistingAssignments,
    groups: &BTreeMap<String, String>,
) -> Vec<PlannedGrant> {
    let mut view = existing.clone();
    desired
        .iter()
        .map(|perm| {
            let Some(principal) = groups.get(&perm.group) else {
                return PlannedGrant {
                    group: perm.group.clone(),
                    principal_id: None,
                    role: perm.role,
                    action: GrantAction::MissingPrincipal,
                };
            };
            let action = match view.get(principal) {
                Some(current) if current == perm.role.as_str() => GrantAction::AlreadySatisfied,
                Some(current) => GrantAction::Conflict {
                    existing: current.clone(),
                },
                None => {
                    view.insert(principal.clone(), perm.role.as_str().to_string());
                    GrantAction::Assign
                }
            };
            PlannedGrant {
                group: perm.group.clone(),
                principal_id: Some(principal.clone()),
                role: perm.role,
                action,
            }
        })
        .collect()
}

/// Parse the `value` array of a role assignment listing.
///
/// Entries without a principal id or role are skipped.
#[must_use]
pub fn parse_assignments(items: &[Value]) -> ExistingAssignments {
    items
        .iter()
        .filter_map(|item| {
            let id = item.get("principal")?.get("id")?.as_str()?;
            let role = item.get("role")?.as_str()?;
            Some((id.to_string(), role.to_string()))
        })
        .collect()
}

/// Request body for adding a security group role assignment.
#[must_use]
pub fn assignment_body(principal_id: &str, role: WorkspaceRole) -> Value {
    json!({
        "principal": {
            "id": principal_id,
            "type": "Group",
            "groupDetails": {"groupType": "SecurityGroup"}
        },
        "role": role.as_str()
    })
}

/// REST path of a workspace's role assignments.
#[must_use]
pub fn assignments_path(workspace_id: &str) -> String {
    format!("workspaces/{workspace_id}/roleAssignments")
}
