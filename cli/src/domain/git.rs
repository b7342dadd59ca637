//! Source control connection and git binding payloads.
//!
//! Pure functions only: request bodies, REST paths, and git status parsing.

use serde_json::{Value, json};

use crate::domain::api::ApiResponse;
use crate::domain::config::GitConfig;

/// `errorCode` returned by git status for a bound but uninitialized workspace.
pub const NOT_INITIALIZED_ERROR: &str = "WorkspaceGitConnectionNotInitialized";

/// REST path of the connection collection.
pub const CONNECTIONS_PATH: &str = "connections";

/// Display name under which the connection for a repository is stored.
#[must_use]
pub fn connection_name(owner: &str, repository: &str) -> String {
    format!("GitHub-{owner}-{repository}")
}

/// Id of the first listed connection whose display name is `name`.
#[must_use]
pub fn find_connection<'a>(items: &'a [Value], name: &str) -> Option<&'a str> {
    items
        .iter()
        .filter(|c| c.get("displayName").and_then(Value::as_str) == Some(name))
        .find_map(|c| c.get("id").and_then(Value::as_str))
}

/// POST body creating a shareable GitHub source control connection.
#[must_use]
pub fn connection_body(owner: &str, repository: &str, token: &str) -> Value {
    json!({
        "connectivityType": "ShareableCloud",
        "displayName": connection_name(owner, repository),
        "connectionDetails": {
            "type": "GitHubSourceControl",
            "creationMethod": "GitHubSourceControl.Contents",
            "parameters": [{
                "dataType": "Text",
                "name": "url",
                "value": format!("https://github.com/{owner}/{repository}")
            }]
        },
        "credentialDetails": {
            "credentials": {"credentialType": "Key", "key": token}
        }
    })
}

/// POST body binding a workspace to a repository folder.
#[must_use]
pub fn connect_body(git: &GitConfig, directory: &str, connection_id: &str) -> Value {
    json!({
        "gitProviderDetails": {
            "ownerName": git.organization,
            "gitProviderType": git.provider,
            "repositoryName": git.repository,
            "branchName": git.branch,
            "directoryName": directory
        },
        "myGitCredentials": {
            "source": "ConfiguredConnection",
            "connectionId": connection_id
        }
    })
}

/// POST body pulling the repository state at `remote_commit_hash`.
///
/// Conflicts always resolve in favour of the workspace's current content.
#[must_use]
pub fn update_body(remote_commit_hash: &str) -> Value {
    json!({
        "remoteCommitHash": remote_commit_hash,
        "conflictResolution": {
            "conflictResolutionType": "Workspace",
            "conflictResolutionPolicy": "PreferWorkspace"
        },
        "options": {"allowOverrideItems": true}
    })
}

#[must_use]
pub fn status_path(workspace_id: &str) -> String {
    format!("workspaces/{workspace_id}/git/status")
}

#[must_use]
pub fn connect_path(workspace_id: &str) -> String {
    format!("workspaces/{workspace_id}/git/connect")
}

#[must_use]
pub fn initialize_path(workspace_id: &str) -> String {
    format!("workspaces/{workspace_id}/git/initializeConnection")
}

#[must_use]
pub fn update_path(workspace_id: &str) -> String {
    format!("workspaces/{workspace_id}/git/updateFromGit")
}

/// The fields of a git status body this tool acts on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GitStatus {
    pub connection_state: Option<String>,
    pub remote_commit_hash: Option<String>,
}

impl GitStatus {
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        Self {
            connection_state: response.str_field("gitConnectionState").map(String::from),
            remote_commit_hash: response.str_field("remoteCommitHash").map(String::from),
        }
    }

    /// Either indicator means the workspace is already bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.connection_state.is_some() || self.remote_commit_hash.is_some()
    }
}
