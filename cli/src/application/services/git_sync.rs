//! Source control connection, workspace git binding, and pulls.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, RestApi};
use crate::domain::api::{ApiRequest, ApiResponse, StatusClass};
use crate::domain::config::GitConfig;
use crate::domain::error::ProvisionError;
use crate::domain::git::{
    CONNECTIONS_PATH, GitStatus, NOT_INITIALIZED_ERROR, connect_body, connect_path,
    connection_body, connection_name, find_connection, initialize_path, status_path, update_body,
    update_path,
};

/// Connection ids resolved during one run, keyed by `(owner, repository)`.
#[derive(Debug, Default)]
pub struct ConnectionCache {
    ids: HashMap<(String, String), String>,
}

impl ConnectionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Cached id for the repository, or look it up and create it if needed.
    ///
    /// # Errors
    ///
    /// See [`get_or_create_connection`].
    pub async fn get_or_create(
        &mut self,
        api: &impl RestApi,
        reporter: &impl ProgressReporter,
        git: &GitConfig,
        token: Option<&str>,
    ) -> Result<String> {
        let key = (git.organization.clone(), git.repository.clone());
        if let Some(id) = self.ids.get(&key) {
            return Ok(id.clone());
        }
        let id =
            get_or_create_connection(api, reporter, &git.organization, &git.repository, token)
                .await?;
        self.ids.insert(key, id.clone());
        Ok(id)
    }
}

/// Find the shared connection for `owner/repository` by display name, or
/// create it with the personal access token.
///
/// # Errors
///
/// Returns `MissingGitToken` when no connection exists and no token is
/// available, `UnexpectedStatus` when the create call is rejected, and
/// `MissingConnectionId` when the created connection has no id.
pub async fn get_or_create_connection(
    api: &impl RestApi,
    reporter: &impl ProgressReporter,
    owner: &str,
    repository: &str,
    token: Option<&str>,
) -> Result<String> {
    let name = connection_name(owner, repository);

    let listing = api.call(&ApiRequest::get(CONNECTIONS_PATH)).await?.api();
    if listing.status == 200 {
        if let Some(id) = find_connection(listing.items(), &name) {
            reporter.success(&format!("Using connection {name}"));
            return Ok(id.to_string());
        }
    } else {
        tracing::warn!(status = listing.status, "could not list connections");
    }

    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or(ProvisionError::MissingGitToken)?;

    let request = ApiRequest::post(CONNECTIONS_PATH, connection_body(owner, repository, token));
    let response = api.call(&request).await?.api();
    if !response.is_any(&[200, 201]) {
        return Err(ProvisionError::UnexpectedStatus {
            operation: format!("create connection {name}"),
            status: response.status,
            detail: response.summary(),
        }
        .into());
    }

    let id = response
        .str_field("id")
        .ok_or_else(|| ProvisionError::MissingConnectionId {
            owner: owner.to_string(),
            repository: repository.to_string(),
        })?;
    reporter.success(&format!("Created connection {name}"));
    Ok(id.to_string())
}

/// What `connect_workspace` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    AlreadyConnected,
    Connected,
}

async fn git_status(api: &impl RestApi, workspace_id: &str) -> Result<ApiResponse> {
    let reply = api
        .call(&ApiRequest::get(status_path(workspace_id)))
        .await
        .context("git status query failed")?;
    if reply.is_blank() {
        return Err(ProvisionError::EmptyResponse {
            operation: "git status".to_string(),
        }
        .into());
    }
    Ok(reply.api())
}

/// Bind a workspace to `directory` on the configured branch.
///
/// A workspace whose status already reports a connection state or a remote
/// commit is left as is.
///
/// # Errors
///
/// Returns `EmptyResponse` or `UnexpectedStatus` when the connect call is not
/// answered with 200/201.
pub async fn connect_workspace(
    api: &impl RestApi,
    reporter: &impl ProgressReporter,
    workspace_id: &str,
    directory: &str,
    git: &GitConfig,
    connection_id: &str,
) -> Result<ConnectOutcome> {
    let status = api
        .call(&ApiRequest::get(status_path(workspace_id)))
        .await?
        .api();
    if status.status == 200 && GitStatus::from_response(&status).is_bound() {
        reporter.success("Already connected to git");
        return Ok(ConnectOutcome::AlreadyConnected);
    }

    let request = ApiRequest::post(
        connect_path(workspace_id),
        connect_body(git, directory, connection_id),
    );
    let reply = api.call(&request).await?;
    if reply.is_blank() {
        return Err(ProvisionError::EmptyResponse {
            operation: "git connect".to_string(),
        }
        .into());
    }
    let response = reply.api();
    if !response.is_any(&[200, 201]) {
        return Err(ProvisionError::UnexpectedStatus {
            operation: "git connect".to_string(),
            status: response.status,
            detail: response.summary(),
        }
        .into());
    }

    reporter.success(&format!(
        "Connected to {}/{} ({}:{directory})",
        git.organization, git.repository, git.branch
    ));
    Ok(ConnectOutcome::Connected)
}

/// What `initialize_connection` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeOutcome {
    /// The service answered 200/201/202.
    Initialized,
    /// The CLI printed nothing; initialization runs asynchronously.
    AcceptedNoContent,
}

/// Initialize a freshly bound git connection.
///
/// # Errors
///
/// Returns `UnexpectedStatus` when a reply is printed and its status is not
/// 200/201/202.
pub async fn initialize_connection(
    api: &impl RestApi,
    workspace_id: &str,
) -> Result<InitializeOutcome> {
    let request = ApiRequest::post(initialize_path(workspace_id), serde_json::json!({}));
    let reply = api.call(&request).await?;
    if reply.is_blank() {
        return Ok(InitializeOutcome::AcceptedNoContent);
    }
    let response = reply.api();
    if response.is_ok() {
        return Ok(InitializeOutcome::Initialized);
    }
    Err(ProvisionError::UnexpectedStatus {
        operation: "git initialize".to_string(),
        status: response.status,
        detail: response.summary(),
    }
    .into())
}

/// What `update_from_git` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The update was accepted for `commit`.
    Updated { commit: String },
    /// The CLI printed nothing; the service accepts the update without a body.
    AcceptedNoContent { commit: String },
}

/// Pull the latest remote commit into the workspace.
///
/// A workspace bound but never initialized is initialized once and its status
/// queried again, whatever the initialize call answered.
///
/// # Errors
///
/// Returns `EmptyResponse` for an empty status reply, `UnexpectedStatus` for
/// any non-200 status or a rejected update, and `NoRemoteCommit` when the
/// status carries no commit hash.
pub async fn update_from_git(
    api: &impl RestApi,
    reporter: &impl ProgressReporter,
    workspace_id: &str,
) -> Result<SyncOutcome> {
    let mut status = git_status(api, workspace_id).await?;

    if status.class() == StatusClass::ClientError
        && status.error_code() == Some(NOT_INITIALIZED_ERROR)
    {
        reporter.step("Initializing git connection");
        if let Err(e) = initialize_connection(api, workspace_id).await {
            tracing::warn!(workspace_id, error = %e, "git initialize not accepted; re-checking status");
        }
        status = git_status(api, workspace_id).await?;
    }

    if status.status != 200 {
        return Err(ProvisionError::UnexpectedStatus {
            operation: "git status".to_string(),
            status: status.status,
            detail: status.summary(),
        }
        .into());
    }

    let commit = GitStatus::from_response(&status)
        .remote_commit_hash
        .ok_or(ProvisionError::NoRemoteCommit)?;

    let request = ApiRequest::post(update_path(workspace_id), update_body(&commit));
    let reply = api.call(&request).await?;
    if reply.is_blank() {
        reporter.success(&format!("Update to {} accepted", short_hash(&commit)));
        return Ok(SyncOutcome::AcceptedNoContent { commit });
    }

    let response = reply.api();
    if !response.is_ok() {
        return Err(ProvisionError::UnexpectedStatus {
            operation: "git update".to_string(),
            status: response.status,
            detail: response.summary(),
        }
        .into());
    }
    reporter.success(&format!("Updated to {}", short_hash(&commit)));
    Ok(SyncOutcome::Updated { commit })
}

fn short_hash(commit: &str) -> &str {
    commit.get(..8).unwrap_or(commit)
}
