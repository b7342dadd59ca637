//! Workspace lifecycle: existence check, id resolution, idempotent create.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::{ItemCatalog, Pacer, ProgressReporter};
use crate::domain::config::Pacing;
use crate::domain::error::ProvisionError;
use crate::domain::workspace::{IdSource, ResolvedId, extract_uuid, item_path, structured_id};

/// What `create` did, with the id when it could be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceOutcome {
    Existing { id: Option<String> },
    Created { id: Option<String> },
}

impl WorkspaceOutcome {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Existing { id } | Self::Created { id } => id.as_deref(),
        }
    }

    #[must_use]
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// `true` iff `fab ls <name>.Workspace` exits 0.
pub async fn exists(cli: &impl ItemCatalog, name: &str) -> bool {
    cli.ls(&item_path(name))
        .await
        .map(|r| r.success())
        .unwrap_or(false)
}

/// Resolve a workspace id by name.
///
/// The structured `-q id` query is tried first. When it yields nothing
/// usable, the raw output is scanned for a UUID; that fallback is logged so
/// CLI output drift is visible.
pub async fn get_id(cli: &impl ItemCatalog, name: &str) -> Option<ResolvedId> {
    let reply = match cli.get(&item_path(name), "id").await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(workspace = name, error = %e, "workspace id query failed");
            return None;
        }
    };

    if reply.success()
        && let Some(id) = structured_id(&reply.stdout)
    {
        return Some(ResolvedId {
            id,
            source: IdSource::Structured,
        });
    }

    let id = extract_uuid(&reply.stdout)?;
    tracing::warn!(
        workspace = name,
        exit_code = ?reply.code,
        "workspace id taken from free-text output; structured query returned nothing usable"
    );
    Some(ResolvedId {
        id,
        source: IdSource::PatternFallback,
    })
}

/// Create a workspace bound to `capacity`, or return the existing one.
///
/// # Errors
///
/// Returns `CliFailed` when the create command exits non-zero. A workspace
/// that was created but whose id cannot be resolved is not an error.
pub async fn create(
    cli: &impl ItemCatalog,
    pacer: &impl Pacer,
    reporter: &impl ProgressReporter,
    name: &str,
    capacity: &str,
    pacing: &Pacing,
) -> Result<WorkspaceOutcome> {
    if exists(cli, name).await {
        reporter.success(&format!("{name} exists"));
        let id = get_id(cli, name).await.map(|r| r.id);
        return Ok(WorkspaceOutcome::Existing { id });
    }

    let path = item_path(name);
    let reply = cli
        .create(&path, &[format!("capacityname={capacity}")])
        .await?;
    if !reply.success() {
        tracing::warn!(workspace = name, stdout = %reply.stdout, "create failed");
        return Err(ProvisionError::CliFailed {
            command: format!("fab create {path}"),
            code: reply.code,
            stderr: reply.stderr.trim().to_string(),
        }
        .into());
    }
    reporter.success(&format!("Created {name}"));

    pacer
        .wait(
            &format!("waiting for {name} to be provisioned"),
            pacing.workspace_ready(),
        )
        .await;

    let id = get_id(cli, name).await.map(|r| r.id);
    if id.is_none() {
        reporter.warn(&format!("{name} created but its id could not be retrieved"));
    }
    Ok(WorkspaceOutcome::Created { id })
}
