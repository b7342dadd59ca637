//! Capacity lifecycle: existence check, create-or-resume, resume, suspend.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! State machine: `absent → active → suspended → active …`. Capacities are
//! never deleted.

use anyhow::Result;

use crate::application::ports::{Pacer, ProgressReporter, RestApi};
use crate::domain::api::ApiRequest;
use crate::domain::capacity::{CapacityRef, create_body};
use crate::domain::config::{CapacityConfig, CapacityDefaults, Pacing};
use crate::domain::error::ProvisionError;

/// What `create_or_resume` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityOutcome {
    /// The capacity existed; a resume was requested.
    Resumed,
    /// The capacity was created and the ready delay has elapsed.
    Created,
}

/// `true` iff a GET on the capacity returns 200.
pub async fn exists(api: &impl RestApi, capacity: &CapacityRef) -> bool {
    let request = ApiRequest::get(capacity.resource_path()).azure();
    match api.call(&request).await {
        Ok(reply) => reply.api().status == 200,
        Err(e) => {
            tracing::warn!(capacity = %capacity.name, error = %e, "capacity lookup failed");
            false
        }
    }
}

/// Request a resume. Fire and forget: the status is returned, not checked.
///
/// # Errors
///
/// Returns an error only if the CLI could not be launched.
pub async fn resume(api: &impl RestApi, capacity: &CapacityRef) -> Result<u16> {
    let request = ApiRequest::post(capacity.resume_path(), serde_json::json!({})).azure();
    let status = api.call(&request).await?.api().status;
    tracing::debug!(capacity = %capacity.name, status, "resume requested");
    Ok(status)
}

/// Resume the capacity if it exists, otherwise create it.
///
/// After a successful create the capacity-ready delay elapses before this
/// returns, so callers can immediately place workspaces on it.
///
/// # Errors
///
/// Returns `MissingSetting` for incomplete configuration and
/// `UnexpectedStatus` when the create call is not answered with 200/201.
pub async fn create_or_resume(
    api: &impl RestApi,
    pacer: &impl Pacer,
    reporter: &impl ProgressReporter,
    subscription_id: &str,
    config: &CapacityConfig,
    defaults: &CapacityDefaults,
    pacing: &Pacing,
) -> Result<CapacityOutcome> {
    let capacity = CapacityRef::resolve(subscription_id, config, defaults)?;

    if exists(api, &capacity).await {
        reporter.success(&format!("{} exists", capacity.name));
        let status = resume(api, &capacity).await?;
        if !matches!(status, 200 | 202) {
            reporter.warn(&format!("resume of {} answered {status}", capacity.name));
        }
        return Ok(CapacityOutcome::Resumed);
    }

    let body = create_body(config, defaults)?;
    let request = ApiRequest::put(capacity.resource_path(), body).azure();
    let response = api.call(&request).await?.api();

    if !response.is_any(&[200, 201]) {
        tracing::warn!(capacity = %capacity.name, body = %response.summary(), "create rejected");
        return Err(ProvisionError::UnexpectedStatus {
            operation: format!("create capacity {}", capacity.name),
            status: response.status,
            detail: response.summary(),
        }
        .into());
    }

    reporter.success(&format!("Created {}", capacity.name));
    pacer
        .wait(
            &format!("waiting for {} to become schedulable", capacity.name),
            pacing.capacity_ready(),
        )
        .await;
    Ok(CapacityOutcome::Created)
}

/// Suspend a capacity to stop billing.
///
/// Fixed-interval retry: up to `pacing.suspend_attempts` attempts, each
/// unsuccessful one followed by the suspend retry delay. Returns the number of
/// attempts used.
///
/// # Errors
///
/// Returns `SuspendExhausted` when no attempt is answered with 200/202.
pub async fn suspend(
    api: &impl RestApi,
    pacer: &impl Pacer,
    reporter: &impl ProgressReporter,
    capacity: &CapacityRef,
    pacing: &Pacing,
) -> Result<u32> {
    let request = ApiRequest::post(capacity.suspend_path(), serde_json::json!({})).azure();

    for attempt in 1..=pacing.suspend_attempts {
        match api.call(&request).await {
            Ok(reply) => {
                let status = reply.api().status;
                if matches!(status, 200 | 202) {
                    reporter.success(&format!("Suspended {}", capacity.name));
                    return Ok(attempt);
                }
                tracing::warn!(capacity = %capacity.name, attempt, status, "suspend not accepted");
            }
            Err(e) => {
                tracing::warn!(capacity = %capacity.name, attempt, error = %e, "suspend call failed");
            }
        }
        pacer
            .wait(
                &format!("retrying suspend of {} ({attempt}/{})", capacity.name, pacing.suspend_attempts),
                pacing.suspend_retry(),
            )
            .await;
    }

    Err(ProvisionError::SuspendExhausted(capacity.name.clone(), pacing.suspend_attempts).into())
}
