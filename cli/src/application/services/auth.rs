//! Application service: service principal login.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{ProgressReporter, SessionAuth};
use crate::domain::credentials::ServicePrincipal;
use crate::domain::error::AuthError;

/// Log the CLI in as the service principal.
///
/// This is the only failure that aborts a run.
///
/// # Errors
///
/// Returns `AuthError::LoginFailed` if the CLI cannot be launched or exits
/// non-zero.
pub async fn authenticate(
    cli: &impl SessionAuth,
    reporter: &impl ProgressReporter,
    principal: &ServicePrincipal,
) -> Result<(), AuthError> {
    reporter.section("Authenticating");
    let reply = cli
        .login(principal)
        .await
        .map_err(|e| AuthError::LoginFailed {
            code: None,
            stderr: format!("{e:#}"),
        })?;

    if !reply.success() {
        tracing::debug!(stdout = %reply.stdout, "login output");
        return Err(AuthError::LoginFailed {
            code: reply.code,
            stderr: reply.stderr.trim().to_string(),
        });
    }

    reporter.success("Authenticated");
    Ok(())
}
