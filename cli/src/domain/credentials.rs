//! Credentials taken from the process environment.

use std::fmt;

use serde::Deserialize;

use crate::domain::error::AuthError;

/// Environment variables the tool reads, deserialized with `envy`.
///
/// Every field is optional so a partially configured environment still loads;
/// each command checks what it needs.
#[derive(Clone, Default, Deserialize)]
pub struct RunEnvironment {
    pub spn_client_id: Option<String>,
    pub spn_client_secret: Option<String>,
    pub azure_tenant_id: Option<String>,
    pub github_pat: Option<String>,
}

/// Service principal used for `fab auth login`.
#[derive(Clone)]
pub struct ServicePrincipal {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

impl RunEnvironment {
    /// The service principal, or the list of missing variables.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` naming every unset or empty
    /// variable.
    pub fn service_principal(&self) -> Result<ServicePrincipal, AuthError> {
        let fields = [
            ("SPN_CLIENT_ID", &self.spn_client_id),
            ("SPN_CLIENT_SECRET", &self.spn_client_secret),
            ("AZURE_TENANT_ID", &self.azure_tenant_id),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, v)| v.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AuthError::MissingCredentials(missing.join(", ")));
        }
        Ok(ServicePrincipal {
            client_id: self.spn_client_id.clone().unwrap_or_default(),
            client_secret: self.spn_client_secret.clone().unwrap_or_default(),
            tenant_id: self.azure_tenant_id.clone().unwrap_or_default(),
        })
    }

    /// Source control token, treating an empty value as unset.
    #[must_use]
    pub fn git_token(&self) -> Option<&str> {
        self.github_pat.as_deref().filter(|t| !t.is_empty())
    }
}

impl fmt::Debug for RunEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunEnvironment")
            .field("spn_client_id", &self.spn_client_id)
            .field("spn_client_secret", &self.spn_client_secret.as_ref().map(|_| "<redacted>"))
            .field("azure_tenant_id", &self.azure_tenant_id)
            .field("github_pat", &self.github_pat.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}
