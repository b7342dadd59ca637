//! Capacity addressing and request bodies for Azure Resource Manager.

use serde_json::{Value, json};

use crate::domain::config::{CapacityConfig, CapacityDefaults};
use crate::domain::error::ProvisionError;

/// ARM API version for `Microsoft.Fabric/capacities`.
pub const CAPACITY_API_VERSION: &str = "2023-11-01";

/// Fully qualified capacity address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CapacityRef {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl CapacityRef {
    #[must_use]
    pub fn new(subscription_id: &str, resource_group: &str, name: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            name: name.to_string(),
        }
    }

    /// Resolve the address of a configured capacity.
    ///
    /// # Errors
    ///
    /// Returns `MissingSetting` when neither the entry nor the defaults name a
    /// resource group.
    pub fn resolve(
        subscription_id: &str,
        config: &CapacityConfig,
        defaults: &CapacityDefaults,
    ) -> Result<Self, ProvisionError> {
        let rg = config
            .resource_group(defaults)
            .ok_or_else(|| missing(&config.name, "resource_group"))?;
        Ok(Self::new(subscription_id, rg, &config.name))
    }

    fn base(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Fabric/capacities/{}",
            self.subscription_id, self.resource_group, self.name
        )
    }

    /// Resource path, used for GET and PUT.
    #[must_use]
    pub fn resource_path(&self) -> String {
        format!("{}?api-version={CAPACITY_API_VERSION}", self.base())
    }

    #[must_use]
    pub fn resume_path(&self) -> String {
        format!("{}/resume?api-version={CAPACITY_API_VERSION}", self.base())
    }

    #[must_use]
    pub fn suspend_path(&self) -> String {
        format!("{}/suspend?api-version={CAPACITY_API_VERSION}", self.base())
    }
}

fn missing(capacity: &str, setting: &str) -> ProvisionError {
    ProvisionError::MissingSetting {
        capacity: capacity.to_string(),
        setting: setting.to_string(),
    }
}

/// Build the PUT body for a new capacity.
///
/// Region, SKU and admin members come from the entry, falling back to the
/// defaults (`capacity_admins` for members).
///
/// # Errors
///
/// Returns `MissingSetting` when region or SKU is configured nowhere.
pub fn create_body(
    config: &CapacityConfig,
    defaults: &CapacityDefaults,
) -> Result<Value, ProvisionError> {
    let region = config
        .region
        .as_deref()
        .or(defaults.region.as_deref())
        .ok_or_else(|| missing(&config.name, "region"))?;
    let sku = config
        .sku
        .as_deref()
        .or(defaults.sku.as_deref())
        .ok_or_else(|| missing(&config.name, "sku"))?;
    let members = config
        .admin_members
        .as_ref()
        .or(defaults.capacity_admins.as_ref())
        .map(|m| m.normalized())
        .unwrap_or_default();

    Ok(json!({
        "location": region,
        "sku": {"name": sku, "tier": "Fabric"},
        "properties": {"administration": {"members": members}}
    }))
}
