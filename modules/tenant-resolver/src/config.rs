//! Configuration for the tenant resolver.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TenantResolverConfig {
    /// Hosts containing any of these resolve to the host tenant.
    pub loopback_markers: Vec<String>,

    /// Tenancy name of the host tenant.
    pub host_tenancy_name: String,
}

impl Default for TenantResolverConfig {
    fn default() -> Self {
        Self {
            loopback_markers: vec!["localhost".to_owned(), "127.0.0.1".to_owned()],
            host_tenancy_name: voxbox_directory::tenant::HOST_TENANCY_NAME.to_owned(),
        }
    }
}
