//! Request-scoped tenant identity.
//!
//! A [`TenantContext`] is created for every inbound request, filled in by the
//! tenant resolver middleware and cleared once the handler returns. Clones
//! share the same state, so the persistence layer always observes the value
//! the resolver wrote for the current request.

use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

/// Point-in-time copy of the resolved tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TenantSnapshot {
    pub tenant_id: Option<Uuid>,
    pub is_host: bool,
    pub tenancy_name: Option<String>,
}

impl TenantSnapshot {
    /// Whether reads must be restricted to `tenant_id`.
    ///
    /// No tenant means no restriction, and the host tenant sees every tenant.
    #[must_use]
    pub fn restricts_to(&self) -> Option<Uuid> {
        if self.is_host { None } else { self.tenant_id }
    }
}

/// Shared handle to the tenant resolved for one request.
///
/// Never share one instance between concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    inner: Arc<RwLock<TenantSnapshot>>,
}

impl TenantContext {
    /// Empty context: no tenant, not host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context already populated, mostly useful for jobs and tests.
    #[must_use]
    pub fn for_tenant(tenant_id: Uuid, is_host: bool, tenancy_name: impl Into<String>) -> Self {
        let ctx = Self::new();
        ctx.set(Some(tenant_id), is_host, Some(tenancy_name.into()));
        ctx
    }

    pub fn set(&self, tenant_id: Option<Uuid>, is_host: bool, tenancy_name: Option<String>) {
        let mut guard = self.inner.write();
        guard.tenant_id = tenant_id;
        guard.is_host = is_host;
        guard.tenancy_name = tenancy_name;
    }

    pub fn clear(&self) {
        *self.inner.write() = TenantSnapshot::default();
    }

    #[must_use]
    pub fn tenant_id(&self) -> Option<Uuid> {
        self.inner.read().tenant_id
    }

    #[must_use]
    pub fn is_host(&self) -> bool {
        self.inner.read().is_host
    }

    #[must_use]
    pub fn tenancy_name(&self) -> Option<String> {
        self.inner.read().tenancy_name.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> TenantSnapshot {
        self.inner.read().clone()
    }
}
