//! Axum middleware that fills the per-request [`TenantContext`].
//!
//! # Behavior
//!
//! - A fresh [`TenantContext`] is inserted into the request extensions.
//! - No tenancy name in the host, or no matching tenant: the request proceeds
//!   with an empty context.
//! - Tenant store failure: 500, the handler is not called.
//! - The context is cleared once the handler finishes, panics or is dropped.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use voxbox_security::TenantContext;

use crate::config::TenantResolverConfig;
use crate::host::resolve_tenancy_name;
use crate::store::{ResolvedTenant, TenantStore};

/// Host-to-tenant resolution, shared by all requests.
#[derive(Clone)]
pub struct TenantResolver {
    config: Arc<TenantResolverConfig>,
    store: Arc<dyn TenantStore>,
}

impl std::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TenantResolver {
    #[must_use]
    pub fn new(config: TenantResolverConfig, store: Arc<dyn TenantStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TenantResolverConfig {
        &self.config
    }

    /// Resolves `host` to a tenant. `Ok(None)` when nothing matches.
    ///
    /// # Errors
    /// Returns a storage error if the tenant lookup fails.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, host: &str) -> voxbox_db::Result<Option<ResolvedTenant>> {
        let Some(tenancy_name) = resolve_tenancy_name(host, &self.config) else {
            tracing::debug!("no tenancy name in host");
            return Ok(None);
        };
        tracing::debug!(%tenancy_name, "extracted tenancy name");

        let tenant = self.store.find_by_tenancy_name(&tenancy_name).await?;
        match &tenant {
            Some(t) => tracing::debug!(tenant_id = %t.id, is_host = t.is_host, "tenant identified"),
            None => tracing::warn!(%tenancy_name, "no tenant found for tenancy name"),
        }
        Ok(tenant)
    }
}

/// Tenant resolver middleware.
///
/// Install with `axum::middleware::from_fn_with_state(resolver, tenant_resolver_middleware)`;
/// handlers read the context with `Extension<TenantContext>`.
pub async fn tenant_resolver_middleware(
    State(resolver): State<TenantResolver>,
    mut req: Request,
    next: Next,
) -> Response {
    let tenant_ctx = TenantContext::new();
    req.extensions_mut().insert(tenant_ctx.clone());
    let _clear = ClearOnDrop(tenant_ctx.clone());

    let host = request_host(&req);
    if let Some(host) = host.as_deref() {
        match resolver.resolve(host).await {
            Ok(Some(tenant)) => {
                tenant_ctx.set(Some(tenant.id), tenant.is_host, Some(tenant.tenancy_name));
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(error = %err, host, "tenant lookup failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "tenant lookup failed").into_response();
            }
        }
    } else {
        tracing::debug!("request has no host");
    }

    next.run(req).await
}

/// Clears the request's tenant context when the request future ends.
struct ClearOnDrop(TenantContext);

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.0.clear();
    }
}

fn request_host(req: &Request) -> Option<String> {
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().host())
        .map(str::to_owned)
}
