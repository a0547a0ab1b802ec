#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Host-based tenant resolution for inbound HTTP requests.
//!
//! `tenant1.example.com` resolves to the tenant whose tenancy name is
//! `tenant1`; loopback hosts resolve to the host tenant.

pub mod config;
pub mod host;
pub mod middleware;
pub mod store;

pub use config::TenantResolverConfig;
pub use host::resolve_tenancy_name;
pub use middleware::{TenantResolver, tenant_resolver_middleware};
pub use store::{DbTenantStore, ResolvedTenant, TenantStore};
