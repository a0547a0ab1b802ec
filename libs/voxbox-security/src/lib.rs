#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod actor;
pub mod tenant_context;

pub use actor::Actor;
pub use tenant_context::{TenantContext, TenantSnapshot};
