#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Tenant-aware persistence core.
//!
//! - [`PersistenceContext`]: per-request unit of work with standing filters
//!   and audit stamping at save time
//! - [`Repository`]: generic CRUD with soft delete and staged writes
//! - [`query`]: in-memory sort, filter and paging by field name
//! - [`id`]: time-ordered identifiers
//!
//! Entities opt in by implementing [`AuditedEntity`].

pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod filter;
pub mod id;
pub mod query;
pub mod repo;

pub use config::{DbConfig, connect};
pub use context::{EntryState, PersistenceContext};
pub use entity::{AuditedEntity, EnvelopeColumns};
pub use error::{DbError, ErrorKind, Result};
pub use filter::{ReadOptions, build_standing_condition, build_tenant_condition};
pub use id::new_id;
pub use repo::Repository;

// Re-exported so entity crates agree on the ORM version.
pub use sea_orm;
