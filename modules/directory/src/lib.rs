#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Directory entities: the tenant registry and per-tenant users.
//!
//! Both implement [`voxbox_db::AuditedEntity`] and expose their queryable
//! fields through [`voxbox_db::query::QueryFields`]. [`Migrator`] creates the
//! tables.

pub mod migrations;
pub mod tenant;
pub mod user;

pub use migrations::Migrator;
