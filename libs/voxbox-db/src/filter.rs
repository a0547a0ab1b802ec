//! Standing filters applied to every read.
//!
//! # Rules
//! 1. Soft-deleted rows are hidden unless the caller opts in.
//! 2. With a non-host tenant in context, only that tenant's rows are visible.
//!    No tenant, or the host tenant, means no tenant restriction.
//! 3. Entities marked [`AuditedEntity::FILTER_EXEMPT`] are never filtered.
//! 4. An entity without a tenant column is invisible to a restricted tenant.

use sea_orm::{ColumnTrait, Condition, sea_query::Expr};
use voxbox_security::TenantSnapshot;

use crate::entity::AuditedEntity;

/// Per-query opt-outs from the standing filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub include_deleted: bool,
    pub all_tenants: bool,
}

impl ReadOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_deleted: false,
            all_tenants: false,
        }
    }

    #[must_use]
    pub const fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    #[must_use]
    pub const fn across_tenants(mut self) -> Self {
        self.all_tenants = true;
        self
    }
}

/// Builds the condition every read of `E` is subject to.
pub fn build_standing_condition<E>(tenant: &TenantSnapshot, opts: ReadOptions) -> Condition
where
    E: AuditedEntity,
{
    let mut cond = Condition::all();
    if E::FILTER_EXEMPT {
        return cond;
    }
    if !opts.include_deleted {
        cond = cond.add(E::envelope().is_deleted.eq(false));
    }
    if let Some(tenant_cond) = build_tenant_condition::<E>(tenant, opts) {
        cond = cond.add(tenant_cond);
    }
    cond
}

/// Tenant part of the standing condition, `None` when unrestricted.
pub fn build_tenant_condition<E>(tenant: &TenantSnapshot, opts: ReadOptions) -> Option<Condition>
where
    E: AuditedEntity,
{
    if E::FILTER_EXEMPT || opts.all_tenants {
        return None;
    }
    let tenant_id = tenant.restricts_to()?;
    let cond = match E::envelope().tenant_id {
        Some(col) => Condition::all().add(col.eq(tenant_id)),
        None => Condition::all().add(Expr::value(false)),
    };
    Some(cond)
}
