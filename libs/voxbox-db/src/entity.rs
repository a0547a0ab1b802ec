use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, Iterable, ModelTrait, Value};
use uuid::Uuid;

use crate::Result;

/// Columns every audited entity carries.
///
/// `tenant_id` is `None` for entities that are not owned by a tenant.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeColumns<C> {
    pub id: C,
    pub tenant_id: Option<C>,
    pub created_at: C,
    pub created_by: C,
    pub updated_at: C,
    pub modified_by: C,
    pub is_deleted: C,
    pub deleted_at: C,
    pub deleted_by: C,
}

/// Contract for entities managed through a [`crate::Repository`].
///
/// # Example
/// ```rust,ignore
/// impl AuditedEntity for user::Entity {
///     fn envelope() -> EnvelopeColumns<Self::Column> {
///         EnvelopeColumns {
///             id: Column::Id,
///             tenant_id: Some(Column::TenantId),
///             created_at: Column::CreatedAt,
///             created_by: Column::CreatedBy,
///             updated_at: Column::UpdatedAt,
///             modified_by: Column::ModifiedBy,
///             is_deleted: Column::IsDeleted,
///             deleted_at: Column::DeletedAt,
///             deleted_by: Column::DeletedBy,
///         }
///     }
/// }
/// ```
pub trait AuditedEntity: EntityTrait {
    /// Skips both standing filters (soft delete and tenant).
    ///
    /// Only the tenant registry itself sets this, since the resolver has to
    /// find tenants before any tenant is known.
    const FILTER_EXEMPT: bool = false;

    fn envelope() -> EnvelopeColumns<Self::Column>;

    /// Normalizes and validates a model before it is staged.
    ///
    /// # Errors
    /// Returns [`crate::DbError::Validation`] when the model must not be written.
    fn before_stage(_model: &mut Self::Model) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn entity_name<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

pub(crate) fn same_column<C: ColumnTrait>(a: C, b: C) -> bool {
    a.as_str() == b.as_str()
}

pub(crate) fn model_id<E: AuditedEntity>(model: &E::Model) -> Option<Uuid> {
    match model.get(E::envelope().id) {
        Value::Uuid(Some(id)) => Some(*id),
        _ => None,
    }
}

/// Columns a modification never overwrites.
///
/// Soft-delete columns change only through delete and restore.
pub(crate) fn is_immutable<E: AuditedEntity>(col: E::Column) -> bool {
    let env = E::envelope();
    [
        env.id,
        env.created_at,
        env.created_by,
        env.is_deleted,
        env.deleted_at,
        env.deleted_by,
    ]
    .into_iter()
    .chain(env.tenant_id)
    .any(|fixed| same_column(col, fixed))
}

/// Stamps creation fields in place.
///
/// Assigns a fresh id when the model still carries the nil id.
pub(crate) fn stamp_created<E: AuditedEntity>(
    model: &mut E::Model,
    now: DateTime<Utc>,
    tenant_id: Option<Uuid>,
    actor: Option<Uuid>,
) {
    let env = E::envelope();
    if model_id::<E>(model).is_none_or(|id| id.is_nil()) {
        model.set(env.id, crate::id::new_id().into());
    }
    model.set(env.created_at, now.into());
    model.set(env.created_by, actor.into());
    if let Some(col) = env.tenant_id {
        model.set(col, tenant_id.into());
    }
    model.set(env.is_deleted, false.into());
    model.set(env.deleted_at, Option::<DateTime<Utc>>::None.into());
    model.set(env.deleted_by, Option::<Uuid>::None.into());
}

pub(crate) fn stamp_modified<E: AuditedEntity>(
    model: &mut E::Model,
    now: DateTime<Utc>,
    actor: Option<Uuid>,
) {
    let env = E::envelope();
    model.set(env.updated_at, Some(now).into());
    model.set(env.modified_by, actor.into());
}

/// Builds an active model with every column set from `model`.
pub(crate) fn insertable<E>(model: &E::Model) -> E::ActiveModel
where
    E: AuditedEntity,
    E::ActiveModel: ActiveModelTrait<Entity = E>,
{
    let mut active = <E::ActiveModel as ActiveModelTrait>::default();
    for col in E::Column::iter() {
        active.set(col, model.get(col));
    }
    active
}
