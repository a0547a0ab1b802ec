//! Generic repository over an [`AuditedEntity`].
//!
//! Reads go straight to the database through the standing filters. Writes
//! are staged on the owning [`crate::PersistenceContext`] and only reach the
//! database on `save_changes`.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
    Value,
};
use uuid::Uuid;

use crate::context::{ContextShared, EntryState, Staged};
use crate::entity::{self, AuditedEntity};
use crate::filter::{ReadOptions, build_standing_condition};
use crate::{DbError, Result};

/// Repository for one entity type, bound to a persistence context.
pub struct Repository<E: AuditedEntity> {
    shared: Arc<ContextShared>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: AuditedEntity> std::fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &entity::entity_name::<E>())
            .finish_non_exhaustive()
    }
}

impl<E> Repository<E>
where
    E: AuditedEntity,
    E::Model: Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
{
    pub(crate) fn new(shared: Arc<ContextShared>) -> Self {
        Self {
            shared,
            _entity: PhantomData,
        }
    }

    /// Filtered select ordered by id.
    #[must_use]
    pub fn select(&self, opts: ReadOptions) -> Select<E> {
        E::find()
            .filter(build_standing_condition::<E>(&self.shared.tenant.snapshot(), opts))
            .order_by_asc(E::envelope().id)
    }

    /// Loads one row by id, `None` when missing or filtered out.
    ///
    /// # Errors
    /// Returns [`DbError::Storage`] if the query fails.
    pub async fn get_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<E::Model>> {
        let opts = ReadOptions {
            include_deleted,
            ..ReadOptions::new()
        };
        self.get_by_id_with(id, opts).await
    }

    /// # Errors
    /// Returns [`DbError::Storage`] if the query fails.
    pub async fn get_by_id_with(&self, id: Uuid, opts: ReadOptions) -> Result<Option<E::Model>> {
        let found = self
            .select(opts)
            .filter(E::envelope().id.eq(id))
            .one(&self.shared.conn)
            .await?;
        Ok(found)
    }

    /// # Errors
    /// Returns [`DbError::Storage`] if the query fails.
    pub async fn get_all(&self, include_deleted: bool) -> Result<Vec<E::Model>> {
        let opts = ReadOptions {
            include_deleted,
            ..ReadOptions::new()
        };
        self.get_all_with(opts).await
    }

    /// # Errors
    /// Returns [`DbError::Storage`] if the query fails.
    pub async fn get_all_with(&self, opts: ReadOptions) -> Result<Vec<E::Model>> {
        Ok(self.select(opts).all(&self.shared.conn).await?)
    }

    /// # Errors
    /// Returns [`DbError::Storage`] if the query fails.
    pub async fn count(&self, opts: ReadOptions) -> Result<u64> {
        Ok(self.select(opts).count(&self.shared.conn).await?)
    }

    /// Stages an insert and returns the model as it will be written.
    ///
    /// A nil id is replaced with a fresh one. `created_at`, `tenant_id` and
    /// `created_by` are stamped here for the caller's benefit and stamped
    /// again at save time.
    ///
    /// # Errors
    /// Returns [`DbError::Validation`] when the entity rejects the model.
    pub fn add(&self, mut model: E::Model) -> Result<E::Model> {
        E::before_stage(&mut model)?;
        entity::stamp_created::<E>(
            &mut model,
            Utc::now(),
            self.shared.tenant.tenant_id(),
            self.shared.actor.id(),
        );
        let id = entity::model_id::<E>(&model)
            .ok_or_else(|| DbError::validation("model has no id"))?;
        self.stage(EntryState::Added, id, model.clone());
        Ok(model)
    }

    /// Stages a full update of a visible row.
    ///
    /// Creation fields and the owning tenant are never overwritten.
    ///
    /// # Errors
    /// Returns [`DbError::NotFound`] when the row is missing, soft-deleted or
    /// owned by another tenant, [`DbError::Validation`] when the entity rejects the model.
    pub async fn update(&self, mut model: E::Model) -> Result<()> {
        let id = entity::model_id::<E>(&model)
            .filter(|id| !id.is_nil())
            .ok_or_else(|| DbError::validation("model has no id"))?;
        if self.get_by_id(id, false).await?.is_none() {
            return Err(DbError::not_found(entity::entity_name::<E>(), id));
        }
        E::before_stage(&mut model)?;
        entity::stamp_modified::<E>(&mut model, Utc::now(), self.shared.actor.id());
        self.stage(EntryState::Modified, id, model);
        Ok(())
    }

    /// Stages a soft delete. Missing or already deleted rows are a no-op.
    ///
    /// # Errors
    /// Returns [`DbError::Storage`] if the lookup fails.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        match self.get_by_id(id, false).await? {
            Some(model) if !is_deleted::<E>(&model) => {
                self.stage(EntryState::Deleted, id, model);
            }
            _ => {
                tracing::debug!(
                    entity = %entity::entity_name::<E>(),
                    %id,
                    "delete of missing or deleted row ignored"
                );
            }
        }
        Ok(())
    }

    /// Stages clearing the soft-delete flag of a row in scope.
    ///
    /// Restoring a row that is not deleted is a no-op.
    ///
    /// # Errors
    /// Returns [`DbError::NotFound`] when no such row is visible to the current tenant.
    pub async fn restore(&self, id: Uuid) -> Result<()> {
        let model = self
            .get_by_id(id, true)
            .await?
            .ok_or_else(|| DbError::not_found(entity::entity_name::<E>(), id))?;
        if is_deleted::<E>(&model) {
            self.stage(EntryState::Restored, id, model);
        }
        Ok(())
    }

    fn stage(&self, state: EntryState, id: Uuid, model: E::Model) {
        self.shared.stage(Arc::new(Staged::<E> { state, id, model }));
    }
}

fn is_deleted<E: AuditedEntity>(model: &E::Model) -> bool {
    matches!(model.get(E::envelope().is_deleted), Value::Bool(Some(true)))
}
