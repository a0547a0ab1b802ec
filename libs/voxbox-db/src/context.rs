//! Unit of work over one database connection.
//!
//! A [`PersistenceContext`] lives for one request. Repositories obtained from
//! it stage their writes in a shared queue; [`PersistenceContext::save_changes`]
//! applies the whole queue in a single transaction, stamping audit fields with
//! one timestamp.
//!
//! ```ignore
//! let ctx = PersistenceContext::new(conn, tenant.clone(), Actor::user(user_id));
//! let users = ctx.repository::<user::Entity>();
//! let added = users.add(new_user)?;
//! users.delete(stale_id).await?;
//! ctx.save_changes().await?;
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, Iterable,
    ModelTrait, QueryFilter, Select, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;
use voxbox_security::{Actor, TenantContext, TenantSnapshot};

use crate::entity::{self, AuditedEntity};
use crate::filter::{ReadOptions, build_standing_condition};
use crate::repo::Repository;
use crate::{DbError, Result};

/// Lifecycle of a staged change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Added,
    Modified,
    Deleted,
    Restored,
}

/// Values shared by every change applied in one save.
#[derive(Debug, Clone)]
pub(crate) struct SaveStamp {
    pub now: DateTime<Utc>,
    pub tenant: TenantSnapshot,
    pub actor: Option<Uuid>,
}

#[async_trait]
pub(crate) trait StagedChange: Send + Sync {
    fn entity(&self) -> String;
    fn id(&self) -> Uuid;
    fn state(&self) -> EntryState;
    async fn apply(&self, txn: &DatabaseTransaction, stamp: &SaveStamp) -> Result<()>;
}

pub(crate) struct Staged<E: AuditedEntity> {
    pub state: EntryState,
    pub id: Uuid,
    pub model: E::Model,
}

#[async_trait]
impl<E> StagedChange for Staged<E>
where
    E: AuditedEntity,
    E::Model: Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
{
    fn entity(&self) -> String {
        entity::entity_name::<E>()
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> EntryState {
        self.state
    }

    async fn apply(&self, txn: &DatabaseTransaction, stamp: &SaveStamp) -> Result<()> {
        let env = E::envelope();
        let scope = build_standing_condition::<E>(&stamp.tenant, ReadOptions::new());
        let scope_any =
            build_standing_condition::<E>(&stamp.tenant, ReadOptions::new().including_deleted());

        match self.state {
            EntryState::Added => {
                let mut model = self.model.clone();
                entity::stamp_created::<E>(
                    &mut model,
                    stamp.now,
                    stamp.tenant.tenant_id,
                    stamp.actor,
                );
                E::insert(entity::insertable::<E>(&model)).exec(txn).await?;
            }
            EntryState::Modified => {
                let mut model = self.model.clone();
                entity::stamp_modified::<E>(&mut model, stamp.now, stamp.actor);
                let mut update = E::update_many();
                for col in E::Column::iter() {
                    if entity::is_immutable::<E>(col) {
                        continue;
                    }
                    update = update.col_expr(col, Expr::value(model.get(col)));
                }
                let res = update
                    .filter(env.id.eq(self.id))
                    .filter(scope)
                    .exec(txn)
                    .await?;
                if res.rows_affected == 0 {
                    return Err(DbError::not_found(self.entity(), self.id));
                }
            }
            EntryState::Deleted => {
                // Already gone is fine: deleting twice is a no-op.
                E::update_many()
                    .col_expr(env.is_deleted, Expr::value(true))
                    .col_expr(env.deleted_at, Expr::value(Some(stamp.now)))
                    .col_expr(env.deleted_by, Expr::value(stamp.actor))
                    .filter(env.id.eq(self.id))
                    .filter(env.is_deleted.eq(false))
                    .filter(scope_any)
                    .exec(txn)
                    .await?;
            }
            EntryState::Restored => {
                let res = E::update_many()
                    .col_expr(env.is_deleted, Expr::value(false))
                    .col_expr(env.deleted_at, Expr::value(Option::<DateTime<Utc>>::None))
                    .col_expr(env.deleted_by, Expr::value(Option::<Uuid>::None))
                    .col_expr(env.updated_at, Expr::value(Some(stamp.now)))
                    .col_expr(env.modified_by, Expr::value(stamp.actor))
                    .filter(env.id.eq(self.id))
                    .filter(scope_any)
                    .exec(txn)
                    .await?;
                if res.rows_affected == 0 {
                    return Err(DbError::not_found(self.entity(), self.id));
                }
            }
        }
        Ok(())
    }
}

pub(crate) struct ContextShared {
    pub conn: DatabaseConnection,
    pub tenant: TenantContext,
    pub actor: Actor,
    pub staged: Mutex<Vec<Arc<dyn StagedChange>>>,
}

impl ContextShared {
    pub fn stage(&self, change: Arc<dyn StagedChange>) {
        tracing::debug!(
            entity = %change.entity(),
            id = %change.id(),
            state = ?change.state(),
            "staged change"
        );
        self.staged.lock().push(change);
    }
}

/// Per-request unit of work.
pub struct PersistenceContext {
    shared: Arc<ContextShared>,
    repositories: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl fmt::Debug for PersistenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceContext")
            .field("tenant", &self.shared.tenant.snapshot())
            .field("actor", &self.shared.actor)
            .field("pending", &self.pending_changes())
            .finish_non_exhaustive()
    }
}

impl PersistenceContext {
    #[must_use]
    pub fn new(conn: DatabaseConnection, tenant: TenantContext, actor: Actor) -> Self {
        Self {
            shared: Arc::new(ContextShared {
                conn,
                tenant,
                actor,
                staged: Mutex::new(Vec::new()),
            }),
            repositories: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.shared.conn
    }

    #[must_use]
    pub fn tenant(&self) -> &TenantContext {
        &self.shared.tenant
    }

    #[must_use]
    pub fn actor(&self) -> Actor {
        self.shared.actor
    }

    /// Returns the repository for `E`, created on first use and cached for
    /// the lifetime of this context.
    #[must_use]
    pub fn repository<E>(&self) -> Arc<Repository<E>>
    where
        E: AuditedEntity,
        E::Model: Sync,
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    {
        let cached = {
            let mut repos = self.repositories.lock();
            Arc::clone(repos.entry(TypeId::of::<E>()).or_insert_with(|| {
                Arc::new(Repository::<E>::new(Arc::clone(&self.shared)))
                    as Arc<dyn Any + Send + Sync>
            }))
        };
        cached
            .downcast::<Repository<E>>()
            .unwrap_or_else(|_| Arc::new(Repository::new(Arc::clone(&self.shared))))
    }

    /// Select over `E` with the standing filters already applied.
    #[must_use]
    pub fn find<E: AuditedEntity>(&self, opts: ReadOptions) -> Select<E> {
        E::find().filter(build_standing_condition::<E>(&self.shared.tenant.snapshot(), opts))
    }

    #[must_use]
    pub fn pending_changes(&self) -> usize {
        self.shared.staged.lock().len()
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.pending_changes() > 0
    }

    /// Drops every staged change without touching the database.
    pub fn discard_changes(&self) {
        let dropped = std::mem::take(&mut *self.shared.staged.lock());
        if !dropped.is_empty() {
            tracing::debug!(count = dropped.len(), "discarded staged changes");
        }
    }

    /// Applies every staged change atomically.
    ///
    /// Returns the number of changes applied. On failure the transaction is
    /// rolled back and the queue is left untouched so the caller may fix the
    /// cause and retry, or discard.
    ///
    /// # Errors
    /// [`DbError::NotFound`] when a modified or restored row vanished,
    /// [`DbError::Storage`] for constraint violations and connectivity failures.
    #[tracing::instrument(skip(self), fields(tenant_id = ?self.shared.tenant.tenant_id()))]
    pub async fn save_changes(&self) -> Result<usize> {
        let batch: Vec<Arc<dyn StagedChange>> = self.shared.staged.lock().clone();
        if batch.is_empty() {
            return Ok(0);
        }

        let stamp = SaveStamp {
            now: Utc::now(),
            tenant: self.shared.tenant.snapshot(),
            actor: self.shared.actor.id(),
        };

        let txn = self.shared.conn.begin().await?;
        for change in &batch {
            if let Err(err) = change.apply(&txn, &stamp).await {
                tracing::warn!(
                    entity = %change.entity(),
                    id = %change.id(),
                    state = ?change.state(),
                    error = %err,
                    "save failed, rolling back"
                );
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                return Err(classify(err, change.as_ref()));
            }
        }
        txn.commit().await?;

        {
            let mut staged = self.shared.staged.lock();
            let applied = batch.len().min(staged.len());
            staged.drain(..applied);
        }
        tracing::debug!(count = batch.len(), "saved changes");
        Ok(batch.len())
    }
}

/// Maps driver-level "no row" errors onto the entry that caused them.
fn classify(err: DbError, change: &dyn StagedChange) -> DbError {
    match err {
        DbError::Storage(DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) => {
            DbError::not_found(change.entity(), change.id())
        }
        other => other,
    }
}
