//! Tenant registry.
//!
//! Tenants are global: the table has no `tenant_id` column and reads are
//! exempt from the standing filters, so the resolver can look a tenant up
//! before any tenant is known.

use std::sync::LazyLock;

use sea_orm::entity::prelude::*;
use voxbox_db::query::{FieldMap, QueryFields};
use voxbox_db::{AuditedEntity, DbError, EnvelopeColumns};

/// Tenancy name of the host tenant.
pub const HOST_TENANCY_NAME: &str = "host";

pub const NAME_MAX_LEN: usize = 128;
pub const TENANCY_NAME_MAX_LEN: usize = 64;
pub const ADMIN_IDENTIFIERS_MAX_LEN: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub tenancy_name: String,
    pub is_private: bool,
    pub vote_weight_mode: i32,
    pub admin_identifiers: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub created_by: Option<Uuid>,
    pub updated_at: Option<DateTimeUtc>,
    pub modified_by: Option<Uuid>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Unsaved active tenant with empty admin identifiers.
    #[must_use]
    pub fn draft(name: impl Into<String>, tenancy_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.into(),
            tenancy_name: tenancy_name.into(),
            is_private: false,
            vote_weight_mode: 0,
            admin_identifiers: String::new(),
            is_active: true,
            created_at: chrono::Utc::now(),
            created_by: None,
            updated_at: None,
            modified_by: None,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[must_use]
    pub fn is_host(&self) -> bool {
        self.tenancy_name.eq_ignore_ascii_case(HOST_TENANCY_NAME)
    }
}

impl AuditedEntity for Entity {
    const FILTER_EXEMPT: bool = true;

    fn envelope() -> EnvelopeColumns<Self::Column> {
        EnvelopeColumns {
            id: Column::Id,
            tenant_id: None,
            created_at: Column::CreatedAt,
            created_by: Column::CreatedBy,
            updated_at: Column::UpdatedAt,
            modified_by: Column::ModifiedBy,
            is_deleted: Column::IsDeleted,
            deleted_at: Column::DeletedAt,
            deleted_by: Column::DeletedBy,
        }
    }

    fn before_stage(model: &mut Model) -> voxbox_db::Result<()> {
        model.name = model.name.trim().to_owned();
        model.tenancy_name = model.tenancy_name.trim().to_lowercase();
        model.admin_identifiers = model.admin_identifiers.trim().to_owned();

        require("name", &model.name, NAME_MAX_LEN)?;
        require("tenancy_name", &model.tenancy_name, TENANCY_NAME_MAX_LEN)?;
        if model.admin_identifiers.chars().count() > ADMIN_IDENTIFIERS_MAX_LEN {
            return Err(DbError::validation(format!(
                "admin_identifiers exceeds {ADMIN_IDENTIFIERS_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}

fn require(field: &str, value: &str, max_len: usize) -> voxbox_db::Result<()> {
    if value.is_empty() {
        return Err(DbError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(DbError::validation(format!(
            "{field} exceeds {max_len} characters"
        )));
    }
    Ok(())
}

impl QueryFields for Model {
    fn fields() -> &'static FieldMap<Self> {
        static FIELDS: LazyLock<FieldMap<Model>> = LazyLock::new(|| {
            FieldMap::<Model>::new()
                .uuid("id", |m| Some(m.id))
                .string("name", |m| Some(m.name.as_str()))
                .string("tenancy_name", |m| Some(m.tenancy_name.as_str()))
                .bool("is_private", |m| Some(m.is_private))
                .i64("vote_weight_mode", |m| Some(i64::from(m.vote_weight_mode)))
                .string("admin_identifiers", |m| Some(m.admin_identifiers.as_str()))
                .bool("is_active", |m| Some(m.is_active))
                .datetime("created_at", |m| Some(m.created_at))
                .uuid("created_by", |m| m.created_by)
                .datetime("updated_at", |m| m.updated_at)
                .uuid("modified_by", |m| m.modified_by)
                .bool("is_deleted", |m| Some(m.is_deleted))
                .datetime("deleted_at", |m| m.deleted_at)
                .uuid("deleted_by", |m| m.deleted_by)
        });
        &FIELDS
    }
}
