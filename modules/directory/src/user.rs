//! Users, owned by a tenant.

use std::sync::LazyLock;

use sea_orm::entity::prelude::*;
use voxbox_db::query::{FieldMap, QueryFields};
use voxbox_db::{AuditedEntity, DbError, EnvelopeColumns};

pub const USER_NAME_MAX_LEN: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    /// Stored lower-cased; unique per tenant.
    pub user_name: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub identifier: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub vote_weight: Option<Decimal>,
    pub identyum_uuid: Option<String>,
    pub previous_name: Option<String>,
    pub previous_surname: Option<String>,
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
    #[must_use]
    pub fn draft(user_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            tenant_id: None,
            user_name: user_name.into(),
            name: None,
            surname: None,
            email_address: None,
            phone_number: None,
            is_active: true,
            identifier: None,
            vote_weight: None,
            identyum_uuid: None,
            previous_name: None,
            previous_surname: None,
            created_at: chrono::Utc::now(),
            created_by: None,
            updated_at: None,
            modified_by: None,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// "Name Surname", skipping missing parts.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.name.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

impl AuditedEntity for Entity {
    fn envelope() -> EnvelopeColumns<Self::Column> {
        EnvelopeColumns {
            id: Column::Id,
            tenant_id: Some(Column::TenantId),
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
        model.user_name = model.user_name.trim().to_lowercase();
        if model.user_name.is_empty() {
            return Err(DbError::validation("user_name is required"));
        }
        if model.user_name.chars().count() > USER_NAME_MAX_LEN {
            return Err(DbError::validation(format!(
                "user_name exceeds {USER_NAME_MAX_LEN} characters"
            )));
        }
        if let Some(email) = model.email_address.as_mut() {
            *email = email.trim().to_owned();
        }
        Ok(())
    }
}

impl QueryFields for Model {
    fn fields() -> &'static FieldMap<Self> {
        static FIELDS: LazyLock<FieldMap<Model>> = LazyLock::new(|| {
            FieldMap::<Model>::new()
                .uuid("id", |m| Some(m.id))
                .uuid("tenant_id", |m| m.tenant_id)
                .string("user_name", |m| Some(m.user_name.as_str()))
                .string("name", |m| m.name.as_deref())
                .string("surname", |m| m.surname.as_deref())
                .string("email_address", |m| m.email_address.as_deref())
                .string("phone_number", |m| m.phone_number.as_deref())
                .bool("is_active", |m| Some(m.is_active))
                .string("identifier", |m| m.identifier.as_deref())
                .decimal("vote_weight", |m| m.vote_weight)
                .string("identyum_uuid", |m| m.identyum_uuid.as_deref())
                .string("previous_name", |m| m.previous_name.as_deref())
                .string("previous_surname", |m| m.previous_surname.as_deref())
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
