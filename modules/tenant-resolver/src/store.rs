//! Tenant lookup port and its database adapter.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;
use voxbox_directory::tenant;

/// Tenant identity copied into the request's tenant context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTenant {
    pub id: Uuid,
    pub is_host: bool,
    pub tenancy_name: String,
}

/// Looks tenants up by tenancy name.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Finds the non-deleted tenant named `tenancy_name`.
    ///
    /// # Errors
    /// Returns a storage error if the lookup itself fails.
    async fn find_by_tenancy_name(
        &self,
        tenancy_name: &str,
    ) -> voxbox_db::Result<Option<ResolvedTenant>>;
}

/// [`TenantStore`] over the `tenants` table.
///
/// Matching ignores letter case, since host names do.
#[derive(Debug, Clone)]
pub struct DbTenantStore {
    conn: DatabaseConnection,
    host_tenancy_name: String,
}

impl DbTenantStore {
    #[must_use]
    pub fn new(conn: DatabaseConnection, host_tenancy_name: impl Into<String>) -> Self {
        Self {
            conn,
            host_tenancy_name: host_tenancy_name.into(),
        }
    }
}

#[async_trait]
impl TenantStore for DbTenantStore {
    async fn find_by_tenancy_name(
        &self,
        tenancy_name: &str,
    ) -> voxbox_db::Result<Option<ResolvedTenant>> {
        let found = tenant::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(tenant::Column::TenancyName)))
                    .eq(tenancy_name.to_lowercase()),
            )
            .filter(tenant::Column::IsDeleted.eq(false))
            .one(&self.conn)
            .await?;

        Ok(found.map(|row| ResolvedTenant {
            id: row.id,
            is_host: row.tenancy_name.eq_ignore_ascii_case(&self.host_tenancy_name),
            tenancy_name: row.tenancy_name,
        }))
    }
}
