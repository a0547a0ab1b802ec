use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

/// `SQLite` caps decimal precision at 16 digits.
const fn vote_weight_precision(backend: DatabaseBackend) -> (u32, u32) {
    match backend {
        DatabaseBackend::Sqlite => (16, 4),
        _ => (18, 4),
    }
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tenants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tenants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tenants::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Tenants::TenancyName).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Tenants::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tenants::VoteWeightMode)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tenants::AdminIdentifiers)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tenants::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Tenants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tenants::CreatedBy).uuid())
                    .col(ColumnDef::new(Tenants::UpdatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Tenants::ModifiedBy).uuid())
                    .col(
                        ColumnDef::new(Tenants::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tenants::DeletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Tenants::DeletedBy).uuid())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_tenants_tenancy_name")
                    .table(Tenants::Table)
                    .col(Tenants::TenancyName)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tenants_is_active")
                    .table(Tenants::Table)
                    .col(Tenants::IsActive)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let (precision, scale) = vote_weight_precision(manager.get_database_backend());
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::TenantId).uuid())
                    .col(ColumnDef::new(Users::UserName).string_len(256).not_null())
                    .col(ColumnDef::new(Users::Name).string())
                    .col(ColumnDef::new(Users::Surname).string())
                    .col(ColumnDef::new(Users::EmailAddress).string())
                    .col(ColumnDef::new(Users::PhoneNumber).string())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Users::Identifier).string())
                    .col(ColumnDef::new(Users::VoteWeight).decimal_len(precision, scale))
                    .col(ColumnDef::new(Users::IdentyumUuid).string())
                    .col(ColumnDef::new(Users::PreviousName).string())
                    .col(ColumnDef::new(Users::PreviousSurname).string())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::CreatedBy).uuid())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::ModifiedBy).uuid())
                    .col(
                        ColumnDef::new(Users::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::DeletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::DeletedBy).uuid())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_users_tenant_user_name")
                    .table(Users::Table)
                    .col(Users::TenantId)
                    .col(Users::UserName)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
    Name,
    TenancyName,
    IsPrivate,
    VoteWeightMode,
    AdminIdentifiers,
    IsActive,
    CreatedAt,
    CreatedBy,
    UpdatedAt,
    ModifiedBy,
    IsDeleted,
    DeletedAt,
    DeletedBy,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    TenantId,
    UserName,
    Name,
    Surname,
    EmailAddress,
    PhoneNumber,
    IsActive,
    Identifier,
    VoteWeight,
    IdentyumUuid,
    PreviousName,
    PreviousSurname,
    CreatedAt,
    CreatedBy,
    UpdatedAt,
    ModifiedBy,
    IsDeleted,
    DeletedAt,
    DeletedBy,
}
