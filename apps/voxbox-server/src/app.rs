use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::Extension;
use axum::routing::get;
use axum::{Json, Router, middleware};
use sea_orm_migration::MigratorTrait;
use voxbox_db::sea_orm::DatabaseConnection;
use voxbox_directory::Migrator;
use voxbox_security::{TenantContext, TenantSnapshot};
use voxbox_tenant_resolver::{DbTenantStore, TenantResolver, tenant_resolver_middleware};

use crate::config::AppConfig;

/// Routes with the tenant resolver applied to every request.
#[must_use]
pub fn router(resolver: TenantResolver) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tenant", get(current_tenant))
        .layer(middleware::from_fn_with_state(
            resolver,
            tenant_resolver_middleware,
        ))
}

async fn health() -> &'static str {
    "ok"
}

async fn current_tenant(Extension(ctx): Extension<TenantContext>) -> Json<TenantSnapshot> {
    Json(ctx.snapshot())
}

/// Opens the database and applies pending migrations when configured to.
///
/// # Errors
/// Returns an error if the database is unreachable or a migration fails.
pub async fn open_database(config: &AppConfig) -> Result<DatabaseConnection> {
    let conn = voxbox_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        Migrator::up(&conn, None)
            .await
            .context("failed to apply migrations")?;
        tracing::info!("migrations applied");
    }
    Ok(conn)
}

/// Runs the HTTP server until a shutdown signal arrives.
///
/// # Errors
/// Returns an error if startup fails or the server stops abnormally.
pub async fn serve(config: AppConfig) -> Result<()> {
    let conn = open_database(&config).await?;
    let store = Arc::new(DbTenantStore::new(
        conn,
        config.tenancy.host_tenancy_name.clone(),
    ));
    let resolver = TenantResolver::new(config.tenancy, store);

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "voxbox server listening");

    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(async {
            if let Err(err) = crate::signals::wait_for_shutdown().await {
                tracing::error!(error = %err, "shutdown signal handling failed");
            }
        })
        .await
        .context("server error")?;

    tracing::info!("voxbox server stopped");
    Ok(())
}
