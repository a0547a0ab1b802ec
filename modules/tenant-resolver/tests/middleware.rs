#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware};
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;
use tracing_test::traced_test;
use voxbox_db::{DbConfig, DbError, PersistenceContext, connect};
use voxbox_directory::{Migrator, tenant};
use voxbox_security::{Actor, TenantContext, TenantSnapshot};
use voxbox_tenant_resolver::{
    DbTenantStore, ResolvedTenant, TenantResolver, TenantResolverConfig, TenantStore,
    tenant_resolver_middleware,
};

type Seen = Arc<Mutex<Option<(TenantSnapshot, TenantContext)>>>;

async fn setup() -> DatabaseConnection {
    let conn = connect(&DbConfig::new("sqlite::memory:")).await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    conn
}

async fn seed_tenant(conn: &DatabaseConnection, tenancy_name: &str) -> tenant::Model {
    let ctx = PersistenceContext::new(conn.clone(), TenantContext::new(), Actor::system());
    let added = ctx
        .repository::<tenant::Entity>()
        .add(tenant::Model::draft(tenancy_name.to_uppercase(), tenancy_name))
        .unwrap();
    ctx.save_changes().await.unwrap();
    added
}

fn app(store: Arc<dyn TenantStore>, seen: Seen) -> Router {
    let handler = get(move |Extension(ctx): Extension<TenantContext>| {
        let seen = seen.clone();
        async move {
            *seen.lock().unwrap() = Some((ctx.snapshot(), ctx));
            StatusCode::OK
        }
    });
    with_resolver(Router::new().route("/", handler), store)
}

fn with_resolver(router: Router, store: Arc<dyn TenantStore>) -> Router {
    let resolver = TenantResolver::new(TenantResolverConfig::default(), store);
    router.layer(middleware::from_fn_with_state(
        resolver,
        tenant_resolver_middleware,
    ))
}

async fn call(app: Router, host: &str) -> StatusCode {
    app.oneshot(
        Request::builder()
            .uri("/")
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .expect("request failed")
    .status()
}

fn db_app(conn: &DatabaseConnection) -> (Router, Seen) {
    let seen = Seen::default();
    let store = Arc::new(DbTenantStore::new(conn.clone(), tenant::HOST_TENANCY_NAME));
    (app(store, seen.clone()), seen)
}

fn seen_snapshot(seen: &Seen) -> TenantSnapshot {
    seen.lock().unwrap().as_ref().expect("handler not called").0.clone()
}

#[tokio::test]
async fn subdomain_resolves_to_its_tenant() {
    let conn = setup().await;
    let acme = seed_tenant(&conn, "tenant1").await;
    let (app, seen) = db_app(&conn);

    assert_eq!(call(app, "tenant1.example.com").await, StatusCode::OK);

    let snapshot = seen_snapshot(&seen);
    assert_eq!(snapshot.tenant_id, Some(acme.id));
    assert!(!snapshot.is_host);
    assert_eq!(snapshot.tenancy_name.as_deref(), Some("tenant1"));
}

#[tokio::test]
async fn lookup_ignores_letter_case() {
    let conn = setup().await;
    let acme = seed_tenant(&conn, "Tenant1").await;
    let (app, seen) = db_app(&conn);

    call(app, "TENANT1.example.com:8080").await;
    assert_eq!(seen_snapshot(&seen).tenant_id, Some(acme.id));
}

#[tokio::test]
async fn localhost_resolves_to_the_host_tenant() {
    let conn = setup().await;
    let host = seed_tenant(&conn, "host").await;
    let (app, seen) = db_app(&conn);

    call(app, "localhost:5000").await;

    let snapshot = seen_snapshot(&seen);
    assert_eq!(snapshot.tenant_id, Some(host.id));
    assert!(snapshot.is_host);
    assert_eq!(snapshot.restricts_to(), None);
}

#[tokio::test]
async fn bare_domain_leaves_the_context_empty() {
    let conn = setup().await;
    seed_tenant(&conn, "tenant1").await;
    let (app, seen) = db_app(&conn);

    assert_eq!(call(app, "example.com").await, StatusCode::OK);
    assert_eq!(seen_snapshot(&seen), TenantSnapshot::default());
}

#[tokio::test]
#[traced_test]
async fn unknown_tenant_proceeds_with_a_warning() {
    let conn = setup().await;
    let (app, seen) = db_app(&conn);

    assert_eq!(call(app, "nobody.example.com").await, StatusCode::OK);
    assert_eq!(seen_snapshot(&seen), TenantSnapshot::default());
    assert!(logs_contain("no tenant found for tenancy name"));
}

#[tokio::test]
async fn deleted_tenants_are_not_resolved() {
    let conn = setup().await;
    let gone = seed_tenant(&conn, "gone").await;
    let ctx = PersistenceContext::new(conn.clone(), TenantContext::new(), Actor::system());
    ctx.repository::<tenant::Entity>().delete(gone.id).await.unwrap();
    ctx.save_changes().await.unwrap();

    let (app, seen) = db_app(&conn);
    call(app, "gone.example.com").await;
    assert_eq!(seen_snapshot(&seen).tenant_id, None);
}

#[tokio::test]
async fn context_is_cleared_after_the_handler() {
    let conn = setup().await;
    seed_tenant(&conn, "tenant1").await;
    let (app, seen) = db_app(&conn);

    call(app, "tenant1.example.com").await;

    let guard = seen.lock().unwrap();
    let (during, ctx) = guard.as_ref().unwrap();
    assert!(during.tenant_id.is_some());
    assert_eq!(ctx.snapshot(), TenantSnapshot::default());
}

#[tokio::test]
async fn context_is_cleared_when_the_handler_panics() {
    let conn = setup().await;
    seed_tenant(&conn, "tenant1").await;
    let captured: Arc<Mutex<Option<TenantContext>>> = Arc::default();
    let handler = {
        let captured = captured.clone();
        get(move |Extension(ctx): Extension<TenantContext>| async move {
            assert!(ctx.snapshot().tenant_id.is_some());
            *captured.lock().unwrap() = Some(ctx);
            if captured.lock().unwrap().is_some() {
                panic!("handler failed");
            }
            StatusCode::OK
        })
    };
    let store = Arc::new(DbTenantStore::new(conn.clone(), tenant::HOST_TENANCY_NAME));
    let app = with_resolver(Router::new().route("/", handler), store);

    let outcome = tokio::spawn(call(app, "tenant1.example.com")).await;
    assert!(outcome.unwrap_err().is_panic());

    let ctx = captured.lock().unwrap().clone().expect("handler not called");
    assert_eq!(ctx.snapshot(), TenantSnapshot::default());
}

#[tokio::test]
async fn context_is_cleared_when_the_request_is_abandoned() {
    let conn = setup().await;
    seed_tenant(&conn, "tenant1").await;
    let captured: Arc<Mutex<Option<TenantContext>>> = Arc::default();
    let handler = {
        let captured = captured.clone();
        get(move |Extension(ctx): Extension<TenantContext>| async move {
            *captured.lock().unwrap() = Some(ctx);
            std::future::pending::<StatusCode>().await
        })
    };
    let store = Arc::new(DbTenantStore::new(conn.clone(), tenant::HOST_TENANCY_NAME));
    let app = with_resolver(Router::new().route("/", handler), store);

    let timed_out =
        tokio::time::timeout(Duration::from_millis(200), call(app, "tenant1.example.com")).await;
    assert!(timed_out.is_err());

    let ctx = captured.lock().unwrap().clone().expect("handler not called");
    assert_eq!(ctx.snapshot(), TenantSnapshot::default());
}

struct FailingStore;

#[async_trait]
impl TenantStore for FailingStore {
    async fn find_by_tenancy_name(
        &self,
        _tenancy_name: &str,
    ) -> voxbox_db::Result<Option<ResolvedTenant>> {
        Err(DbError::Storage(DbErr::Custom("connection refused".to_owned())))
    }
}

#[tokio::test]
#[traced_test]
async fn store_failure_is_a_server_error() {
    let seen = Seen::default();
    let app = app(Arc::new(FailingStore), seen.clone());

    assert_eq!(
        call(app, "tenant1.example.com").await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert!(seen.lock().unwrap().is_none());
    assert!(logs_contain("tenant lookup failed"));
}

#[tokio::test]
async fn store_is_not_consulted_without_a_tenancy_name() {
    let seen = Seen::default();
    let app = app(Arc::new(FailingStore), seen.clone());

    assert_eq!(call(app, "example.com").await, StatusCode::OK);
    assert!(seen.lock().unwrap().is_some());
}
