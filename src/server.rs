//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Zenora
//! provisioning API.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use crate::cache::TenantViewCache;
use crate::config::AppConfig;
use crate::handlers;
use crate::notify::{LogNotifier, Notifier};
use crate::post_commit::PostCommitExecutor;
use crate::provisioning::ProvisioningService;
use crate::provisioning::bulk::BulkImportService;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub views: Arc<TenantViewCache>,
    pub provisioning: ProvisioningService,
    pub imports: BulkImportService,
    pub post_commit: PostCommitExecutor,
}

/// Build the application state from its parts.
pub fn create_app_state(
    config: AppConfig,
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
) -> AppState {
    let config = Arc::new(config);
    let views = Arc::new(TenantViewCache::new(config.view_cache.capacity));
    let provisioning = ProvisioningService::new(db.clone(), config.allocator.clone());
    let imports = BulkImportService::new(db.clone(), config.import.clone(), provisioning.clone());
    let post_commit = PostCommitExecutor::new(db.clone(), notifier, Arc::clone(&views));

    AppState {
        db,
        config,
        views,
        provisioning,
        imports,
        post_commit,
    }
}

/// Build a state with the logging notifier; used by tests and local runs.
pub fn create_test_app_state(config: AppConfig, db: DatabaseConnection) -> AppState {
    create_app_state(config, db, Arc::new(LogNotifier))
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/tenants", post(handlers::tenants::create_tenant))
        .route("/tenants/{id}", get(handlers::tenants::get_tenant))
        .route(
            "/departments",
            post(handlers::departments::create_department)
                .get(handlers::departments::list_departments),
        )
        .route("/users", post(handlers::users::create_user))
        .route("/users/{id}", get(handlers::users::get_user))
        .route(
            "/employees/provision",
            post(handlers::employees::provision_employee),
        )
        .route("/employees/import", post(handlers::imports::import_employees))
        .route("/employees/{id}", get(handlers::employees::get_employee))
        .route(
            "/employees/{id}/subordinates",
            get(handlers::employees::list_subordinates),
        )
        .route(
            "/employees/{id}/direct-reports",
            get(handlers::employees::list_direct_reports),
        )
        .route(
            "/employees/{id}/approval-scope",
            get(handlers::employees::get_approval_scope),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .nest("/api/v1", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = create_app_state(config, db, Arc::new(LogNotifier));
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::tenants::create_tenant,
        crate::handlers::tenants::get_tenant,
        crate::handlers::departments::create_department,
        crate::handlers::departments::list_departments,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::employees::provision_employee,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::list_subordinates,
        crate::handlers::employees::list_direct_reports,
        crate::handlers::employees::get_approval_scope,
        crate::handlers::imports::import_employees,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::tenants::CreateTenantDto,
            crate::handlers::tenants::TenantDto,
            crate::handlers::departments::CreateDepartmentDto,
            crate::handlers::departments::DepartmentDto,
            crate::handlers::users::CreateUserDto,
            crate::handlers::users::UserDto,
            crate::handlers::employees::ProvisionEmployeeDto,
            crate::handlers::employees::EmployeeDto,
            crate::provisioning::bulk::BulkImportRow,
            crate::provisioning::bulk::BulkImportSummary,
            crate::provisioning::bulk::RowOutcome,
            crate::provisioning::bulk::RowStatus,
        )
    ),
    info(
        title = "Zenora Provisioning API",
        description = "Employee provisioning and reporting-hierarchy service",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
