#![allow(dead_code)]

//! Shared helpers for integration tests.
//!
//! Each suite runs against an isolated in-memory SQLite database with all
//! migrations applied. The pool is pinned to a single connection so the
//! in-memory database survives for the whole test.

use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

use zenora::config::AllocatorConfig;
use zenora::models::{department, tenant, user};
use zenora::provisioning::ProvisioningService;
use zenora::repositories::{
    CreateTenantRequest, CreateUserRequest, DepartmentRepository, TenantRepository, UserRepository,
};

pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");

    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to apply migrations");

    db
}

pub async fn seed_tenant(db: &DatabaseConnection, name: &str) -> tenant::Model {
    TenantRepository::new(db)
        .create(CreateTenantRequest {
            name: name.to_string(),
        })
        .await
        .expect("Failed to seed tenant")
}

pub async fn seed_department(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    name: &str,
) -> department::Model {
    DepartmentRepository::new(db)
        .create(tenant_id, name)
        .await
        .expect("Failed to seed department")
}

pub async fn seed_user(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    email: &str,
    role: &str,
    department_id: Option<Uuid>,
) -> user::Model {
    UserRepository::new(db)
        .create(
            tenant_id,
            CreateUserRequest {
                email: email.to_string(),
                display_name: email
                    .split('@')
                    .next()
                    .unwrap_or("someone")
                    .replace('.', " "),
                role: role.to_string(),
                department_id,
            },
        )
        .await
        .expect("Failed to seed user")
}

pub fn provisioning(db: &DatabaseConnection) -> ProvisioningService {
    ProvisioningService::new(db.clone(), AllocatorConfig::default())
}

/// Today's date component of employee numbers, e.g. `20251226`.
pub fn today_stamp() -> String {
    chrono::Utc::now().date_naive().format("%Y%m%d").to_string()
}
