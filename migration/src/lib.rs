//! Database migrations for the Zenora provisioning service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_12_01_000001_create_tenants;
mod m2025_12_01_000100_create_departments;
mod m2025_12_01_000200_create_users;
mod m2025_12_01_000300_create_employees;
mod m2025_12_01_000400_create_teams;
mod m2025_12_01_000500_create_team_members;
mod m2025_12_02_000100_create_employee_number_counters;
mod m2025_12_02_000200_create_audit_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_12_01_000001_create_tenants::Migration),
            Box::new(m2025_12_01_000100_create_departments::Migration),
            Box::new(m2025_12_01_000200_create_users::Migration),
            Box::new(m2025_12_01_000300_create_employees::Migration),
            Box::new(m2025_12_01_000400_create_teams::Migration),
            Box::new(m2025_12_01_000500_create_team_members::Migration),
            Box::new(m2025_12_02_000100_create_employee_number_counters::Migration),
            Box::new(m2025_12_02_000200_create_audit_logs::Migration),
        ]
    }
}
