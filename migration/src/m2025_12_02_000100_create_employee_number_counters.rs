//! Migration to create the employee_number_counters table.
//!
//! One row per (tenant, day). The row is only ever mutated through a single
//! upsert-with-increment statement, which is what makes employee number
//! allocation safe under concurrent provisioning requests.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmployeeNumberCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmployeeNumberCounters::TenantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeNumberCounters::Day)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmployeeNumberCounters::LastNumber)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(EmployeeNumberCounters::TenantId)
                            .col(EmployeeNumberCounters::Day),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employee_number_counters_tenant_id")
                            .from(
                                EmployeeNumberCounters::Table,
                                EmployeeNumberCounters::TenantId,
                            )
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(EmployeeNumberCounters::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum EmployeeNumberCounters {
    Table,
    TenantId,
    Day,
    LastNumber,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
