//! Migration to create the employees table.
//!
//! Employees are the HR-facing records layered on top of users. The
//! `manager_id` column is a self-referential foreign key forming the
//! reporting tree.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Employees::UserId).uuid().not_null())
                    .col(ColumnDef::new(Employees::EmployeeNumber).text().not_null())
                    .col(ColumnDef::new(Employees::JobTitle).text().not_null())
                    .col(ColumnDef::new(Employees::DepartmentId).uuid().not_null())
                    .col(
                        ColumnDef::new(Employees::EmploymentType)
                            .text()
                            .not_null()
                            .default("full_time"),
                    )
                    .col(
                        ColumnDef::new(Employees::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Employees::StartDate).date().null())
                    .col(ColumnDef::new(Employees::ManagerId).uuid().null())
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Employees::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_tenant_id")
                            .from(Employees::Table, Employees::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_user_id")
                            .from(Employees::Table, Employees::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_department_id")
                            .from(Employees::Table, Employees::DepartmentId)
                            .to(Departments::Table, Departments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_manager_id")
                            .from(Employees::Table, Employees::ManagerId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Employee numbers are unique per tenant; this index is the backstop
        // behind the atomic counter allocation.
        manager
            .create_index(
                Index::create()
                    .name("idx_employees_tenant_number")
                    .table(Employees::Table)
                    .col(Employees::TenantId)
                    .col(Employees::EmployeeNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Subordinate lookups filter on (tenant_id, manager_id).
        manager
            .create_index(
                Index::create()
                    .name("idx_employees_tenant_manager")
                    .table(Employees::Table)
                    .col(Employees::TenantId)
                    .col(Employees::ManagerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_employees_tenant_number").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_employees_tenant_manager")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    TenantId,
    UserId,
    EmployeeNumber,
    JobTitle,
    DepartmentId,
    EmploymentType,
    Status,
    StartDate,
    ManagerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}
