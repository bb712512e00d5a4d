//! # Department Repository
//!
//! Tenant-scoped department lookups, including the case-insensitive name
//! resolution used by bulk imports.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::{ApiError, validation_error};
use crate::models::department::{
    ActiveModel as DepartmentActiveModel, Column as DepartmentColumn, Entity as Department,
    Model as DepartmentModel,
};

/// Repository for department database operations
pub struct DepartmentRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> DepartmentRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a department within the tenant
    pub async fn create(&self, tenant_id: Uuid, name: &str) -> Result<DepartmentModel, ApiError> {
        if name.trim().is_empty() {
            return Err(validation_error(
                "Department name cannot be empty",
                serde_json::json!({ "name": "Department name must be provided" }),
            ));
        }

        let department = DepartmentActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(name.trim().to_string()),
            created_at: Set(Utc::now().into()),
        };

        let result = department.insert(self.conn).await?;

        Ok(result)
    }

    /// Find a department by id, ensuring it belongs to the tenant
    pub async fn find_by_tenant(
        &self,
        tenant_id: Uuid,
        department_id: Uuid,
    ) -> Result<Option<DepartmentModel>, ApiError> {
        let department = Department::find_by_id(department_id)
            .filter(DepartmentColumn::TenantId.eq(tenant_id))
            .one(self.conn)
            .await?;

        Ok(department)
    }

    /// List all departments for a tenant
    pub async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<DepartmentModel>, ApiError> {
        let departments = Department::find()
            .filter(DepartmentColumn::TenantId.eq(tenant_id))
            .order_by_asc(DepartmentColumn::Name)
            .all(self.conn)
            .await?;

        Ok(departments)
    }

    /// Resolve a department reference that may be either a UUID or a
    /// case-insensitive department name.
    pub async fn resolve(
        &self,
        tenant_id: Uuid,
        reference: &str,
    ) -> Result<Option<DepartmentModel>, ApiError> {
        if let Ok(department_id) = reference.parse::<Uuid>() {
            return self.find_by_tenant(tenant_id, department_id).await;
        }

        let department = Department::find()
            .filter(DepartmentColumn::TenantId.eq(tenant_id))
            .filter(
                Expr::expr(Func::lower(Expr::col(DepartmentColumn::Name)))
                    .eq(reference.trim().to_lowercase()),
            )
            .one(self.conn)
            .await?;

        Ok(department)
    }
}
