//! # Employee Repository
//!
//! Tenant-scoped access to employee records. Creation always goes through
//! the provisioning service so that number allocation and user linkage stay
//! coherent; this repository only persists what it is given.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::employee::{
    ActiveModel as EmployeeActiveModel, Column as EmployeeColumn, Entity as Employee,
    Model as EmployeeModel,
};

/// Field values for inserting a new employee record
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub user_id: Uuid,
    pub employee_number: String,
    pub job_title: String,
    pub department_id: Uuid,
    pub employment_type: String,
    pub start_date: Option<NaiveDate>,
    pub manager_id: Option<Uuid>,
}

/// Partial update applied to an existing employee; `None` fields are left
/// untouched. The employee number is immutable and deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub job_title: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Option<Uuid>>,
}

/// Repository for employee database operations
pub struct EmployeeRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> EmployeeRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a new employee record
    pub async fn insert(
        &self,
        tenant_id: Uuid,
        fields: NewEmployee,
    ) -> Result<EmployeeModel, ApiError> {
        let now = Utc::now();

        let employee = EmployeeActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            user_id: Set(fields.user_id),
            employee_number: Set(fields.employee_number),
            job_title: Set(fields.job_title),
            department_id: Set(fields.department_id),
            employment_type: Set(fields.employment_type),
            status: Set("active".to_string()),
            start_date: Set(fields.start_date),
            manager_id: Set(fields.manager_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = employee.insert(self.conn).await?;

        Ok(result)
    }

    /// Find an employee by id, ensuring it belongs to the tenant
    pub async fn find_by_tenant(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<EmployeeModel>, ApiError> {
        let employee = Employee::find_by_id(employee_id)
            .filter(EmployeeColumn::TenantId.eq(tenant_id))
            .one(self.conn)
            .await?;

        Ok(employee)
    }

    /// Find the employee record linked to a user, if any
    pub async fn find_by_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EmployeeModel>, ApiError> {
        let employee = Employee::find()
            .filter(EmployeeColumn::TenantId.eq(tenant_id))
            .filter(EmployeeColumn::UserId.eq(user_id))
            .one(self.conn)
            .await?;

        Ok(employee)
    }

    /// Apply a partial update; the employee number is never touched.
    pub async fn update(
        &self,
        employee: EmployeeModel,
        update: EmployeeUpdate,
    ) -> Result<EmployeeModel, ApiError> {
        let mut active = employee.into_active_model();

        if let Some(job_title) = update.job_title {
            active.job_title = Set(job_title);
        }
        if let Some(department_id) = update.department_id {
            active.department_id = Set(department_id);
        }
        if let Some(manager_id) = update.manager_id {
            active.manager_id = Set(manager_id);
        }
        active.updated_at = Set(Utc::now().into());

        let result = active.update(self.conn).await?;

        Ok(result)
    }
}
