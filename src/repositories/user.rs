//! # User Repository
//!
//! Tenant-scoped identity records. Users gain an `employee_id` link when
//! they are provisioned.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::{ApiError, not_found};
use crate::models::user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
};

/// Request data for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    /// Role slug, see [`crate::models::user::UserRole`]
    pub role: String,
    pub department_id: Option<Uuid>,
}

/// Repository for user database operations
pub struct UserRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a new user within the tenant
    pub async fn create(
        &self,
        tenant_id: Uuid,
        request: CreateUserRequest,
    ) -> Result<UserModel, ApiError> {
        let now = Utc::now();

        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            email: Set(request.email.trim().to_lowercase()),
            display_name: Set(request.display_name.trim().to_string()),
            role: Set(request.role),
            status: Set("active".to_string()),
            department_id: Set(request.department_id),
            employee_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = user.insert(self.conn).await?;

        Ok(result)
    }

    /// Find a user by id, ensuring it belongs to the tenant
    pub async fn find_by_tenant(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UserModel>, ApiError> {
        let user = User::find_by_id(user_id)
            .filter(UserColumn::TenantId.eq(tenant_id))
            .one(self.conn)
            .await?;

        Ok(user)
    }

    /// Find a user by id regardless of tenant. Callers are responsible for
    /// the cross-tenant check; this exists so that a wrong-tenant reference
    /// can be distinguished from a missing one.
    pub async fn find_any(&self, user_id: Uuid) -> Result<Option<UserModel>, ApiError> {
        let user = User::find_by_id(user_id).one(self.conn).await?;

        Ok(user)
    }

    /// Find a user by email within the tenant (emails are stored lowercase)
    pub async fn find_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> Result<Option<UserModel>, ApiError> {
        let user = User::find()
            .filter(UserColumn::TenantId.eq(tenant_id))
            .filter(
                Expr::expr(Func::lower(Expr::col(UserColumn::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .one(self.conn)
            .await?;

        Ok(user)
    }

    /// Check whether an email is already taken within the tenant
    pub async fn email_exists(&self, tenant_id: Uuid, email: &str) -> Result<bool, ApiError> {
        let count = User::find()
            .filter(UserColumn::TenantId.eq(tenant_id))
            .filter(
                Expr::expr(Func::lower(Expr::col(UserColumn::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    /// Link a user to its employee record and align the department
    /// reference. `employees.department_id` is authoritative; writing it
    /// back here keeps the two columns from drifting.
    pub async fn link_employee(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        employee_id: Uuid,
        department_id: Uuid,
    ) -> Result<UserModel, ApiError> {
        let user = self
            .find_by_tenant(tenant_id, user_id)
            .await?
            .ok_or_else(|| not_found("User"))?;

        let mut active = user.into_active_model();
        active.employee_id = Set(Some(employee_id));
        active.department_id = Set(Some(department_id));
        active.updated_at = Set(Utc::now().into());

        let result = active.update(self.conn).await?;

        Ok(result)
    }
}
