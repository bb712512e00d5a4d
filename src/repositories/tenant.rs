//! # Tenant Repository
//!
//! Repository implementation for tenant entities, providing CRUD operations
//! for tenant management.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::error::{ApiError, validation_error};
use crate::models::tenant::{ActiveModel as TenantActiveModel, Entity as Tenant, Model as TenantModel};

/// Request data for creating a new tenant
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    /// Display name for the tenant
    pub name: String,
}

/// Repository for tenant database operations
pub struct TenantRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TenantRepository<'a, C> {
    /// Create a new TenantRepository with the given connection
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a new tenant
    pub async fn create(&self, request: CreateTenantRequest) -> Result<TenantModel, ApiError> {
        validate_tenant_name(&request.name)?;

        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            created_at: Set(Utc::now().into()),
        };

        let result = tenant.insert(self.conn).await?;

        Ok(result)
    }

    /// Get tenant by ID
    pub async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<TenantModel>, ApiError> {
        let tenant = Tenant::find_by_id(tenant_id).one(self.conn).await?;

        Ok(tenant)
    }

    /// Check if a tenant exists
    pub async fn exists(&self, tenant_id: Uuid) -> Result<bool, ApiError> {
        Ok(self.find_by_id(tenant_id).await?.is_some())
    }
}

/// Validate tenant name according to business rules
fn validate_tenant_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(validation_error(
            "Tenant name cannot be empty",
            serde_json::json!({ "name": "Tenant name must be provided" }),
        ));
    }

    if name.len() > 255 {
        return Err(validation_error(
            "Tenant name cannot exceed 255 characters",
            serde_json::json!({ "name": "Tenant name too long", "max_length": 255 }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tenant_name() {
        assert!(validate_tenant_name("Acme Corp").is_ok());
        assert!(validate_tenant_name("").is_err());
        assert!(validate_tenant_name("   ").is_err());
        assert!(validate_tenant_name(&"a".repeat(256)).is_err());
    }
}
