//! # Tenants API Handlers
//!
//! Tenant bootstrap endpoints. Tenants are created by operators before any
//! user or employee can exist.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorAuth;
use crate::error::{ApiError, not_found};
use crate::handlers::types::ApiResponse;
use crate::repositories::{CreateTenantRequest, TenantRepository};
use crate::server::AppState;

/// Request payload for creating a new tenant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTenantDto {
    /// Display name for the tenant (required, max 255 characters)
    #[schema(example = "Acme Corp")]
    pub name: String,
}

/// Response payload describing a tenant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantDto {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: String,
    #[schema(example = "Acme Corp")]
    pub name: String,
    #[schema(example = "2025-12-26T10:30:00Z")]
    pub created_at: String,
}

impl From<crate::models::tenant::Model> for TenantDto {
    fn from(tenant: crate::models::tenant::Model) -> Self {
        Self {
            id: tenant.id.to_string(),
            name: tenant.name,
            created_at: tenant.created_at.to_rfc3339(),
        }
    }
}

/// Create a new tenant
#[utoipa::path(
    post,
    path = "/api/v1/tenants",
    security(("bearer_auth" = [])),
    request_body = CreateTenantDto,
    responses(
        (status = 201, description = "Tenant created successfully", body = ApiResponse<TenantDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Json(request): Json<CreateTenantDto>,
) -> Result<(StatusCode, Json<ApiResponse<TenantDto>>), ApiError> {
    let tenant = TenantRepository::new(&state.db)
        .create(CreateTenantRequest { name: request.name })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(TenantDto::from(tenant))),
    ))
}

/// Get a tenant by ID
#[utoipa::path(
    get,
    path = "/api/v1/tenants/{id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Tenant UUID")
    ),
    responses(
        (status = 200, description = "Tenant retrieved successfully", body = ApiResponse<TenantDto>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Tenant not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "tenants"
)]
pub async fn get_tenant(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TenantDto>>, ApiError> {
    let tenant = TenantRepository::new(&state.db)
        .find_by_id(tenant_id)
        .await?
        .ok_or_else(|| not_found("Tenant"))?;

    Ok(Json(ApiResponse::new(TenantDto::from(tenant))))
}
