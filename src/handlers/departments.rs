//! # Departments API Handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{OperatorAuth, TenantExtension};
use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::repositories::DepartmentRepository;
use crate::server::AppState;

/// Request payload for creating a department
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDepartmentDto {
    #[schema(example = "Engineering")]
    pub name: String,
}

/// Response payload describing a department
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DepartmentDto {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<crate::models::department::Model> for DepartmentDto {
    fn from(department: crate::models::department::Model) -> Self {
        Self {
            id: department.id.to_string(),
            name: department.name,
            created_at: department.created_at.to_rfc3339(),
        }
    }
}

/// Create a department in the requesting tenant
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    security(("bearer_auth" = [])),
    request_body = CreateDepartmentDto,
    responses(
        (status = 201, description = "Department created", body = ApiResponse<DepartmentDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "departments"
)]
pub async fn create_department(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Json(request): Json<CreateDepartmentDto>,
) -> Result<(StatusCode, Json<ApiResponse<DepartmentDto>>), ApiError> {
    let department = DepartmentRepository::new(&state.db)
        .create(tenant.0, &request.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(DepartmentDto::from(department))),
    ))
}

/// List the departments of the requesting tenant
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Departments listed", body = ApiResponse<Vec<DepartmentDto>>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "departments"
)]
pub async fn list_departments(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
) -> Result<Json<ApiResponse<Vec<DepartmentDto>>>, ApiError> {
    let departments = DepartmentRepository::new(&state.db)
        .list_by_tenant(tenant.0)
        .await?;

    Ok(Json(ApiResponse::new(
        departments.into_iter().map(DepartmentDto::from).collect(),
    )))
}
