//! # Users API Handlers
//!
//! Identity records. Users are created here (or through bulk import) and
//! later promoted to employees by the provisioning endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{OperatorAuth, TenantExtension};
use crate::error::{ApiError, not_found, validation_error};
use crate::handlers::types::ApiResponse;
use crate::models::user::UserRole;
use crate::repositories::{CreateUserRequest, UserRepository};
use crate::server::AppState;

/// Request payload for creating a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserDto {
    #[schema(example = "jane.doe@acme.example")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub display_name: String,
    /// Role slug: `admin`, `manager`, `hr`, `employee`, or `accountant`
    #[schema(example = "employee")]
    pub role: String,
    pub department_id: Option<Uuid>,
}

/// Response payload describing a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub status: String,
    pub department_id: Option<String>,
    pub employee_id: Option<String>,
}

impl From<crate::models::user::Model> for UserDto {
    fn from(user: crate::models::user::Model) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            status: user.status,
            department_id: user.department_id.map(|id| id.to_string()),
            employee_id: user.employee_id.map(|id| id.to_string()),
        }
    }
}

/// Create a user in the requesting tenant
#[utoipa::path(
    post,
    path = "/api/v1/users",
    security(("bearer_auth" = [])),
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "Email already exists", body = ApiError)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Json(request): Json<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let role = UserRole::from_slug(&request.role).ok_or_else(|| {
        validation_error(
            "Unknown role",
            json!({ "role": format!("'{}' is not a valid role", request.role) }),
        )
    })?;

    if request.display_name.trim().is_empty() {
        return Err(validation_error(
            "Display name is required",
            json!({ "display_name": "Must not be empty" }),
        ));
    }

    let user = UserRepository::new(&state.db)
        .create(
            tenant.0,
            CreateUserRequest {
                email: request.email,
                display_name: request.display_name,
                role: role.as_str().to_string(),
                department_id: request.department_id,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserDto::from(user))),
    ))
}

/// Get a user by ID within the requesting tenant
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User UUID")
    ),
    responses(
        (status = 200, description = "User retrieved", body = ApiResponse<UserDto>),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = UserRepository::new(&state.db)
        .find_by_tenant(tenant.0, user_id)
        .await?
        .ok_or_else(|| not_found("User"))?;

    Ok(Json(ApiResponse::new(UserDto::from(user))))
}
