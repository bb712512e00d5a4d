//! # Employees API Handlers
//!
//! The provisioning endpoint plus the read-side hierarchy queries (org
//! chart subtrees, direct reports, approval scope).

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
use crate::cache;
use crate::error::{ApiError, not_found};
use crate::handlers::types::ApiResponse;
use crate::hierarchy;
use crate::provisioning::ProvisionRequest;
use crate::repositories::EmployeeRepository;
use crate::server::AppState;

/// Request payload for provisioning an employee
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProvisionEmployeeDto {
    /// Target user to provision
    pub user_id: Uuid,
    /// Required when the user has no employee record yet
    #[schema(example = "Engineer")]
    pub job_title: Option<String>,
    /// Required when the user has no employee record yet
    pub department_id: Option<Uuid>,
    /// Manager reference: a user id, not an employee id
    pub manager_user_id: Option<Uuid>,
    /// When present, team memberships are replaced wholesale; an empty list
    /// clears them
    pub team_ids: Option<Vec<Uuid>>,
    #[schema(example = "full_time")]
    pub employment_type: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
}

/// Response payload describing an employee
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmployeeDto {
    pub id: String,
    pub user_id: String,
    #[schema(example = "EMP-20251226-001")]
    pub employee_number: String,
    pub job_title: String,
    pub department_id: String,
    pub employment_type: String,
    pub status: String,
    pub start_date: Option<String>,
    pub manager_id: Option<String>,
}

impl From<crate::models::employee::Model> for EmployeeDto {
    fn from(employee: crate::models::employee::Model) -> Self {
        Self {
            id: employee.id.to_string(),
            user_id: employee.user_id.to_string(),
            employee_number: employee.employee_number,
            job_title: employee.job_title,
            department_id: employee.department_id.to_string(),
            employment_type: employee.employment_type,
            status: employee.status,
            start_date: employee.start_date.map(|date| date.to_string()),
            manager_id: employee.manager_id.map(|id| id.to_string()),
        }
    }
}

/// Provision an employee for an existing user
#[utoipa::path(
    post,
    path = "/api/v1/employees/provision",
    security(("bearer_auth" = [])),
    request_body = ProvisionEmployeeDto,
    responses(
        (status = 201, description = "Employee record created", body = ApiResponse<EmployeeDto>),
        (status = 200, description = "Existing employee record updated", body = ApiResponse<EmployeeDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Cross-tenant reference", body = ApiError),
        (status = 404, description = "User, department or manager not found", body = ApiError),
        (status = 409, description = "Employee number contention, retry", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn provision_employee(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Json(request): Json<ProvisionEmployeeDto>,
) -> Result<(StatusCode, Json<ApiResponse<EmployeeDto>>), ApiError> {
    let outcome = state
        .provisioning
        .provision(
            tenant.0,
            ProvisionRequest {
                user_id: request.user_id,
                job_title: request.job_title,
                department_id: request.department_id,
                manager_user_id: request.manager_user_id,
                team_ids: request.team_ids,
                employment_type: request.employment_type,
                start_date: request.start_date,
            },
        )
        .await?;

    // Side effects run after the commit and never block the response.
    state.post_commit.spawn(outcome.tasks);

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ApiResponse::new(EmployeeDto::from(outcome.employee))),
    ))
}

/// Get an employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Employee UUID")),
    responses(
        (status = 200, description = "Employee retrieved", body = ApiResponse<EmployeeDto>),
        (status = 404, description = "Employee not found", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    let employee = EmployeeRepository::new(&state.db)
        .find_by_tenant(tenant.0, employee_id)
        .await?
        .ok_or_else(|| not_found("Employee"))?;

    Ok(Json(ApiResponse::new(EmployeeDto::from(employee))))
}

/// List the ids of all employees transitively reporting to the given one
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}/subordinates",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Employee UUID")),
    responses(
        (status = 200, description = "Transitive subordinate ids", body = ApiResponse<Vec<String>>),
        (status = 404, description = "Employee not found", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn list_subordinates(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let cache_key = format!("{}:subtree:{}", cache::KEY_ORG_CHART, employee_id);
    if let Some(cached) = state.views.get(tenant.0, &cache_key)
        && let Ok(ids) = serde_json::from_value::<Vec<String>>(cached)
    {
        return Ok(Json(ApiResponse::new(ids)));
    }

    EmployeeRepository::new(&state.db)
        .find_by_tenant(tenant.0, employee_id)
        .await?
        .ok_or_else(|| not_found("Employee"))?;

    let mut ids: Vec<String> = hierarchy::collect_subordinates(&state.db, tenant.0, employee_id)
        .await?
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    ids.sort();

    state.views.put(tenant.0, &cache_key, json!(ids.clone()));

    Ok(Json(ApiResponse::new(ids)))
}

/// List the direct reports of the given employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}/direct-reports",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Employee UUID")),
    responses(
        (status = 200, description = "Direct reports", body = ApiResponse<Vec<EmployeeDto>>),
        (status = 404, description = "Employee not found", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn list_direct_reports(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<EmployeeDto>>>, ApiError> {
    EmployeeRepository::new(&state.db)
        .find_by_tenant(tenant.0, employee_id)
        .await?
        .ok_or_else(|| not_found("Employee"))?;

    let reports = hierarchy::direct_reports(&state.db, tenant.0, employee_id).await?;

    Ok(Json(ApiResponse::new(
        reports.into_iter().map(EmployeeDto::from).collect(),
    )))
}

/// List the employee ids whose submissions the given employee may approve
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}/approval-scope",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Employee UUID")),
    responses(
        (status = 200, description = "Approval scope ids", body = ApiResponse<Vec<String>>),
        (status = 404, description = "Employee not found", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn get_approval_scope(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let employee = EmployeeRepository::new(&state.db)
        .find_by_tenant(tenant.0, employee_id)
        .await?
        .ok_or_else(|| not_found("Employee"))?;

    let mut ids: Vec<String> = hierarchy::approval_scope(&state.db, tenant.0, &employee)
        .await?
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    ids.sort();

    Ok(Json(ApiResponse::new(ids)))
}
