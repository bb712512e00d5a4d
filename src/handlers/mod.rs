//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Zenora
//! provisioning API.

pub mod departments;
pub mod employees;
pub mod imports;
pub mod tenants;
pub mod types;
pub mod users;

use axum::extract::State;
use axum::response::Json;

use crate::db;
use crate::error::ApiError;
use crate::models::ServiceInfo;
use crate::server::AppState;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness probe that also verifies database connectivity
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn healthz(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    db::health_check(&state.db)
        .await
        .map_err(|err| -> ApiError { err.into() })?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
