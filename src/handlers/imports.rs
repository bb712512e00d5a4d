//! # Bulk Import API Handler

use std::time::Duration;

use axum::{extract::State, response::Json};
use tokio_util::sync::CancellationToken;

use crate::auth::{OperatorAuth, TenantExtension};
use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::provisioning::bulk::{BulkImportRow, BulkImportSummary};
use crate::server::AppState;

/// Import up to the configured number of employees in one batch
#[utoipa::path(
    post,
    path = "/api/v1/employees/import",
    security(("bearer_auth" = [])),
    request_body = Vec<BulkImportRow>,
    responses(
        (status = 200, description = "Batch processed; see per-row outcomes", body = ApiResponse<BulkImportSummary>),
        (status = 400, description = "Whole batch rejected by validation", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 404, description = "Tenant not found", body = ApiError)
    ),
    tag = "imports"
)]
pub async fn import_employees(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    TenantExtension(tenant): TenantExtension,
    Json(rows): Json<Vec<BulkImportRow>>,
) -> Result<Json<ApiResponse<BulkImportSummary>>, ApiError> {
    // Rows not processed when the deadline fires are reported as failed
    // rather than left half-done.
    let cancel = CancellationToken::new();
    let deadline = Duration::from_secs(state.config.import.timeout_seconds);
    let timer = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        timer.cancel();
    });

    let (summary, tasks) = state.imports.import(tenant.0, rows, cancel).await?;

    // Welcome notifications and audit entries go out after persistence.
    state.post_commit.spawn(tasks);

    Ok(Json(ApiResponse::new(summary)))
}
