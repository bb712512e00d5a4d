//! # Bulk Provisioning Batch
//!
//! Applies the provisioning flow across up to `import.max_rows` rows from
//! an import payload.
//!
//! Batch semantics: the whole batch is validated before any write (size,
//! per-row schema, duplicate emails within the batch; any failure rejects
//! the batch with a per-row error map). Rows are then processed
//! independently, each in its own transaction: rows whose email already
//! exists in the tenant are reported as skipped, other failures fail only
//! their row, and successes commit row by row.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use metrics::{counter, histogram};
use regex::Regex;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ImportConfig;
use crate::error::{ApiError, not_found, validation_error};
use crate::models::user::UserRole;
use crate::post_commit::PostCommitTask;
use crate::provisioning::{ProvisionRequest, ProvisioningService};
use crate::repositories::{CreateUserRequest, DepartmentRepository, TenantRepository, UserRepository};
use crate::notify::WelcomeNotice;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"));

/// One row of an import payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkImportRow {
    #[schema(example = "jane.doe@acme.example")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub display_name: String,
    /// Role slug: `admin`, `manager`, `hr`, `employee`, or `accountant`
    #[schema(example = "employee")]
    pub role: String,
    #[schema(example = "Engineer")]
    pub job_title: String,
    /// Department id (UUID) or case-insensitive department name
    #[schema(example = "Engineering")]
    pub department: String,
    /// Optional manager reference by email within the same tenant
    pub manager_email: Option<String>,
    pub start_date: Option<NaiveDate>,
}

/// Outcome status for one processed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Succeeded,
    Skipped,
    Failed,
}

/// Per-row detail in the import summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RowOutcome {
    /// Zero-based index of the row in the submitted batch
    pub row: usize,
    pub email: String,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a processed import batch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkImportSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub rows: Vec<RowOutcome>,
}

/// Applies the provisioning flow across an import batch.
#[derive(Clone)]
pub struct BulkImportService {
    db: DatabaseConnection,
    import_config: ImportConfig,
    provisioner: ProvisioningService,
}

impl BulkImportService {
    pub fn new(
        db: DatabaseConnection,
        import_config: ImportConfig,
        provisioner: ProvisioningService,
    ) -> Self {
        Self {
            db,
            import_config,
            provisioner,
        }
    }

    /// Validate and process an import batch. Returns the per-row summary
    /// plus the accumulated post-commit tasks (welcome notifications, audit
    /// entries, cache invalidations) for the caller to execute.
    ///
    /// The cancellation token is checked between rows; once it fires, every
    /// remaining row is reported as failed without being processed.
    pub async fn import(
        &self,
        tenant_id: Uuid,
        rows: Vec<BulkImportRow>,
        cancel: CancellationToken,
    ) -> Result<(BulkImportSummary, Vec<PostCommitTask>), ApiError> {
        self.validate_batch(&rows)?;

        let tenant = TenantRepository::new(&self.db)
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| not_found("Tenant"))?;

        let started = Instant::now();
        let mut outcomes: Vec<RowOutcome> = Vec::with_capacity(rows.len());
        let mut tasks: Vec<PostCommitTask> = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            if cancel.is_cancelled() {
                outcomes.push(RowOutcome {
                    row: index,
                    email: row.email,
                    status: RowStatus::Failed,
                    employee_number: None,
                    error: Some("Import deadline elapsed before this row was processed".to_string()),
                });
                continue;
            }

            let email = row.email.clone();
            match self.process_row(&tenant, row).await {
                Ok(RowResult::Created {
                    employee_number,
                    mut row_tasks,
                }) => {
                    tasks.append(&mut row_tasks);
                    outcomes.push(RowOutcome {
                        row: index,
                        email,
                        status: RowStatus::Succeeded,
                        employee_number: Some(employee_number),
                        error: None,
                    });
                }
                Ok(RowResult::Skipped) => {
                    outcomes.push(RowOutcome {
                        row: index,
                        email,
                        status: RowStatus::Skipped,
                        employee_number: None,
                        error: None,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        row = index,
                        error = %err.message,
                        "Import row failed"
                    );
                    outcomes.push(RowOutcome {
                        row: index,
                        email,
                        status: RowStatus::Failed,
                        employee_number: None,
                        error: Some(err.message.into_string()),
                    });
                }
            }
        }

        let summary = BulkImportSummary {
            total: outcomes.len(),
            succeeded: outcomes
                .iter()
                .filter(|outcome| outcome.status == RowStatus::Succeeded)
                .count(),
            skipped: outcomes
                .iter()
                .filter(|outcome| outcome.status == RowStatus::Skipped)
                .count(),
            failed: outcomes
                .iter()
                .filter(|outcome| outcome.status == RowStatus::Failed)
                .count(),
            rows: outcomes,
        };

        histogram!("employee_import_duration_ms")
            .record(started.elapsed().as_secs_f64() * 1_000.0);
        counter!("employee_import_rows_total", "status" => "succeeded")
            .increment(summary.succeeded as u64);
        counter!("employee_import_rows_total", "status" => "skipped")
            .increment(summary.skipped as u64);
        counter!("employee_import_rows_total", "status" => "failed")
            .increment(summary.failed as u64);

        Ok((summary, tasks))
    }

    /// Whole-batch validation; any failure here rejects the batch before a
    /// single write happens.
    fn validate_batch(&self, rows: &[BulkImportRow]) -> Result<(), ApiError> {
        if rows.is_empty() {
            return Err(validation_error(
                "Import batch is empty",
                json!({ "rows": "At least one row is required" }),
            ));
        }

        if rows.len() > self.import_config.max_rows {
            return Err(validation_error(
                "Import batch exceeds the row limit",
                json!({
                    "rows": format!("At most {} rows per batch", self.import_config.max_rows),
                    "submitted": rows.len(),
                }),
            ));
        }

        let mut row_errors: HashMap<usize, Vec<String>> = HashMap::new();
        let mut seen_emails: HashMap<String, usize> = HashMap::new();

        for (index, row) in rows.iter().enumerate() {
            let mut errors = Vec::new();

            if !EMAIL_PATTERN.is_match(row.email.trim()) {
                errors.push("Invalid email address".to_string());
            }
            if row.display_name.trim().is_empty() {
                errors.push("Display name is required".to_string());
            }
            if row.job_title.trim().is_empty() {
                errors.push("Job title is required".to_string());
            }
            if row.department.trim().is_empty() {
                errors.push("Department is required".to_string());
            }
            if UserRole::from_slug(&row.role).is_none() {
                errors.push(format!("Unknown role '{}'", row.role));
            }

            let email_key = row.email.trim().to_lowercase();
            if let Some(first_index) = seen_emails.get(&email_key) {
                errors.push(format!("Duplicate email, first used in row {}", first_index));
                row_errors
                    .entry(*first_index)
                    .or_default()
                    .push("Duplicate email within batch".to_string());
            } else {
                seen_emails.insert(email_key, index);
            }

            if !errors.is_empty() {
                row_errors.entry(index).or_default().extend(errors);
            }
        }

        if !row_errors.is_empty() {
            let details: serde_json::Map<String, serde_json::Value> = row_errors
                .into_iter()
                .map(|(index, errors)| (index.to_string(), json!(errors)))
                .collect();
            return Err(validation_error(
                "Import batch failed validation",
                json!({ "rows": details }),
            ));
        }

        Ok(())
    }

    /// Process one row inside its own transaction.
    async fn process_row(
        &self,
        tenant: &crate::models::tenant::Model,
        row: BulkImportRow,
    ) -> Result<RowResult, ApiError> {
        // Existing identities are skipped, not failed; re-importing the same
        // sheet is expected to be harmless.
        if UserRepository::new(&self.db)
            .email_exists(tenant.id, &row.email)
            .await?
        {
            return Ok(RowResult::Skipped);
        }

        let txn = self.db.begin().await?;

        let result = async {
            let department = DepartmentRepository::new(&txn)
                .resolve(tenant.id, &row.department)
                .await?
                .ok_or_else(|| {
                    validation_error(
                        "Department could not be resolved",
                        json!({ "department": row.department }),
                    )
                })?;

            let manager_user_id = match &row.manager_email {
                Some(manager_email) => {
                    let manager = UserRepository::new(&txn)
                        .find_by_email(tenant.id, manager_email)
                        .await?
                        .ok_or_else(|| {
                            validation_error(
                                "Manager email does not match any user in this tenant",
                                json!({ "manager_email": manager_email }),
                            )
                        })?;
                    Some(manager.id)
                }
                None => None,
            };

            let user = UserRepository::new(&txn)
                .create(
                    tenant.id,
                    CreateUserRequest {
                        email: row.email.clone(),
                        display_name: row.display_name.clone(),
                        role: UserRole::from_slug(&row.role)
                            .expect("validated in validate_batch")
                            .as_str()
                            .to_string(),
                        department_id: Some(department.id),
                    },
                )
                .await?;

            let request = ProvisionRequest {
                user_id: user.id,
                job_title: Some(row.job_title.clone()),
                department_id: Some(department.id),
                manager_user_id,
                team_ids: None,
                employment_type: None,
                start_date: row.start_date,
            };

            let outcome = self
                .provisioner
                .provision_user(&txn, tenant, user.clone(), &request)
                .await?;

            // Imports send a welcome notification instead of the assignment
            // notice; audit entries and cache invalidations carry over.
            let mut row_tasks: Vec<PostCommitTask> = outcome
                .tasks
                .into_iter()
                .filter(|task| !matches!(task, PostCommitTask::NotifyAssignment(_)))
                .collect();
            row_tasks.push(PostCommitTask::NotifyWelcome(WelcomeNotice {
                recipient: user.email,
                display_name: user.display_name,
                organization: tenant.name.clone(),
            }));

            Ok::<RowResult, ApiError>(RowResult::Created {
                employee_number: outcome.employee.employee_number,
                row_tasks,
            })
        }
        .await;

        match result {
            Ok(row_result) => {
                txn.commit().await?;
                Ok(row_result)
            }
            Err(err) => {
                txn.rollback().await?;
                Err(err)
            }
        }
    }
}

enum RowResult {
    Created {
        employee_number: String,
        row_tasks: Vec<PostCommitTask>,
    },
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> BulkImportService {
        // Validation never touches the database; a disconnected service is
        // enough for these tests.
        let db = DatabaseConnection::default();
        let provisioner =
            ProvisioningService::new(db.clone(), crate::config::AllocatorConfig::default());
        BulkImportService::new(db, ImportConfig::default(), provisioner)
    }

    fn row(email: &str) -> BulkImportRow {
        BulkImportRow {
            email: email.to_string(),
            display_name: "Someone".to_string(),
            role: "employee".to_string(),
            job_title: "Engineer".to_string(),
            department: "Engineering".to_string(),
            manager_email: None,
            start_date: None,
        }
    }

    #[test]
    fn test_empty_batch_rejected() {
        let err = service().validate_batch(&[]).unwrap_err();
        assert_eq!(err.code, Box::from("VALIDATION_FAILED"));
    }

    #[test]
    fn test_oversized_batch_rejected() {
        let rows: Vec<BulkImportRow> = (0..101).map(|i| row(&format!("u{i}@x.example"))).collect();
        let err = service().validate_batch(&rows).unwrap_err();
        assert_eq!(err.code, Box::from("VALIDATION_FAILED"));
    }

    #[test]
    fn test_schema_errors_reported_per_row() {
        let mut bad = row("not-an-email");
        bad.job_title = String::new();
        let rows = vec![row("ok@x.example"), bad];

        let err = service().validate_batch(&rows).unwrap_err();
        let details = err.details.unwrap();
        let row_map = details["rows"].as_object().unwrap();
        assert!(!row_map.contains_key("0"));
        let errors = row_map["1"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_duplicate_emails_flag_both_rows() {
        let rows = vec![row("dup@x.example"), row("DUP@x.example")];

        let err = service().validate_batch(&rows).unwrap_err();
        let details = err.details.unwrap();
        let row_map = details["rows"].as_object().unwrap();
        assert!(row_map.contains_key("0"));
        assert!(row_map.contains_key("1"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut bad = row("x@x.example");
        bad.role = "wizard".to_string();

        let err = service().validate_batch(&[bad]).unwrap_err();
        let details = err.details.unwrap();
        assert!(details["rows"]["0"][0].as_str().unwrap().contains("wizard"));
    }

    #[test]
    fn test_valid_batch_passes() {
        let rows = vec![row("a@x.example"), row("b@x.example")];
        assert!(service().validate_batch(&rows).is_ok());
    }
}
