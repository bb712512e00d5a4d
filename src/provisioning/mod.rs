//! # Employee Provisioning
//!
//! The top-level write path of the service: converts a user into a fully
//! provisioned employee (number allocation, manager resolution, record
//! creation or partial update, user linkage, wholesale team replacement).
//!
//! The primary mutation runs in a single transaction. Side effects (audit
//! entry, notifications, view-cache invalidation) are returned as a
//! post-commit task list and executed by the caller after the transaction
//! commits, so their failure can never corrupt or abort the mutation.

pub mod bulk;
pub mod manager;

use chrono::{NaiveDate, Utc};
use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::json;
use uuid::Uuid;

use crate::cache;
use crate::config::AllocatorConfig;
use crate::error::{ApiError, not_found, validation_error};
use crate::hierarchy;
use crate::models::{employee, tenant, user};
use crate::notify::AssignmentNotice;
use crate::post_commit::PostCommitTask;
use crate::repositories::employee::{EmployeeUpdate, NewEmployee};
use crate::repositories::{
    DepartmentRepository, EmployeeRepository, TeamRepository, TenantRepository, UserRepository,
};
use crate::sequence::NumberAllocator;

use manager::resolve_manager;

/// Request to provision (create or update) an employee for a user.
#[derive(Debug, Clone, Default)]
pub struct ProvisionRequest {
    /// Target user to provision
    pub user_id: Uuid,
    /// Job title; required when no employee record exists yet
    pub job_title: Option<String>,
    /// Department; required when no employee record exists yet
    pub department_id: Option<Uuid>,
    /// Manager reference: a user id, resolved to an employee id
    pub manager_user_id: Option<Uuid>,
    /// Team memberships; when present the existing set is replaced wholesale
    pub team_ids: Option<Vec<Uuid>>,
    pub employment_type: Option<String>,
    pub start_date: Option<NaiveDate>,
}

/// Result of a provisioning call, with the side effects still pending.
#[derive(Debug)]
pub struct ProvisionOutcome {
    pub employee: employee::Model,
    /// True when the employee record was created by this call
    pub created: bool,
    /// Side effects to run after the transaction commits
    pub tasks: Vec<PostCommitTask>,
}

/// Orchestrates the provisioning write path.
#[derive(Clone)]
pub struct ProvisioningService {
    db: DatabaseConnection,
    allocator_config: AllocatorConfig,
}

impl ProvisioningService {
    pub fn new(db: DatabaseConnection, allocator_config: AllocatorConfig) -> Self {
        Self {
            db,
            allocator_config,
        }
    }

    /// Provision an employee for an existing user. The returned task list
    /// must be handed to the post-commit executor by the caller.
    pub async fn provision(
        &self,
        tenant_id: Uuid,
        request: ProvisionRequest,
    ) -> Result<ProvisionOutcome, ApiError> {
        let txn = self.db.begin().await?;

        let tenant = TenantRepository::new(&txn)
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| not_found("Tenant"))?;

        let target = UserRepository::new(&txn)
            .find_by_tenant(tenant_id, request.user_id)
            .await?
            .ok_or_else(|| not_found("User"))?;

        let outcome = self
            .provision_user(&txn, &tenant, target, &request)
            .await;

        match outcome {
            Ok(outcome) => {
                txn.commit().await?;
                counter!("employees_provisioned_total").increment(1);
                Ok(outcome)
            }
            Err(err) => {
                txn.rollback().await?;
                Err(err)
            }
        }
    }

    /// Core provisioning flow, shared with the bulk import path which runs
    /// it inside its own per-row transaction.
    pub(crate) async fn provision_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        tenant: &tenant::Model,
        target: user::Model,
        request: &ProvisionRequest,
    ) -> Result<ProvisionOutcome, ApiError> {
        if request.manager_user_id == Some(target.id) {
            return Err(validation_error(
                "An employee cannot be their own manager",
                json!({ "manager_user_id": "Must reference a different user" }),
            ));
        }

        let employees = EmployeeRepository::new(conn);
        let existing = employees.find_by_user(tenant.id, target.id).await?;

        let (employee, created, changes) = match existing {
            Some(employee) => {
                self.apply_update(conn, tenant, &target, employee, request)
                    .await?
            }
            None => self.create_employee(conn, tenant, &target, request).await?,
        };

        if let Some(team_ids) = &request.team_ids {
            replace_teams(conn, tenant.id, employee.id, team_ids).await?;
        }

        let tasks = self
            .build_tasks(conn, tenant, &target, &employee, created, changes, request)
            .await?;

        Ok(ProvisionOutcome {
            employee,
            created,
            tasks,
        })
    }

    async fn create_employee<C: ConnectionTrait>(
        &self,
        conn: &C,
        tenant: &tenant::Model,
        target: &user::Model,
        request: &ProvisionRequest,
    ) -> Result<(employee::Model, bool, serde_json::Value), ApiError> {
        let mut field_errors = serde_json::Map::new();
        if request.job_title.as_deref().unwrap_or("").trim().is_empty() {
            field_errors.insert(
                "job_title".to_string(),
                json!("Job title is required to create an employee record"),
            );
        }
        if request.department_id.is_none() {
            field_errors.insert(
                "department_id".to_string(),
                json!("Department is required to create an employee record"),
            );
        }
        if !field_errors.is_empty() {
            return Err(validation_error(
                "Employee record cannot be created without department and job title",
                serde_json::Value::Object(field_errors),
            ));
        }

        let job_title = request.job_title.as_deref().unwrap_or("").trim().to_string();
        let department_id = request.department_id.expect("validated above");

        DepartmentRepository::new(conn)
            .find_by_tenant(tenant.id, department_id)
            .await?
            .ok_or_else(|| not_found("Department"))?;

        // Resolve the manager first; it may consume an employee number of
        // its own when the manager record is created on demand.
        let manager = match request.manager_user_id {
            Some(manager_user_id) => Some(
                resolve_manager(
                    conn,
                    tenant.id,
                    manager_user_id,
                    Some(department_id),
                    &self.allocator_config,
                )
                .await?,
            ),
            None => None,
        };

        let allocator = NumberAllocator::new(conn, &self.allocator_config);
        let allocated = allocator
            .allocate(tenant.id, Utc::now().date_naive())
            .await?;

        let employee = EmployeeRepository::new(conn)
            .insert(
                tenant.id,
                NewEmployee {
                    user_id: target.id,
                    employee_number: allocated.number,
                    job_title: job_title.clone(),
                    department_id,
                    employment_type: request
                        .employment_type
                        .clone()
                        .unwrap_or_else(|| "full_time".to_string()),
                    start_date: request.start_date.or_else(|| Some(Utc::now().date_naive())),
                    manager_id: manager.as_ref().map(|resolved| resolved.employee_id),
                },
            )
            .await?;

        UserRepository::new(conn)
            .link_employee(tenant.id, target.id, employee.id, department_id)
            .await?;

        let changes = json!({
            "before": serde_json::Value::Null,
            "after": {
                "employee_number": employee.employee_number,
                "job_title": employee.job_title,
                "department_id": employee.department_id.to_string(),
                "manager_id": employee.manager_id.map(|id| id.to_string()),
            },
        });

        Ok((employee, true, changes))
    }

    async fn apply_update<C: ConnectionTrait>(
        &self,
        conn: &C,
        tenant: &tenant::Model,
        _target: &user::Model,
        employee: employee::Model,
        request: &ProvisionRequest,
    ) -> Result<(employee::Model, bool, serde_json::Value), ApiError> {
        let before = json!({
            "job_title": employee.job_title,
            "manager_id": employee.manager_id.map(|id| id.to_string()),
        });

        let manager_id = match request.manager_user_id {
            Some(manager_user_id) => {
                let resolved = resolve_manager(
                    conn,
                    tenant.id,
                    manager_user_id,
                    request.department_id.or(Some(employee.department_id)),
                    &self.allocator_config,
                )
                .await?;

                // Reject an assignment that would fold the employee into its
                // own subordinate tree.
                if resolved.employee_id == employee.id {
                    return Err(validation_error(
                        "An employee cannot be their own manager",
                        json!({ "manager_user_id": "Must reference a different employee" }),
                    ));
                }
                let subtree =
                    hierarchy::collect_subordinates(conn, tenant.id, employee.id).await?;
                if subtree.contains(&resolved.employee_id) {
                    return Err(validation_error(
                        "Manager assignment would create a reporting cycle",
                        json!({ "manager_user_id": "Referenced manager reports to this employee" }),
                    ));
                }

                Some(Some(resolved.employee_id))
            }
            None => None,
        };

        let update = EmployeeUpdate {
            job_title: request
                .job_title
                .as_deref()
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_string),
            department_id: None,
            manager_id,
        };

        let employee = EmployeeRepository::new(conn).update(employee, update).await?;

        let changes = json!({
            "before": before,
            "after": {
                "job_title": employee.job_title,
                "manager_id": employee.manager_id.map(|id| id.to_string()),
            },
        });

        Ok((employee, false, changes))
    }

    #[allow(clippy::too_many_arguments)]
    async fn build_tasks<C: ConnectionTrait>(
        &self,
        conn: &C,
        tenant: &tenant::Model,
        target: &user::Model,
        employee: &employee::Model,
        created: bool,
        changes: serde_json::Value,
        request: &ProvisionRequest,
    ) -> Result<Vec<PostCommitTask>, ApiError> {
        let department_name = DepartmentRepository::new(conn)
            .find_by_tenant(tenant.id, employee.department_id)
            .await?
            .map(|department| department.name)
            .unwrap_or_default();

        let manager_contact = match employee.manager_id {
            Some(manager_employee_id) if request.manager_user_id.is_some() => {
                manager_notice_contact(conn, tenant.id, manager_employee_id).await?
            }
            _ => None,
        };

        let mut tasks = vec![PostCommitTask::Audit {
            tenant_id: tenant.id,
            action: if created {
                "employee.provisioned".to_string()
            } else {
                "employee.updated".to_string()
            },
            entity_type: "employee".to_string(),
            entity_id: employee.id,
            changes,
        }];

        let notice = AssignmentNotice {
            recipient: target.email.clone(),
            employee_name: target.display_name.clone(),
            role: target.role.clone(),
            job_title: employee.job_title.clone(),
            department: department_name,
            organization: tenant.name.clone(),
            manager_name: manager_contact.as_ref().map(|(name, _)| name.clone()),
        };
        tasks.push(PostCommitTask::NotifyAssignment(notice.clone()));

        if let Some((manager_name, manager_email)) = manager_contact {
            tasks.push(PostCommitTask::NotifyAssignment(AssignmentNotice {
                recipient: manager_email,
                manager_name: Some(manager_name),
                ..notice
            }));
        }

        tasks.push(PostCommitTask::InvalidateViews {
            tenant_id: tenant.id,
            prefixes: vec![
                cache::KEY_EMPLOYEES,
                cache::KEY_ORG_CHART,
                cache::KEY_DASHBOARD_STATS,
            ],
        });

        Ok(tasks)
    }
}

/// Look up the manager's display name and email for notification purposes.
async fn manager_notice_contact<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    manager_employee_id: Uuid,
) -> Result<Option<(String, String)>, ApiError> {
    let Some(manager_employee) = EmployeeRepository::new(conn)
        .find_by_tenant(tenant_id, manager_employee_id)
        .await?
    else {
        return Ok(None);
    };

    let manager_user = UserRepository::new(conn)
        .find_by_tenant(tenant_id, manager_employee.user_id)
        .await?;

    Ok(manager_user.map(|user| (user.display_name, user.email)))
}

/// Validate and replace an employee's team memberships wholesale.
async fn replace_teams<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    employee_id: Uuid,
    team_ids: &[Uuid],
) -> Result<(), ApiError> {
    let mut deduped: Vec<Uuid> = Vec::with_capacity(team_ids.len());
    for team_id in team_ids {
        if !deduped.contains(team_id) {
            deduped.push(*team_id);
        }
    }

    let teams = TeamRepository::new(conn);
    let found = teams.count_in_tenant(tenant_id, &deduped).await?;
    if found != deduped.len() as u64 {
        return Err(validation_error(
            "One or more teams do not exist in this tenant",
            json!({ "team_ids": "All teams must exist and belong to the tenant" }),
        ));
    }

    teams.replace_memberships(employee_id, &deduped).await
}
