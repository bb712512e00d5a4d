//! # Manager Resolution
//!
//! Translates a manager *user* reference into the employee id stored in
//! `employees.manager_id`, creating the manager's own employee record on
//! demand. Resolution is idempotent: a manager that already has a linked
//! employee record is returned as-is with no side effect.

use chrono::Utc;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::config::AllocatorConfig;
use crate::error::{ApiError, cross_tenant, not_found, validation_error};
use crate::repositories::{EmployeeRepository, UserRepository};
use crate::repositories::employee::NewEmployee;
use crate::sequence::NumberAllocator;

/// Outcome of manager resolution.
#[derive(Debug, Clone)]
pub struct ResolvedManager {
    /// Employee id to store as `manager_id`
    pub employee_id: Uuid,
    /// Display name, used for notifications
    pub display_name: String,
    /// Email of the manager's user, used for notifications
    pub email: String,
    /// True when a new employee record was created for the manager
    pub created: bool,
}

/// Resolve `manager_user_id` to an employee id within `tenant_id`.
///
/// If the manager has no employee record yet, one is created: the
/// department falls back to `fallback_department_id` when the manager's own
/// is unset, the job title derives from the manager's role, and an employee
/// number is allocated for today. An unresolvable department is rejected
/// here rather than left to surface as a foreign-key failure.
pub async fn resolve_manager<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    manager_user_id: Uuid,
    fallback_department_id: Option<Uuid>,
    allocator_config: &AllocatorConfig,
) -> Result<ResolvedManager, ApiError> {
    let users = UserRepository::new(conn);

    let manager_user = users
        .find_any(manager_user_id)
        .await?
        .ok_or_else(|| not_found("Manager user"))?;

    if manager_user.tenant_id != tenant_id {
        return Err(cross_tenant("Manager"));
    }

    let employees = EmployeeRepository::new(conn);

    // Idempotent path: the link already exists.
    if let Some(employee_id) = manager_user.employee_id {
        if let Some(existing) = employees.find_by_tenant(tenant_id, employee_id).await? {
            return Ok(ResolvedManager {
                employee_id: existing.id,
                display_name: manager_user.display_name,
                email: manager_user.email,
                created: false,
            });
        }
    }

    // A record may exist without the back-link (e.g. written by an earlier,
    // partially failed provisioning); repair the link instead of duplicating.
    if let Some(existing) = employees.find_by_user(tenant_id, manager_user.id).await? {
        users
            .link_employee(tenant_id, manager_user.id, existing.id, existing.department_id)
            .await?;
        return Ok(ResolvedManager {
            employee_id: existing.id,
            display_name: manager_user.display_name,
            email: manager_user.email,
            created: false,
        });
    }

    let department_id = manager_user
        .department_id
        .or(fallback_department_id)
        .ok_or_else(|| {
            validation_error(
                "Manager department could not be resolved",
                serde_json::json!({
                    "manager_user_id": manager_user.id.to_string(),
                    "department": "Manager has no department and no fallback was provided",
                }),
            )
        })?;

    let allocator = NumberAllocator::new(conn, allocator_config);
    let allocated = allocator
        .allocate(tenant_id, Utc::now().date_naive())
        .await?;

    let job_title = manager_user.user_role().default_job_title().to_string();

    let employee = employees
        .insert(
            tenant_id,
            NewEmployee {
                user_id: manager_user.id,
                employee_number: allocated.number,
                job_title,
                department_id,
                employment_type: "full_time".to_string(),
                start_date: Some(Utc::now().date_naive()),
                manager_id: None,
            },
        )
        .await?;

    users
        .link_employee(tenant_id, manager_user.id, employee.id, department_id)
        .await?;

    tracing::info!(
        tenant_id = %tenant_id,
        manager_user_id = %manager_user.id,
        employee_id = %employee.id,
        employee_number = %employee.employee_number,
        "Created employee record for manager on demand"
    );

    Ok(ResolvedManager {
        employee_id: employee.id,
        display_name: manager_user.display_name,
        email: manager_user.email,
        created: true,
    })
}
