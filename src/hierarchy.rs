//! # Reporting Hierarchy Queries
//!
//! Read-side traversal over the `manager_id` back-edges of the employees
//! table: transitive subordinate collection, direct reports, and the
//! approval-scope rule used by expense/timesheet style features.
//!
//! The manager graph is intended to be acyclic but nothing at the storage
//! layer enforces that, so every traversal carries a visited set and
//! terminates even on malformed data.

use std::collections::HashSet;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::employee::{self, Column as EmployeeColumn, Entity as Employee};

/// Collect the ids of all employees transitively reporting to `root_id`,
/// at any depth. The root itself is never part of the result. Order is not
/// significant.
///
/// Traversal is an iterative breadth-first walk with one query per level;
/// the visited set is checked before an id is ever enqueued, so a cycle in
/// the data costs at most one extra query.
pub async fn collect_subordinates<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    root_id: Uuid,
) -> Result<HashSet<Uuid>, ApiError> {
    let mut visited: HashSet<Uuid> = HashSet::from([root_id]);
    let mut subordinates: HashSet<Uuid> = HashSet::new();
    let mut frontier: Vec<Uuid> = vec![root_id];

    while !frontier.is_empty() {
        let reports = Employee::find()
            .filter(EmployeeColumn::TenantId.eq(tenant_id))
            .filter(EmployeeColumn::ManagerId.is_in(frontier.clone()))
            .all(conn)
            .await?;

        frontier.clear();
        for report in reports {
            if visited.insert(report.id) {
                subordinates.insert(report.id);
                frontier.push(report.id);
            }
        }
    }

    Ok(subordinates)
}

/// Load the employees whose `manager_id` equals `manager_id` (depth-1).
pub async fn direct_reports<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    manager_id: Uuid,
) -> Result<Vec<employee::Model>, ApiError> {
    let reports = Employee::find()
        .filter(EmployeeColumn::TenantId.eq(tenant_id))
        .filter(EmployeeColumn::ManagerId.eq(manager_id))
        .all(conn)
        .await?;

    Ok(reports)
}

/// Compute the set of employee ids whose submissions `employee` may see and
/// approve.
///
/// Rules:
/// - a root-level employee (no manager) with no reports sees only itself;
/// - a root-level employee with reports sees itself plus its direct reports;
/// - everyone else sees exactly their direct reports, never themselves.
pub async fn approval_scope<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    employee: &employee::Model,
) -> Result<HashSet<Uuid>, ApiError> {
    let reports = direct_reports(conn, tenant_id, employee.id).await?;
    let mut scope: HashSet<Uuid> = reports.into_iter().map(|report| report.id).collect();

    if employee.manager_id.is_none() {
        // Root-level users approve their own submissions.
        scope.insert(employee.id);
    }

    Ok(scope)
}
