//! # Employee Number Allocation
//!
//! Employee numbers have the form `EMP-YYYYMMDD-NNN` and must be unique per
//! tenant. The sequence component is handed out by a per-(tenant, day)
//! counter row mutated through a single upsert-with-increment statement, so
//! concurrent provisioning requests can never observe the same value.
//!
//! A bounded retry loop guards against collisions with legacy employee rows
//! that predate the counter; exhausting it surfaces a retryable conflict
//! instead of a storage-constraint error.

use chrono::NaiveDate;
use metrics::counter;
use rand::Rng;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait, QueryFilter,
    Statement,
};
use tokio::time::{Duration, sleep};
use uuid::Uuid;

use crate::config::AllocatorConfig;
use crate::error::{ApiError, conflict};
use crate::models::employee::{Column as EmployeeColumn, Entity as Employee};

/// A freshly allocated employee number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedNumber {
    /// Sequence component within the (tenant, day) scope
    pub sequence: i32,
    /// Rendered number, e.g. `EMP-20251226-007`
    pub number: String,
}

/// Render an employee number from its parts. Sequences above 999 widen the
/// suffix rather than wrapping.
pub fn employee_number(day: NaiveDate, sequence: i32) -> String {
    format!("EMP-{}-{:03}", day.format("%Y%m%d"), sequence)
}

/// Allocator for per-tenant, per-day employee number sequences.
///
/// Generic over the connection so it can run inside an open transaction.
pub struct NumberAllocator<'a, C: ConnectionTrait> {
    conn: &'a C,
    config: AllocatorConfig,
}

impl<'a, C: ConnectionTrait> NumberAllocator<'a, C> {
    pub fn new(conn: &'a C, config: &AllocatorConfig) -> Self {
        Self {
            conn,
            config: config.clone(),
        }
    }

    /// Allocate the next unused employee number for the tenant and day.
    ///
    /// Each call advances the counter exactly once. Because the counter is
    /// monotonic, concurrent callers always receive distinct sequences; the
    /// existence probe below only filters collisions with employee rows that
    /// were created before the counter existed.
    pub async fn allocate(
        &self,
        tenant_id: Uuid,
        day: NaiveDate,
    ) -> Result<AllocatedNumber, ApiError> {
        let mut backoff = Duration::from_millis(self.config.retry_base_ms);

        for attempt in 1..=self.config.max_retries {
            let sequence = self.increment(tenant_id, day).await?;
            let number = employee_number(day, sequence);

            let in_use = Employee::find()
                .filter(EmployeeColumn::TenantId.eq(tenant_id))
                .filter(EmployeeColumn::EmployeeNumber.eq(number.clone()))
                .count(self.conn)
                .await?
                > 0;

            if !in_use {
                counter!("employee_number_allocations_total").increment(1);
                return Ok(AllocatedNumber { sequence, number });
            }

            counter!("employee_number_conflicts_total").increment(1);
            tracing::warn!(
                tenant_id = %tenant_id,
                %number,
                attempt,
                "Allocated employee number already in use, retrying"
            );

            if attempt < self.config.max_retries {
                let jitter = rand::thread_rng().gen_range(0..=self.config.retry_base_ms);
                sleep(backoff + Duration::from_millis(jitter)).await;
                backoff *= 2;
            }
        }

        Err(conflict(
            "Unable to allocate a unique employee number, please retry",
            1,
        ))
    }

    /// Advance the counter row and return the new value. This is the single
    /// serialized mutation in the subsystem.
    async fn increment(&self, tenant_id: Uuid, day: NaiveDate) -> Result<i32, ApiError> {
        let backend = self.conn.get_database_backend();

        let sql = match backend {
            DatabaseBackend::Postgres => {
                "INSERT INTO employee_number_counters (tenant_id, day, last_number) \
                 VALUES ($1, $2, 1) \
                 ON CONFLICT (tenant_id, day) \
                 DO UPDATE SET last_number = employee_number_counters.last_number + 1 \
                 RETURNING last_number"
            }
            _ => {
                "INSERT INTO employee_number_counters (tenant_id, day, last_number) \
                 VALUES (?, ?, 1) \
                 ON CONFLICT (tenant_id, day) \
                 DO UPDATE SET last_number = employee_number_counters.last_number + 1 \
                 RETURNING last_number"
            }
        };

        let stmt = Statement::from_sql_and_values(backend, sql, [tenant_id.into(), day.into()]);

        let row = self
            .conn
            .query_one(stmt)
            .await?
            .ok_or_else(|| ApiError::from(sea_orm::DbErr::RecordNotFound(
                "employee_number_counters".to_string(),
            )))?;

        let last_number: i32 = row.try_get("", "last_number").map_err(ApiError::from)?;

        Ok(last_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_number_format() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 26).unwrap();
        assert_eq!(employee_number(day, 7), "EMP-20251226-007");
        assert_eq!(employee_number(day, 42), "EMP-20251226-042");
        assert_eq!(employee_number(day, 100), "EMP-20251226-100");
    }

    #[test]
    fn test_employee_number_widens_past_999() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(employee_number(day, 1000), "EMP-20260102-1000");
    }

    #[test]
    fn test_employee_number_pads_single_digit_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(employee_number(day, 1), "EMP-20260305-001");
    }
}
