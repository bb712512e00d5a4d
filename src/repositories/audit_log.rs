//! # Audit Log Repository
//!
//! Append-only. This subsystem writes entries and never reads them back.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::audit_log::{ActiveModel as AuditLogActiveModel, Model as AuditLogModel};

/// Repository for audit log appends
pub struct AuditLogRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AuditLogRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Append an audit entry
    pub async fn append(
        &self,
        tenant_id: Uuid,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        changes: Option<JsonValue>,
    ) -> Result<AuditLogModel, ApiError> {
        let entry = AuditLogActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            action: Set(action.to_string()),
            entity_type: Set(entity_type.to_string()),
            entity_id: Set(entity_id),
            changes: Set(changes),
            created_at: Set(Utc::now().into()),
        };

        let result = entry.insert(self.conn).await?;

        Ok(result)
    }
}
