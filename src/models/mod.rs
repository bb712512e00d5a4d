//! # Data Models
//!
//! This module contains all the SeaORM entities used throughout the Zenora
//! provisioning service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod audit_log;
pub mod department;
pub mod employee;
pub mod number_counter;
pub mod team;
pub mod team_member;
pub mod tenant;
pub mod user;

pub use audit_log::Entity as AuditLog;
pub use department::Entity as Department;
pub use employee::Entity as Employee;
pub use number_counter::Entity as NumberCounter;
pub use team::Entity as Team;
pub use team_member::Entity as TeamMember;
pub use tenant::Entity as Tenant;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "zenora-provisioning".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
