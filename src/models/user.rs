//! User entity model
//!
//! Users are tenant-scoped identities. A user may carry a one-to-one link to
//! an employee record via `employee_id` once provisioned.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Unique per tenant
    pub email: String,
    pub display_name: String,
    /// Role slug, see [`UserRole`]
    pub role: String,
    /// Lifecycle status: `active`, `invited`, or `disabled`
    pub status: String,
    pub department_id: Option<Uuid>,
    /// One-to-one link to the employees table, set on provisioning
    pub employee_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id"
    )]
    Tenant,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Manager,
    Hr,
    Employee,
    Accountant,
}

impl UserRole {
    /// Parse a role from its string slug; unknown slugs resolve to `None`
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "manager" => Some(UserRole::Manager),
            "hr" => Some(UserRole::Hr),
            "employee" => Some(UserRole::Employee),
            "accountant" => Some(UserRole::Accountant),
            _ => None,
        }
    }

    /// Get the string representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Hr => "hr",
            UserRole::Employee => "employee",
            UserRole::Accountant => "accountant",
        }
    }

    /// Default job title assigned when an employee record is auto-created
    /// for a user of this role (single source of truth for the mapping).
    pub fn default_job_title(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrator",
            UserRole::Hr => "HR Manager",
            _ => "Manager",
        }
    }
}

impl Model {
    /// Role of this user, defaulting to `Employee` for unknown slugs
    pub fn user_role(&self) -> UserRole {
        UserRole::from_slug(&self.role).unwrap_or(UserRole::Employee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_slug() {
        assert_eq!(UserRole::from_slug("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_slug("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_slug("hr"), Some(UserRole::Hr));
        assert_eq!(UserRole::from_slug("accountant"), Some(UserRole::Accountant));
        assert_eq!(UserRole::from_slug("intern"), None);
    }

    #[test]
    fn test_default_job_title_mapping() {
        assert_eq!(UserRole::Admin.default_job_title(), "Administrator");
        assert_eq!(UserRole::Hr.default_job_title(), "HR Manager");
        assert_eq!(UserRole::Manager.default_job_title(), "Manager");
        assert_eq!(UserRole::Employee.default_job_title(), "Manager");
        assert_eq!(UserRole::Accountant.default_job_title(), "Manager");
    }
}
