//! # Team Repository
//!
//! Teams plus the membership join rows. Membership updates are wholesale
//! replacement: delete everything, insert the provided list.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::team::{
    ActiveModel as TeamActiveModel, Column as TeamColumn, Entity as Team, Model as TeamModel,
};
use crate::models::team_member::{
    ActiveModel as TeamMemberActiveModel, Column as TeamMemberColumn, Entity as TeamMember,
};

/// Repository for team and team-membership operations
pub struct TeamRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TeamRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a team within the tenant
    pub async fn create(&self, tenant_id: Uuid, name: &str) -> Result<TeamModel, ApiError> {
        let team = TeamActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            name: Set(name.trim().to_string()),
            created_at: Set(Utc::now().into()),
        };

        let result = team.insert(self.conn).await?;

        Ok(result)
    }

    /// Count how many of the given team ids exist within the tenant
    pub async fn count_in_tenant(
        &self,
        tenant_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<u64, ApiError> {
        if team_ids.is_empty() {
            return Ok(0);
        }

        let count = Team::find()
            .filter(TeamColumn::TenantId.eq(tenant_id))
            .filter(TeamColumn::Id.is_in(team_ids.to_vec()))
            .count(self.conn)
            .await?;

        Ok(count)
    }

    /// List the team ids an employee currently belongs to
    pub async fn list_membership_ids(&self, employee_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
        let memberships = TeamMember::find()
            .filter(TeamMemberColumn::EmployeeId.eq(employee_id))
            .all(self.conn)
            .await?;

        Ok(memberships.into_iter().map(|row| row.team_id).collect())
    }

    /// Replace an employee's memberships wholesale: every existing row is
    /// deleted, then the provided list is inserted. An empty list clears all
    /// memberships. This is not a diff.
    pub async fn replace_memberships(
        &self,
        employee_id: Uuid,
        team_ids: &[Uuid],
    ) -> Result<(), ApiError> {
        TeamMember::delete_many()
            .filter(TeamMemberColumn::EmployeeId.eq(employee_id))
            .exec(self.conn)
            .await?;

        let now = Utc::now();
        for team_id in team_ids {
            let membership = TeamMemberActiveModel {
                id: Set(Uuid::new_v4()),
                team_id: Set(*team_id),
                employee_id: Set(employee_id),
                created_at: Set(now.into()),
            };
            membership.insert(self.conn).await?;
        }

        Ok(())
    }
}
