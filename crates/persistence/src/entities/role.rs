//! Role and role assignment entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Role, RoleScope, UserRole};
use domain::ports::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the roles table.
#[derive(Debug, Clone, FromRow)]
pub struct RoleEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
}

impl From<RoleEntity> for Role {
    fn from(entity: RoleEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            is_system_role: entity.is_system_role,
        }
    }
}

/// Database row mapping for the user_roles table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub management_company_id: Option<Uuid>,
    pub condominium_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
    pub is_active: bool,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
}

impl TryFrom<UserRoleEntity> for UserRole {
    type Error = RepositoryError;

    fn try_from(entity: UserRoleEntity) -> Result<Self, Self::Error> {
        let scope = RoleScope::from_columns(
            entity.management_company_id,
            entity.condominium_id,
            entity.building_id,
        )
        .map_err(|e| RepositoryError::Corrupt(format!("user_role {}: {}", entity.id, e)))?;

        Ok(Self {
            id: entity.id,
            user_id: entity.user_id,
            role_id: entity.role_id,
            scope,
            is_active: entity.is_active,
            assigned_by: entity.assigned_by,
            assigned_at: entity.assigned_at,
        })
    }
}
