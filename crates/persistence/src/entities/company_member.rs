//! Management company member entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{CompanyMember, MemberPermissions};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the management_company_members table.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyMemberEntity {
    pub id: Uuid,
    pub management_company_id: Uuid,
    pub user_id: Uuid,
    pub role_name: String,
    pub permissions: Option<Json<MemberPermissions>>,
    pub is_primary_admin: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub invited_at: Option<DateTime<Utc>>,
    pub invited_by: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CompanyMemberEntity> for CompanyMember {
    fn from(entity: CompanyMemberEntity) -> Self {
        Self {
            id: entity.id,
            management_company_id: entity.management_company_id,
            user_id: entity.user_id,
            role_name: entity.role_name,
            permissions: entity.permissions.map(|Json(p)| p),
            is_primary_admin: entity.is_primary_admin,
            joined_at: entity.joined_at,
            invited_at: entity.invited_at,
            invited_by: entity.invited_by,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
