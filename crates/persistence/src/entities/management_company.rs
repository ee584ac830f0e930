//! Management company entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the management_companies table.
#[derive(Debug, Clone, FromRow)]
pub struct ManagementCompanyEntity {
    pub id: Uuid,
    pub name: String,
    pub legal_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ManagementCompanyEntity> for domain::models::ManagementCompany {
    fn from(entity: ManagementCompanyEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            legal_name: entity.legal_name,
            email: entity.email,
            is_active: entity.is_active,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
