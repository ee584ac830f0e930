//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub external_subject_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            external_subject_id: entity.external_subject_id,
            email: entity.email,
            display_name: entity.display_name,
            first_name: entity.first_name,
            last_name: entity.last_name,
            is_active: entity.is_active,
            is_email_verified: entity.is_email_verified,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
