//! Admin invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{AdminInvitation, InvitationStatus};
use domain::ports::RepositoryError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for admin_invitation_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "admin_invitation_status", rename_all = "lowercase")]
pub enum InvitationStatusDb {
    Pending,
    Accepted,
    Expired,
    Cancelled,
}

impl From<InvitationStatusDb> for InvitationStatus {
    fn from(db: InvitationStatusDb) -> Self {
        match db {
            InvitationStatusDb::Pending => Self::Pending,
            InvitationStatusDb::Accepted => Self::Accepted,
            InvitationStatusDb::Expired => Self::Expired,
            InvitationStatusDb::Cancelled => Self::Cancelled,
        }
    }
}

impl From<InvitationStatus> for InvitationStatusDb {
    fn from(status: InvitationStatus) -> Self {
        match status {
            InvitationStatus::Pending => Self::Pending,
            InvitationStatus::Accepted => Self::Accepted,
            InvitationStatus::Expired => Self::Expired,
            InvitationStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Database row mapping for the admin_invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct AdminInvitationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub management_company_id: Uuid,
    pub token_hash: String,
    pub email: String,
    pub status: InvitationStatusDb,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AdminInvitationEntity> for AdminInvitation {
    type Error = RepositoryError;

    fn try_from(entity: AdminInvitationEntity) -> Result<Self, Self::Error> {
        let invitation = Self {
            id: entity.id,
            user_id: entity.user_id,
            management_company_id: entity.management_company_id,
            token_hash: entity.token_hash,
            email: entity.email,
            status: entity.status.into(),
            expires_at: entity.expires_at,
            accepted_at: entity.accepted_at,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        };
        if !invitation.is_consistent() {
            return Err(RepositoryError::Corrupt(format!(
                "Invitation {} is {} with accepted_at {:?}",
                invitation.id, invitation.status, invitation.accepted_at
            )));
        }
        Ok(invitation)
    }
}
