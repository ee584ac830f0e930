//! Administrator invitation domain models.
//!
//! An invitation grants the right to activate one pre-provisioned
//! administrator account and its management company.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of an administrator invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Cancelled,
}

impl InvitationStatus {
    /// Returns the storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
            InvitationStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "expired" => Ok(InvitationStatus::Expired),
            "cancelled" => Ok(InvitationStatus::Cancelled),
            _ => Err(format!("Unknown invitation status: {}", s)),
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrator invitation domain model.
///
/// The raw bearer token is never stored; `token_hash` is the SHA-256 hex
/// digest used for lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminInvitation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub management_company_id: Uuid,
    #[serde(skip_serializing, default)]
    pub token_hash: String,
    pub email: String,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminInvitation {
    /// Whether the invitation can still transition to `accepted`.
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Whether the invitation has passed its expiry instant at `now`.
    ///
    /// Expiry is strict: an invitation expiring exactly at `now` is still usable.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Checks `status = accepted ⇔ accepted_at ≠ null`.
    pub fn is_consistent(&self) -> bool {
        (self.status == InvitationStatus::Accepted) == self.accepted_at.is_some()
    }
}
