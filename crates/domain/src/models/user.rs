//! User account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of the placeholder subject given to pre-provisioned accounts.
///
/// A placeholder never matches a real identity-provider subject.
pub const PENDING_SUBJECT_PREFIX: &str = "pending_";

/// User account domain model.
///
/// `external_subject_id` references the identity provider's subject; the
/// provider owns the identity, this record only points at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
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

impl User {
    /// Whether the account still carries its pre-provisioning placeholder subject.
    pub fn has_placeholder_subject(&self) -> bool {
        self.external_subject_id.starts_with(PENDING_SUBJECT_PREFIX)
    }
}

/// Partial update of a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub external_subject_id: Option<String>,
    pub is_active: Option<bool>,
    pub is_email_verified: Option<bool>,
}

impl UserUpdate {
    /// Update that binds `subject` and marks the account active and verified.
    pub fn activation(subject: impl Into<String>) -> Self {
        Self {
            external_subject_id: Some(subject.into()),
            is_active: Some(true),
            is_email_verified: Some(true),
        }
    }

    /// Applies the update to an in-memory copy of a user.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(subject) = &self.external_subject_id {
            user.external_subject_id = subject.clone();
        }
        if let Some(active) = self.is_active {
            user.is_active = active;
        }
        if let Some(verified) = self.is_email_verified {
            user.is_email_verified = verified;
        }
    }
}
