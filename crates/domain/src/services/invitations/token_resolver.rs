//! Invitation lookup by bearer token and lifecycle classification.

use chrono::{DateTime, Utc};
use shared::crypto::sha256_hex;

use super::error::InvitationError;
use crate::models::{AdminInvitation, InvitationStatus};
use crate::ports::{InvitationRepository, RepositoryError};

/// Lifecycle state of a resolved invitation at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Pending and not expired: eligible for acceptance.
    Valid,
    AlreadyAccepted,
    Cancelled,
    Expired,
}

impl TokenState {
    /// Converts a non-valid state into the failure surfaced to callers.
    pub fn into_result(self) -> Result<(), InvitationError> {
        match self {
            TokenState::Valid => Ok(()),
            TokenState::AlreadyAccepted => Err(InvitationError::already(InvitationStatus::Accepted)),
            TokenState::Cancelled => Err(InvitationError::already(InvitationStatus::Cancelled)),
            TokenState::Expired => Err(InvitationError::expired()),
        }
    }
}

/// Finds the invitation a bearer token refers to.
///
/// The token is hashed before lookup; raw tokens never reach storage. Pure read.
pub async fn resolve(
    invitations: &mut dyn InvitationRepository,
    token: &str,
) -> Result<Option<AdminInvitation>, RepositoryError> {
    if token.is_empty() {
        return Ok(None);
    }
    invitations.get_by_token_hash(&sha256_hex(token)).await
}

/// Classifies an invitation at `now`.
///
/// Status is checked before expiry, so an invitation accepted before it
/// expired reports `AlreadyAccepted`, never `Expired`.
pub fn classify(invitation: &AdminInvitation, now: DateTime<Utc>) -> TokenState {
    match invitation.status {
        InvitationStatus::Accepted => TokenState::AlreadyAccepted,
        InvitationStatus::Cancelled => TokenState::Cancelled,
        InvitationStatus::Expired => TokenState::Expired,
        InvitationStatus::Pending if invitation.is_expired_at(now) => TokenState::Expired,
        InvitationStatus::Pending => TokenState::Valid,
    }
}
