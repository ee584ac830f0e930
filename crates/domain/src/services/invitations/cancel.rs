//! Invitation cancellation.

use tracing::{info, instrument};
use uuid::Uuid;

use super::error::{internal, InvitationError};
use crate::models::AdminInvitation;
use crate::ports::InvitationStore;

const FAILED: &str = "Failed to cancel invitation";

fn not_cancellable(status: impl std::fmt::Display) -> InvitationError {
    InvitationError::BadRequest(format!(
        "Cannot cancel an invitation that has already been {}",
        status
    ))
}

/// Cancels pending invitations.
pub struct CancelInvitationService<S> {
    store: S,
}

impl<S: InvitationStore> CancelInvitationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, invitation_id: Uuid) -> Result<AdminInvitation, InvitationError> {
        let mut uow = self.store.begin().await.map_err(internal(FAILED))?;

        let invitation = uow
            .invitations()
            .get_by_id(invitation_id)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| InvitationError::NotFound("Invitation not found".to_string()))?;

        if !invitation.is_pending() {
            return Err(not_cancellable(invitation.status));
        }

        // Conditional update; a concurrent accept or cancel leaves no row to flip.
        let cancelled = match uow
            .invitations()
            .mark_as_cancelled(invitation_id)
            .await
            .map_err(internal(FAILED))?
        {
            Some(cancelled) => cancelled,
            None => {
                let current = uow
                    .invitations()
                    .get_by_id(invitation_id)
                    .await
                    .map_err(internal(FAILED))?
                    .map(|i| i.status)
                    .unwrap_or(invitation.status);
                return Err(not_cancellable(current));
            }
        };

        uow.commit().await.map_err(internal(FAILED))?;

        info!(invitation_id = %cancelled.id, "Invitation cancelled");
        Ok(cancelled)
    }
}
