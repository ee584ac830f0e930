//! Read-only invitation token preview for the confirmation page.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::crypto::token_prefix;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::error::{internal, InvitationError};
use super::token_resolver::{classify, resolve, TokenState};
use crate::models::InvitationStatus;
use crate::ports::InvitationStore;

const FAILED: &str = "Failed to validate invitation";

/// Invitee details shown before acceptance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InviteeSummary {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummary {
    pub name: String,
}

/// Validity of an invitation token at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenValidation {
    pub invitation_id: Uuid,
    /// Pending and not expired.
    pub is_valid: bool,
    pub is_expired: bool,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub user: InviteeSummary,
    pub company: CompanySummary,
}

/// Resolves a token and reports whether it can still be accepted. Never writes.
pub struct ValidateInvitationTokenService<S> {
    store: S,
}

impl<S: InvitationStore> ValidateInvitationTokenService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(&self, token: &str) -> Result<TokenValidation, InvitationError> {
        self.execute_at(token, Utc::now()).await
    }

    #[instrument(skip_all, fields(token_prefix = token_prefix(token)))]
    pub async fn execute_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenValidation, InvitationError> {
        let mut uow = self.store.begin().await.map_err(internal(FAILED))?;

        let invitation = resolve(uow.invitations(), token)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(InvitationError::invalid_token)?;

        let user = uow
            .users()
            .get_by_id(invitation.user_id)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| InvitationError::NotFound("User not found".to_string()))?;

        let company = uow
            .companies()
            .get_by_id(invitation.management_company_id)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| {
                InvitationError::NotFound("Management company not found".to_string())
            })?;

        let state = classify(&invitation, now);
        debug!(invitation_id = %invitation.id, ?state, "Invitation token validated");

        Ok(TokenValidation {
            invitation_id: invitation.id,
            is_valid: state == TokenState::Valid,
            is_expired: state == TokenState::Expired,
            status: invitation.status,
            expires_at: invitation.expires_at,
            user: InviteeSummary {
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                display_name: user.display_name,
            },
            company: CompanySummary { name: company.name },
        })
    }
}
