//! Typed failures returned by the invitation services.

use serde::Serialize;

use crate::ports::RepositoryError;

/// Message returned for any token that does not resolve to an invitation.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid invitation token";

/// Message returned when an invitation is past its expiry.
pub const EXPIRED_MESSAGE: &str = "Invitation has expired";

/// Message returned when an external identity belongs to another account.
pub const IDENTITY_CONFLICT_MESSAGE: &str = "This account is already linked to another user";

/// Stable machine-readable failure code. Callers map these 1:1 to transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    BadRequest,
    Conflict,
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::BadRequest => write!(f, "BAD_REQUEST"),
            ErrorCode::Conflict => write!(f, "CONFLICT"),
            ErrorCode::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Failure of an invitation service call.
///
/// The display form is the human-readable message only; it is stable so
/// retries fail identically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvitationError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl InvitationError {
    pub fn invalid_token() -> Self {
        InvitationError::NotFound(INVALID_TOKEN_MESSAGE.to_string())
    }

    pub fn expired() -> Self {
        InvitationError::BadRequest(EXPIRED_MESSAGE.to_string())
    }

    pub fn identity_conflict() -> Self {
        InvitationError::Conflict(IDENTITY_CONFLICT_MESSAGE.to_string())
    }

    /// The invitation already left the pending state, e.g. "already been accepted".
    pub fn already(status: impl std::fmt::Display) -> Self {
        InvitationError::BadRequest(format!("Invitation has already been {}", status))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            InvitationError::NotFound(_) => ErrorCode::NotFound,
            InvitationError::BadRequest(_) => ErrorCode::BadRequest,
            InvitationError::Conflict(_) => ErrorCode::Conflict,
            InvitationError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            InvitationError::NotFound(msg)
            | InvitationError::BadRequest(msg)
            | InvitationError::Conflict(msg)
            | InvitationError::Internal(msg) => msg,
        }
    }

    /// Serializable `{success: false, code, error}` form for callers.
    pub fn to_failure(&self) -> ServiceFailure {
        ServiceFailure {
            success: false,
            code: self.code(),
            error: self.message().to_string(),
        }
    }
}

/// Wire shape of a failed service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceFailure {
    pub success: bool,
    pub code: ErrorCode,
    pub error: String,
}

/// Converts a repository failure into a generic internal error, logging the detail.
pub(crate) fn internal(context: &'static str) -> impl FnOnce(RepositoryError) -> InvitationError {
    move |err| {
        tracing::error!(error = %err, "{}", context);
        InvitationError::Internal(context.to_string())
    }
}
