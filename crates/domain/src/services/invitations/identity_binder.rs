//! External identity binding checks.
//!
//! One identity-provider subject binds to at most one internal account.

use uuid::Uuid;

use crate::ports::{RepositoryError, UserRepository};

/// Outcome of checking a subject against the account it should bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// No account holds the subject yet.
    Bind,
    /// The expected account already holds the subject (client retry).
    IdempotentNoop,
    /// Another account holds the subject.
    Conflict { bound_user_id: Uuid },
}

/// Decides whether `subject_id` may be bound to `expected_user_id`. Pure read.
pub async fn check_binding(
    users: &mut dyn UserRepository,
    subject_id: &str,
    expected_user_id: Uuid,
) -> Result<Binding, RepositoryError> {
    let binding = match users.get_by_external_subject_id(subject_id).await? {
        None => Binding::Bind,
        Some(user) if user.id == expected_user_id => Binding::IdempotentNoop,
        Some(user) => Binding::Conflict {
            bound_user_id: user.id,
        },
    };
    Ok(binding)
}
