//! Admin invitation services.
//!
//! Acceptance is split into a token resolver, an identity binder and an
//! entity activator, sequenced by [`AcceptInvitationService`] inside one
//! unit of work.

pub mod accept;
pub mod cancel;
pub mod entity_activator;
pub mod error;
pub mod identity_binder;
pub mod memory;
pub mod token_resolver;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use accept::{AcceptInvitationInput, AcceptInvitationService};
pub use cancel::CancelInvitationService;
pub use entity_activator::{ActivationPolicy, ActivationResult, EntityActivator};
pub use error::{ErrorCode, InvitationError, ServiceFailure};
pub use identity_binder::{check_binding, Binding};
pub use memory::{FailPoint, InMemoryData, InMemoryInvitationStore};
pub use token_resolver::{classify, resolve, TokenState};
pub use validate::{CompanySummary, InviteeSummary, TokenValidation, ValidateInvitationTokenService};
