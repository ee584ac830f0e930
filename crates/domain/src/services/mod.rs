//! Domain services for the property management backend.
//!
//! Services contain business logic that operates on domain models through
//! repository ports.

pub mod invitations;

pub use invitations::{
    AcceptInvitationInput, AcceptInvitationService, ActivationPolicy, ActivationResult,
    CancelInvitationService, ErrorCode, InMemoryInvitationStore, InvitationError,
    ServiceFailure, TokenValidation, ValidateInvitationTokenService,
};
