//! Repository implementations for database operations.

pub mod admin_invitation;
pub mod company_member;
pub mod management_company;
pub mod role;
pub mod user;

pub use admin_invitation::AdminInvitationRepository;
