//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod admin_invitation;
pub mod company_member;
pub mod management_company;
pub mod role;
pub mod user;

pub use admin_invitation::{AdminInvitationEntity, InvitationStatusDb};
pub use company_member::CompanyMemberEntity;
pub use management_company::ManagementCompanyEntity;
pub use role::{RoleEntity, UserRoleEntity};
pub use user::UserEntity;
