//! Domain models for the property management backend.

pub mod admin_invitation;
pub mod company_member;
pub mod management_company;
pub mod role;
pub mod user;

pub use admin_invitation::{AdminInvitation, InvitationStatus};
pub use company_member::{CompanyMember, MemberPermissions, MemberUpdate, NewCompanyMember};
pub use management_company::{CompanyUpdate, ManagementCompany};
pub use role::{NewUserRole, Role, RoleScope, UserRole};
pub use user::{User, UserUpdate};
