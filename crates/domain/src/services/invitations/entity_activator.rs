//! State transitions performed when an invitation is accepted.
//!
//! All writes go through one [`UnitOfWork`]; the caller commits or drops it.
//! Token, expiry and identity checks happen before activation and are not
//! repeated here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use super::error::{internal, InvitationError};
use crate::models::company_member::ADMIN_MEMBER_ROLE;
use crate::models::role::{ADMIN_ROLE_NAME, BASELINE_ROLE_NAME};
use crate::models::{
    AdminInvitation, CompanyMember, CompanyUpdate, InvitationStatus, ManagementCompany,
    MemberPermissions, MemberUpdate, NewCompanyMember, NewUserRole, Role, User, UserRole,
    UserUpdate,
};
use crate::ports::UnitOfWork;

const FAILED: &str = "Failed to accept invitation";

/// Defaults applied when activation has to create records from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPolicy {
    /// Role name of a membership created without a pre-provisioned row.
    pub member_role_name: String,
    /// Permissions of a membership created without a pre-provisioned row.
    pub member_permissions: MemberPermissions,
    /// Tenant-agnostic role granted once per user.
    pub baseline_role_name: String,
    /// Role granted per management company.
    pub admin_role_name: String,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self {
            member_role_name: ADMIN_MEMBER_ROLE.to_string(),
            member_permissions: MemberPermissions::primary_admin(),
            baseline_role_name: BASELINE_ROLE_NAME.to_string(),
            admin_role_name: ADMIN_ROLE_NAME.to_string(),
        }
    }
}

/// Records written (or confirmed) by one activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivationResult {
    pub invitation: AdminInvitation,
    pub user: User,
    pub company: ManagementCompany,
    pub member: CompanyMember,
    /// Global baseline assignment; pre-existing when the user already held it.
    pub baseline_role: UserRole,
    /// Company-scoped administrative assignment created by this activation.
    pub user_role: UserRole,
}

/// Activates the user, company, membership and role assignments of an invitation.
#[derive(Debug, Clone, Default)]
pub struct EntityActivator {
    policy: ActivationPolicy,
}

impl EntityActivator {
    pub fn new(policy: ActivationPolicy) -> Self {
        Self { policy }
    }

    /// Runs the activation steps in dependency order.
    ///
    /// Marking the invitation accepted is the last write and only succeeds
    /// while the invitation is still pending; losing that race yields
    /// "already been accepted" and the caller must discard the unit of work.
    #[instrument(
        skip_all,
        fields(invitation_id = %invitation.id, user_id = %invitation.user_id, company_id = %company.id)
    )]
    pub async fn activate(
        &self,
        uow: &mut dyn UnitOfWork,
        invitation: &AdminInvitation,
        company: &ManagementCompany,
        external_subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivationResult, InvitationError> {
        let user = uow
            .users()
            .update(invitation.user_id, &UserUpdate::activation(external_subject_id))
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| InvitationError::Internal("Failed to update user".to_string()))?;

        let company = if company.is_active {
            company.clone()
        } else {
            uow.companies()
                .update(company.id, &CompanyUpdate::activate())
                .await
                .map_err(internal(FAILED))?
                .ok_or_else(|| {
                    InvitationError::Internal("Failed to update management company".to_string())
                })?
        };

        let member = self.activate_membership(uow, invitation, now).await?;

        let baseline_role = self.ensure_baseline_role(uow, invitation).await?;

        let admin_role = self.role_by_name(uow, &self.policy.admin_role_name).await?;
        let user_role = uow
            .roles()
            .create_company_scoped_role(
                invitation.user_id,
                admin_role.id,
                invitation.management_company_id,
                invitation.created_by,
            )
            .await
            .map_err(internal(FAILED))?;

        let invitation = uow
            .invitations()
            .mark_as_accepted(invitation.id, now)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| InvitationError::already(InvitationStatus::Accepted))?;

        Ok(ActivationResult {
            invitation,
            user,
            company,
            member,
            baseline_role,
            user_role,
        })
    }

    async fn activate_membership(
        &self,
        uow: &mut dyn UnitOfWork,
        invitation: &AdminInvitation,
        now: DateTime<Utc>,
    ) -> Result<CompanyMember, InvitationError> {
        let existing = uow
            .memberships()
            .get_by_company_and_user(invitation.management_company_id, invitation.user_id)
            .await
            .map_err(internal(FAILED))?;

        match existing {
            Some(member) => {
                debug!(member_id = %member.id, "Activating pre-provisioned membership");
                uow.memberships()
                    .update(member.id, &MemberUpdate::join(now))
                    .await
                    .map_err(internal(FAILED))?
                    .ok_or_else(|| InvitationError::Internal("Failed to update member".to_string()))
            }
            None => {
                debug!("No pre-provisioned membership, creating one");
                let new_member = NewCompanyMember {
                    management_company_id: invitation.management_company_id,
                    user_id: invitation.user_id,
                    role_name: self.policy.member_role_name.clone(),
                    permissions: self.policy.member_permissions,
                    is_primary_admin: true,
                    joined_at: Some(now),
                    invited_at: Some(invitation.created_at),
                    invited_by: invitation.created_by,
                    is_active: true,
                };
                uow.memberships()
                    .create(&new_member)
                    .await
                    .map_err(internal(FAILED))
            }
        }
    }

    async fn ensure_baseline_role(
        &self,
        uow: &mut dyn UnitOfWork,
        invitation: &AdminInvitation,
    ) -> Result<UserRole, InvitationError> {
        let role = self.role_by_name(uow, &self.policy.baseline_role_name).await?;

        let existing = uow
            .roles()
            .find_global_assignment(invitation.user_id, role.id)
            .await
            .map_err(internal(FAILED))?;
        if let Some(assignment) = existing {
            return Ok(assignment);
        }

        uow.roles()
            .create(&NewUserRole::global(
                invitation.user_id,
                role.id,
                invitation.created_by,
            ))
            .await
            .map_err(internal(FAILED))
    }

    async fn role_by_name(
        &self,
        uow: &mut dyn UnitOfWork,
        name: &str,
    ) -> Result<Role, InvitationError> {
        uow.roles()
            .get_by_name(name)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| {
                tracing::error!(role = name, "System role missing");
                InvitationError::Internal(format!("{} role not found in system", name))
            })
    }
}
