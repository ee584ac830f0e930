//! Invitation acceptance entry point.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::crypto::token_prefix;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::entity_activator::{ActivationPolicy, ActivationResult, EntityActivator};
use super::error::{internal, InvitationError};
use super::identity_binder::{check_binding, Binding};
use super::token_resolver::{classify, resolve};
use crate::ports::InvitationStore;

const FAILED: &str = "Failed to accept invitation";

/// Request to accept an invitation with a verified external identity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AcceptInvitationInput {
    /// Bearer token delivered in the invitation email.
    #[validate(length(min = 1, max = 512))]
    pub token: String,

    /// Subject issued by the identity provider after verification.
    #[validate(length(min = 1, max = 128))]
    pub external_subject_id: String,
}

impl AcceptInvitationInput {
    pub fn new(token: impl Into<String>, external_subject_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            external_subject_id: external_subject_id.into(),
        }
    }
}

/// Accepts admin invitations in one transaction.
pub struct AcceptInvitationService<S> {
    store: S,
    activator: EntityActivator,
}

impl<S: InvitationStore> AcceptInvitationService<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, ActivationPolicy::default())
    }

    pub fn with_policy(store: S, policy: ActivationPolicy) -> Self {
        Self {
            store,
            activator: EntityActivator::new(policy),
        }
    }

    pub async fn execute(
        &self,
        input: AcceptInvitationInput,
    ) -> Result<ActivationResult, InvitationError> {
        self.execute_at(input, Utc::now()).await
    }

    /// Accepts the invitation as of `now`.
    ///
    /// Every read and write runs inside one unit of work. Any failure drops it
    /// uncommitted, so no partial state is ever published.
    #[instrument(skip_all, fields(token_prefix = token_prefix(&input.token)))]
    pub async fn execute_at(
        &self,
        input: AcceptInvitationInput,
        now: DateTime<Utc>,
    ) -> Result<ActivationResult, InvitationError> {
        if let Err(errors) = input.validate() {
            if errors.field_errors().contains_key("token") {
                return Err(InvitationError::invalid_token());
            }
            return Err(InvitationError::BadRequest(
                "Invalid external subject id".to_string(),
            ));
        }

        let mut uow = self.store.begin().await.map_err(internal(FAILED))?;

        let invitation = resolve(uow.invitations(), &input.token)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| {
                warn!("Invitation token did not resolve");
                InvitationError::invalid_token()
            })?;

        classify(&invitation, now).into_result().map_err(|err| {
            info!(invitation_id = %invitation.id, reason = %err, "Invitation not acceptable");
            err
        })?;

        uow.users()
            .get_by_id(invitation.user_id)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| {
                tracing::error!(invitation_id = %invitation.id, user_id = %invitation.user_id, "Invited user missing");
                InvitationError::NotFound("User not found".to_string())
            })?;

        let company = uow
            .companies()
            .get_by_id(invitation.management_company_id)
            .await
            .map_err(internal(FAILED))?
            .ok_or_else(|| {
                tracing::error!(
                    invitation_id = %invitation.id,
                    company_id = %invitation.management_company_id,
                    "Invited management company missing"
                );
                InvitationError::NotFound("Management company not found".to_string())
            })?;

        match check_binding(uow.users(), &input.external_subject_id, invitation.user_id)
            .await
            .map_err(internal(FAILED))?
        {
            Binding::Conflict { bound_user_id } => {
                warn!(
                    invitation_id = %invitation.id,
                    bound_user_id = %bound_user_id,
                    "External identity already bound to another user"
                );
                return Err(InvitationError::identity_conflict());
            }
            Binding::IdempotentNoop => {
                info!(invitation_id = %invitation.id, "External identity already bound to invited user");
            }
            Binding::Bind => {}
        }

        let result = self
            .activator
            .activate(
                uow.as_mut(),
                &invitation,
                &company,
                &input.external_subject_id,
                now,
            )
            .await?;

        uow.commit().await.map_err(internal(FAILED))?;

        info!(
            invitation_id = %result.invitation.id,
            user_id = %result.user.id,
            company_id = %result.company.id,
            "Invitation accepted"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::models::role::ADMIN_ROLE_NAME;
    use crate::models::{CompanyMember, InvitationStatus, MemberPermissions, RoleScope};
    use crate::services::invitations::error::ErrorCode;
    use crate::services::invitations::memory::{FailPoint, InMemoryInvitationStore};
    use crate::services::invitations::test_support::*;

    fn service(store: &InMemoryInvitationStore) -> AcceptInvitationService<InMemoryInvitationStore> {
        AcceptInvitationService::new(store.clone())
    }

    #[tokio::test]
    async fn test_accept_activates_everything() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;

        let result = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();

        assert_eq!(result.invitation.status, InvitationStatus::Accepted);
        assert!(result.invitation.accepted_at.is_some());
        assert!(result.user.is_active);
        assert!(result.user.is_email_verified);
        assert_eq!(result.user.external_subject_id, SUBJECT);
        assert!(result.company.is_active);
        assert!(result.member.is_active);
        assert_eq!(result.member.role_name, "admin");
        assert!(result.member.is_primary_admin);
        assert_eq!(result.member.permissions, Some(MemberPermissions::primary_admin()));
        assert_eq!(result.member.invited_by, Some(seeded.inviter_id));
        assert_eq!(result.baseline_role.scope, RoleScope::Global);
        assert_eq!(result.baseline_role.role_id, seeded.baseline_role_id);
        assert_eq!(
            result.user_role.scope,
            RoleScope::ManagementCompany(seeded.company_id)
        );
        assert_eq!(result.user_role.role_id, seeded.admin_role_id);
        assert_eq!(result.user_role.assigned_by, Some(seeded.inviter_id));

        let data = store.snapshot().await;
        let invitation = &data.invitations[&seeded.invitation_id];
        assert_eq!(invitation.status, InvitationStatus::Accepted);
        assert!(invitation.is_consistent());
        assert_eq!(data.users[&seeded.user_id].external_subject_id, SUBJECT);
        assert!(data.companies[&seeded.company_id].is_active);
        assert_eq!(data.members_for(seeded.company_id, seeded.user_id).len(), 1);

        let roles = data.roles_for_user(seeded.user_id);
        assert_eq!(roles.len(), 2);
        assert!(roles.iter().any(|r| r.scope.is_global()));
        assert!(roles
            .iter()
            .any(|r| r.scope.management_company_id() == Some(seeded.company_id)));

        let mut uow = store.begin().await.unwrap();
        let scoped = uow
            .roles()
            .get_by_user_and_company(seeded.user_id, seeded.company_id)
            .await
            .unwrap();
        assert_eq!(scoped, vec![result.user_role]);
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found_without_writes() {
        let store = InMemoryInvitationStore::new();
        seed_pending(&store).await;
        let before = store.snapshot().await;

        let err = service(&store)
            .execute(AcceptInvitationInput::new("no-such-token", SUBJECT))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Invalid invitation token");
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_already_accepted_is_bad_request_without_writes() {
        let store = InMemoryInvitationStore::new();
        seed_pending(&store).await;
        let svc = service(&store);
        svc.execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();
        let before = store.snapshot().await;

        let err = svc
            .execute(AcceptInvitationInput::new(TOKEN, "auth0|someone-else"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert!(err.message().contains("already been accepted"));
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_replay_after_success_is_rejected_on_status() {
        let store = InMemoryInvitationStore::new();
        seed_pending(&store).await;
        let svc = service(&store);
        svc.execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();

        let err = svc
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap_err();

        assert_eq!(err, InvitationError::already(InvitationStatus::Accepted));
    }

    #[tokio::test]
    async fn test_expired_is_bad_request_without_writes() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_with_expiry(&store, TOKEN, Utc::now() - Duration::days(1)).await;
        let before = store.snapshot().await;

        let err = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::BadRequest);
        assert_eq!(err.message(), "Invitation has expired");
        let after = store.snapshot().await;
        assert_eq!(after, before);
        assert_eq!(
            after.invitations[&seeded.invitation_id].status,
            InvitationStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_inclusive() {
        let store = InMemoryInvitationStore::new();
        let expires_at = Utc::now() + Duration::hours(2);
        seed_with_expiry(&store, TOKEN, expires_at).await;

        let result = service(&store)
            .execute_at(AcceptInvitationInput::new(TOKEN, SUBJECT), expires_at)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_identity_conflict_without_writes() {
        let store = InMemoryInvitationStore::new();
        seed_pending(&store).await;
        let other = active_user(SUBJECT);
        store
            .seed(|data| {
                data.users.insert(other.id, other);
            })
            .await;
        let before = store.snapshot().await;

        let err = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::Conflict);
        assert!(err.message().contains("already linked to another user"));
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_subject_already_bound_to_invited_user_succeeds() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        store
            .seed(|data| {
                if let Some(user) = data.users.get_mut(&seeded.user_id) {
                    user.external_subject_id = SUBJECT.to_string();
                }
            })
            .await;

        let result = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();

        assert_eq!(result.user.id, seeded.user_id);
        assert_eq!(result.user.external_subject_id, SUBJECT);
    }

    #[tokio::test]
    async fn test_failure_mid_activation_leaves_no_partial_state() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        let before = store.snapshot().await;
        let svc = service(&store);

        for point in [
            FailPoint::RoleAssignment,
            FailPoint::MarkAccepted,
            FailPoint::Commit,
        ] {
            store.fail_on(point);
            let err = svc
                .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
                .await
                .unwrap_err();

            assert_eq!(err, InvitationError::Internal(FAILED.to_string()));
            let after = store.snapshot().await;
            assert_eq!(after, before, "state leaked at {:?}", point);
            assert_eq!(
                after.invitations[&seeded.invitation_id].status,
                InvitationStatus::Pending
            );
            assert!(after
                .members_for(seeded.company_id, seeded.user_id)
                .is_empty());
            assert!(after.roles_for_user(seeded.user_id).is_empty());
        }

        store.clear_failure();
        assert!(svc
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_acceptance_has_one_winner() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        let svc = Arc::new(service(&store));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move {
                    svc.execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
                        .await
                })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let loser = outcomes.into_iter().find_map(Result::err).unwrap();
        assert_eq!(loser.code(), ErrorCode::BadRequest);
        assert!(loser.message().contains("already been accepted"));

        let data = store.snapshot().await;
        assert_eq!(data.members_for(seeded.company_id, seeded.user_id).len(), 1);
        assert_eq!(data.roles_for_user(seeded.user_id).len(), 2);
    }

    #[tokio::test]
    async fn test_pre_provisioned_membership_is_activated_not_duplicated() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        let member = pre_provisioned_member(seeded.company_id, seeded.user_id, seeded.inviter_id);
        let member_id = member.id;
        store
            .seed(|data| {
                data.members.insert(member_id, member);
            })
            .await;

        let result = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();

        assert_eq!(result.member.id, member_id);
        assert!(result.member.is_active);
        assert!(result.member.joined_at.is_some());
        let data = store.snapshot().await;
        assert_eq!(data.members_for(seeded.company_id, seeded.user_id).len(), 1);
    }

    #[tokio::test]
    async fn test_pre_provisioned_membership_keeps_its_template() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        let permissions = MemberPermissions {
            can_create_tickets: true,
            ..MemberPermissions::default()
        };
        let member = CompanyMember {
            role_name: "manager".to_string(),
            permissions: Some(permissions),
            is_primary_admin: false,
            ..pre_provisioned_member(seeded.company_id, seeded.user_id, seeded.inviter_id)
        };
        let member_id = member.id;
        store
            .seed(|data| {
                data.members.insert(member_id, member);
            })
            .await;

        let result = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();

        assert_eq!(result.member.id, member_id);
        assert_eq!(result.member.role_name, "manager");
        assert_eq!(result.member.permissions, Some(permissions));
        assert!(!result.member.is_primary_admin);
        assert!(result.member.is_active);

        let stored = &store.snapshot().await.members[&member_id];
        assert_eq!(stored.role_name, "manager");
        assert_eq!(stored.permissions, Some(permissions));
        assert!(!stored.is_primary_admin);
    }

    #[tokio::test]
    async fn test_active_company_is_left_untouched() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        store
            .seed(|data| {
                let company = data
                    .companies
                    .get_mut(&seeded.company_id)
                    .expect("seeded company");
                company.is_active = true;
            })
            .await;
        let before = store.snapshot().await.companies[&seeded.company_id].clone();
        // Any company write would fail the whole acceptance.
        store.fail_on(FailPoint::CompanyUpdate);

        let result = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();

        assert_eq!(result.company, before);
        let data = store.snapshot().await;
        assert_eq!(data.companies[&seeded.company_id], before);
        assert_eq!(
            data.invitations[&seeded.invitation_id].status,
            InvitationStatus::Accepted
        );
    }

    #[tokio::test]
    async fn test_missing_company_is_not_found() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        store
            .seed(|data| {
                data.companies.remove(&seeded.company_id);
            })
            .await;
        let before = store.snapshot().await;

        let err = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            InvitationError::NotFound("Management company not found".to_string())
        );
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_existing_baseline_role_is_reused() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        let first = seed_with_expiry(&store, "second-token", Utc::now() + Duration::days(3)).await;
        store
            .seed(|data| {
                let invitation = data
                    .invitations
                    .get_mut(&first.invitation_id)
                    .expect("seeded invitation");
                invitation.user_id = seeded.user_id;
            })
            .await;
        let svc = service(&store);

        let a = svc
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();
        let b = svc
            .execute(AcceptInvitationInput::new("second-token", SUBJECT))
            .await
            .unwrap();

        assert_eq!(a.baseline_role.id, b.baseline_role.id);
        let data = store.snapshot().await;
        let roles = data.roles_for_user(seeded.user_id);
        assert_eq!(roles.iter().filter(|r| r.scope.is_global()).count(), 1);
        assert_eq!(roles.len(), 3);
    }

    #[tokio::test]
    async fn test_input_validation() {
        let store = InMemoryInvitationStore::new();
        seed_pending(&store).await;
        let svc = service(&store);

        let err = svc
            .execute(AcceptInvitationInput::new("", SUBJECT))
            .await
            .unwrap_err();
        assert_eq!(err, InvitationError::invalid_token());

        let err = svc
            .execute(AcceptInvitationInput::new(TOKEN, ""))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        store
            .seed(|data| {
                data.users.remove(&seeded.user_id);
            })
            .await;

        let err = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap_err();

        assert_eq!(err, InvitationError::NotFound("User not found".to_string()));
    }

    #[tokio::test]
    async fn test_missing_system_role_rolls_back() {
        let store = InMemoryInvitationStore::new();
        let seeded = seed_pending(&store).await;
        store
            .seed(|data| data.roles.retain(|_, r| r.name != ADMIN_ROLE_NAME))
            .await;
        let before = store.snapshot().await;

        let err = service(&store)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            InvitationError::Internal("ADMIN role not found in system".to_string())
        );
        let after = store.snapshot().await;
        assert_eq!(after, before);
        assert!(after.users[&seeded.user_id].has_placeholder_subject());
    }

    #[tokio::test]
    async fn test_custom_policy_member_role() {
        let store = InMemoryInvitationStore::new();
        seed_pending(&store).await;
        let policy = ActivationPolicy {
            member_role_name: "owner".to_string(),
            ..ActivationPolicy::default()
        };

        let result = AcceptInvitationService::with_policy(store.clone(), policy)
            .execute(AcceptInvitationInput::new(TOKEN, SUBJECT))
            .await
            .unwrap();

        assert_eq!(result.member.role_name, "owner");
    }
}
