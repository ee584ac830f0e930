//! Fixtures shared by the invitation service tests.

use chrono::{DateTime, Duration, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use shared::crypto::sha256_hex;
use uuid::Uuid;

use super::memory::InMemoryInvitationStore;
use crate::models::company_member::ADMIN_MEMBER_ROLE;
use crate::models::role::{ADMIN_ROLE_NAME, BASELINE_ROLE_NAME};
use crate::models::user::PENDING_SUBJECT_PREFIX;
use crate::models::{
    AdminInvitation, CompanyMember, InvitationStatus, ManagementCompany, Role, User,
};

pub const TOKEN: &str = "valid-token-123";
pub const SUBJECT: &str = "auth0|new-admin-1";

/// Ids of one seeded, pending invitation and the records it references.
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    pub invitation_id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub inviter_id: Uuid,
    pub baseline_role_id: Uuid,
    pub admin_role_id: Uuid,
}

pub fn pending_user(id: Uuid) -> User {
    let now = Utc::now();
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    User {
        id,
        external_subject_id: format!("{}{}", PENDING_SUBJECT_PREFIX, Uuid::new_v4()),
        email: SafeEmail().fake(),
        display_name: Some(format!("{} {}", first, last)),
        first_name: Some(first),
        last_name: Some(last),
        is_active: false,
        is_email_verified: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn active_user(subject: &str) -> User {
    let mut user = pending_user(Uuid::new_v4());
    user.external_subject_id = subject.to_string();
    user.is_active = true;
    user.is_email_verified = true;
    user
}

pub fn inactive_company(id: Uuid) -> ManagementCompany {
    let now = Utc::now();
    ManagementCompany {
        id,
        name: CompanyName().fake(),
        legal_name: None,
        email: Some(SafeEmail().fake()),
        is_active: false,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn system_role(name: &str) -> Role {
    Role {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        is_system_role: true,
    }
}

pub fn invitation(
    user_id: Uuid,
    company_id: Uuid,
    created_by: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> AdminInvitation {
    let now = Utc::now();
    AdminInvitation {
        id: Uuid::new_v4(),
        user_id,
        management_company_id: company_id,
        token_hash: sha256_hex(token),
        email: SafeEmail().fake(),
        status: InvitationStatus::Pending,
        expires_at,
        accepted_at: None,
        created_by: Some(created_by),
        created_at: now - Duration::hours(1),
        updated_at: now - Duration::hours(1),
    }
}

pub fn pre_provisioned_member(company_id: Uuid, user_id: Uuid, invited_by: Uuid) -> CompanyMember {
    let now = Utc::now();
    CompanyMember {
        id: Uuid::new_v4(),
        management_company_id: company_id,
        user_id,
        role_name: ADMIN_MEMBER_ROLE.to_string(),
        permissions: None,
        is_primary_admin: true,
        joined_at: None,
        invited_at: Some(now - Duration::hours(1)),
        invited_by: Some(invited_by),
        is_active: false,
        created_at: now,
        updated_at: now,
    }
}

/// Seeds the system roles and one pending invitation for `TOKEN`, valid for seven days.
pub async fn seed_pending(store: &InMemoryInvitationStore) -> Seeded {
    seed_with_expiry(store, TOKEN, Utc::now() + Duration::days(7)).await
}

pub async fn seed_with_expiry(
    store: &InMemoryInvitationStore,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Seeded {
    let user_id = Uuid::new_v4();
    let company_id = Uuid::new_v4();
    let inviter_id = Uuid::new_v4();
    let invitation = invitation(user_id, company_id, inviter_id, token, expires_at);
    let invitation_id = invitation.id;
    let baseline = system_role(BASELINE_ROLE_NAME);
    let admin = system_role(ADMIN_ROLE_NAME);
    let seeded = Seeded {
        invitation_id,
        user_id,
        company_id,
        inviter_id,
        baseline_role_id: baseline.id,
        admin_role_id: admin.id,
    };

    store
        .seed(move |data| {
            data.users.insert(user_id, pending_user(user_id));
            data.companies.insert(company_id, inactive_company(company_id));
            data.invitations.insert(invitation_id, invitation);
            if !data.roles.values().any(|r| r.name == BASELINE_ROLE_NAME) {
                data.roles.insert(baseline.id, baseline);
            }
            if !data.roles.values().any(|r| r.name == ADMIN_ROLE_NAME) {
                data.roles.insert(admin.id, admin);
            }
        })
        .await;

    let roles = store.snapshot().await.roles;
    let id_of = |name: &str| {
        roles
            .values()
            .find(|r| r.name == name)
            .map(|r| r.id)
            .expect("system role seeded")
    };
    Seeded {
        baseline_role_id: id_of(BASELINE_ROLE_NAME),
        admin_role_id: id_of(ADMIN_ROLE_NAME),
        ..seeded
    }
}
