//! In-memory invitation store for development and testing.
//!
//! Units of work are serialized behind an owned lock. Each one writes to a
//! private copy of the data that replaces the shared copy only on commit, so
//! a dropped unit of work leaves no trace. Failures can be injected at named
//! points to exercise rollback paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::{
    AdminInvitation, CompanyMember, CompanyUpdate, InvitationStatus, ManagementCompany,
    MemberUpdate, NewCompanyMember, NewUserRole, Role, User, UserRole, UserUpdate,
};
use crate::ports::{
    CompanyRepository, InvitationRepository, InvitationStore, MembershipRepository,
    RepositoryError, RoleRepository, UnitOfWork, UserRepository,
};

/// Tables held by the in-memory store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryData {
    pub invitations: HashMap<Uuid, AdminInvitation>,
    pub users: HashMap<Uuid, User>,
    pub companies: HashMap<Uuid, ManagementCompany>,
    pub members: HashMap<Uuid, CompanyMember>,
    pub roles: HashMap<Uuid, Role>,
    pub user_roles: HashMap<Uuid, UserRole>,
}

impl InMemoryData {
    /// Memberships of `user_id` in `company_id`.
    pub fn members_for(&self, company_id: Uuid, user_id: Uuid) -> Vec<&CompanyMember> {
        self.members
            .values()
            .filter(|m| m.management_company_id == company_id && m.user_id == user_id)
            .collect()
    }

    /// All role assignments held by `user_id`.
    pub fn roles_for_user(&self, user_id: Uuid) -> Vec<&UserRole> {
        self.user_roles
            .values()
            .filter(|r| r.user_id == user_id)
            .collect()
    }
}

/// Named write points where an injected failure can be raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    UserUpdate,
    CompanyUpdate,
    MemberWrite,
    RoleAssignment,
    MarkAccepted,
    Commit,
}

/// Shared in-memory store; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInvitationStore {
    data: Arc<Mutex<InMemoryData>>,
    fail_point: Arc<StdMutex<Option<FailPoint>>>,
}

impl InMemoryInvitationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutates the committed data directly, outside any unit of work.
    pub async fn seed<F>(&self, f: F)
    where
        F: FnOnce(&mut InMemoryData),
    {
        let mut data = self.data.lock().await;
        f(&mut data);
    }

    /// Copy of the committed data.
    pub async fn snapshot(&self) -> InMemoryData {
        self.data.lock().await.clone()
    }

    /// Makes every unit of work opened from now on fail at `point`.
    pub fn fail_on(&self, point: FailPoint) {
        *self.fail_point.lock().unwrap_or_else(|e| e.into_inner()) = Some(point);
    }

    pub fn clear_failure(&self) {
        *self.fail_point.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[async_trait]
impl InvitationStore for InMemoryInvitationStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let guard = Arc::clone(&self.data).lock_owned().await;
        let working = guard.clone();
        let fail_point = *self.fail_point.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            working,
            fail_point,
        }))
    }
}

struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<InMemoryData>,
    working: InMemoryData,
    fail_point: Option<FailPoint>,
}

impl InMemoryUnitOfWork {
    fn check(&self, point: FailPoint) -> Result<(), RepositoryError> {
        if self.fail_point == Some(point) {
            return Err(RepositoryError::Storage(format!(
                "Injected failure at {:?}",
                point
            )));
        }
        Ok(())
    }

    fn transition(
        &mut self,
        id: Uuid,
        to: InvitationStatus,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Option<AdminInvitation> {
        let invitation = self.working.invitations.get_mut(&id)?;
        if invitation.status != InvitationStatus::Pending {
            return None;
        }
        invitation.status = to;
        invitation.accepted_at = accepted_at;
        invitation.updated_at = Utc::now();
        Some(invitation.clone())
    }
}

#[async_trait]
impl InvitationRepository for InMemoryUnitOfWork {
    async fn get_by_token_hash(
        &mut self,
        token_hash: &str,
    ) -> Result<Option<AdminInvitation>, RepositoryError> {
        Ok(self
            .working
            .invitations
            .values()
            .find(|i| i.token_hash == token_hash)
            .cloned())
    }

    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<AdminInvitation>, RepositoryError> {
        Ok(self.working.invitations.get(&id).cloned())
    }

    async fn mark_as_accepted(
        &mut self,
        id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> Result<Option<AdminInvitation>, RepositoryError> {
        self.check(FailPoint::MarkAccepted)?;
        Ok(self.transition(id, InvitationStatus::Accepted, Some(accepted_at)))
    }

    async fn mark_as_cancelled(
        &mut self,
        id: Uuid,
    ) -> Result<Option<AdminInvitation>, RepositoryError> {
        Ok(self.transition(id, InvitationStatus::Cancelled, None))
    }
}

#[async_trait]
impl UserRepository for InMemoryUnitOfWork {
    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn get_by_external_subject_id(
        &mut self,
        subject_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.external_subject_id == subject_id)
            .cloned())
    }

    async fn update(
        &mut self,
        id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        self.check(FailPoint::UserUpdate)?;
        if let Some(subject) = &update.external_subject_id {
            let taken = self
                .working
                .users
                .values()
                .any(|u| u.id != id && &u.external_subject_id == subject);
            if taken {
                return Err(RepositoryError::UniqueViolation(
                    "users_external_subject_id_key".to_string(),
                ));
            }
        }
        Ok(self.working.users.get_mut(&id).map(|user| {
            update.apply_to(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl CompanyRepository for InMemoryUnitOfWork {
    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<ManagementCompany>, RepositoryError> {
        Ok(self.working.companies.get(&id).cloned())
    }

    async fn update(
        &mut self,
        id: Uuid,
        update: &CompanyUpdate,
    ) -> Result<Option<ManagementCompany>, RepositoryError> {
        self.check(FailPoint::CompanyUpdate)?;
        Ok(self.working.companies.get_mut(&id).map(|company| {
            update.apply_to(company);
            company.updated_at = Utc::now();
            company.clone()
        }))
    }
}

#[async_trait]
impl MembershipRepository for InMemoryUnitOfWork {
    async fn get_by_company_and_user(
        &mut self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CompanyMember>, RepositoryError> {
        Ok(self
            .working
            .members_for(company_id, user_id)
            .first()
            .map(|m| (*m).clone()))
    }

    async fn create(
        &mut self,
        member: &NewCompanyMember,
    ) -> Result<CompanyMember, RepositoryError> {
        self.check(FailPoint::MemberWrite)?;
        if !self
            .working
            .members_for(member.management_company_id, member.user_id)
            .is_empty()
        {
            return Err(RepositoryError::UniqueViolation(
                "management_company_members_company_user_key".to_string(),
            ));
        }
        let now = Utc::now();
        let created = CompanyMember {
            id: Uuid::new_v4(),
            management_company_id: member.management_company_id,
            user_id: member.user_id,
            role_name: member.role_name.clone(),
            permissions: Some(member.permissions),
            is_primary_admin: member.is_primary_admin,
            joined_at: member.joined_at,
            invited_at: member.invited_at,
            invited_by: member.invited_by,
            is_active: member.is_active,
            created_at: now,
            updated_at: now,
        };
        self.working.members.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &mut self,
        id: Uuid,
        update: &MemberUpdate,
    ) -> Result<Option<CompanyMember>, RepositoryError> {
        self.check(FailPoint::MemberWrite)?;
        Ok(self.working.members.get_mut(&id).map(|member| {
            update.apply_to(member);
            member.updated_at = Utc::now();
            member.clone()
        }))
    }
}

#[async_trait]
impl RoleRepository for InMemoryUnitOfWork {
    async fn get_by_name(&mut self, name: &str) -> Result<Option<Role>, RepositoryError> {
        Ok(self
            .working
            .roles
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn find_global_assignment(
        &mut self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<UserRole>, RepositoryError> {
        Ok(self
            .working
            .user_roles
            .values()
            .find(|r| r.user_id == user_id && r.role_id == role_id && r.scope.is_global())
            .cloned())
    }

    async fn get_by_user_and_company(
        &mut self,
        user_id: Uuid,
        management_company_id: Uuid,
    ) -> Result<Vec<UserRole>, RepositoryError> {
        let mut roles: Vec<UserRole> = self
            .working
            .user_roles
            .values()
            .filter(|r| {
                r.user_id == user_id
                    && r.scope.management_company_id() == Some(management_company_id)
            })
            .cloned()
            .collect();
        roles.sort_by_key(|r| r.assigned_at);
        Ok(roles)
    }

    async fn create(&mut self, assignment: &NewUserRole) -> Result<UserRole, RepositoryError> {
        self.check(FailPoint::RoleAssignment)?;
        let created = UserRole {
            id: Uuid::new_v4(),
            user_id: assignment.user_id,
            role_id: assignment.role_id,
            scope: assignment.scope,
            is_active: assignment.is_active,
            assigned_by: assignment.assigned_by,
            assigned_at: Utc::now(),
        };
        self.working.user_roles.insert(created.id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn invitations(&mut self) -> &mut dyn InvitationRepository {
        self
    }

    fn users(&mut self) -> &mut dyn UserRepository {
        self
    }

    fn companies(&mut self) -> &mut dyn CompanyRepository {
        self
    }

    fn memberships(&mut self) -> &mut dyn MembershipRepository {
        self
    }

    fn roles(&mut self) -> &mut dyn RoleRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.check(FailPoint::Commit)?;
        let InMemoryUnitOfWork {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}
