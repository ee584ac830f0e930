//! PostgreSQL implementation of the invitation repository ports.
//!
//! Every port call of a [`PgUnitOfWork`] runs on the same transaction.
//! Dropping the unit of work without committing rolls the transaction back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{
    AdminInvitation, CompanyMember, CompanyUpdate, ManagementCompany, MemberUpdate,
    NewCompanyMember, NewUserRole, Role, User, UserRole, UserUpdate,
};
use domain::ports::{
    CompanyRepository, InvitationRepository, InvitationStore, MembershipRepository,
    RepositoryError, RoleRepository, UnitOfWork, UserRepository,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::metrics::QueryTimer;
use crate::repositories::{admin_invitation, company_member, management_company, role, user};

/// Opens transaction-bound units of work on a connection pool.
#[derive(Clone)]
pub struct PgInvitationStore {
    pool: PgPool,
}

impl PgInvitationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationStore for PgInvitationStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One open transaction exposing all invitation ports.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

/// Runs `$query` under a [`QueryTimer`] named `$name`.
macro_rules! timed {
    ($name:literal, $query:expr) => {{
        let timer = QueryTimer::new($name);
        let result = $query.await;
        timer.record();
        result?
    }};
}

#[async_trait]
impl InvitationRepository for PgUnitOfWork {
    async fn get_by_token_hash(
        &mut self,
        token_hash: &str,
    ) -> Result<Option<AdminInvitation>, RepositoryError> {
        let entity = timed!(
            "find_admin_invitation_by_token_hash",
            admin_invitation::find_by_token_hash(&mut *self.tx, token_hash)
        );
        entity.map(AdminInvitation::try_from).transpose()
    }

    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<AdminInvitation>, RepositoryError> {
        let entity = timed!(
            "find_admin_invitation_by_id",
            admin_invitation::find_by_id(&mut *self.tx, id)
        );
        entity.map(AdminInvitation::try_from).transpose()
    }

    async fn mark_as_accepted(
        &mut self,
        id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> Result<Option<AdminInvitation>, RepositoryError> {
        let entity = timed!(
            "mark_admin_invitation_accepted",
            admin_invitation::mark_as_accepted(&mut *self.tx, id, accepted_at)
        );
        entity.map(AdminInvitation::try_from).transpose()
    }

    async fn mark_as_cancelled(
        &mut self,
        id: Uuid,
    ) -> Result<Option<AdminInvitation>, RepositoryError> {
        let entity = timed!(
            "mark_admin_invitation_cancelled",
            admin_invitation::mark_as_cancelled(&mut *self.tx, id)
        );
        entity.map(AdminInvitation::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for PgUnitOfWork {
    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let entity = timed!("find_user_by_id", user::find_by_id(&mut *self.tx, id));
        Ok(entity.map(Into::into))
    }

    async fn get_by_external_subject_id(
        &mut self,
        subject_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let entity = timed!(
            "find_user_by_external_subject_id",
            user::find_by_external_subject_id(&mut *self.tx, subject_id)
        );
        Ok(entity.map(Into::into))
    }

    async fn update(
        &mut self,
        id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let entity = timed!("update_user", user::update(&mut *self.tx, id, update));
        Ok(entity.map(Into::into))
    }
}

#[async_trait]
impl CompanyRepository for PgUnitOfWork {
    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<ManagementCompany>, RepositoryError> {
        let entity = timed!(
            "find_management_company_by_id",
            management_company::find_by_id(&mut *self.tx, id)
        );
        Ok(entity.map(Into::into))
    }

    async fn update(
        &mut self,
        id: Uuid,
        update: &CompanyUpdate,
    ) -> Result<Option<ManagementCompany>, RepositoryError> {
        let entity = timed!(
            "update_management_company",
            management_company::update(&mut *self.tx, id, update)
        );
        Ok(entity.map(Into::into))
    }
}

#[async_trait]
impl MembershipRepository for PgUnitOfWork {
    async fn get_by_company_and_user(
        &mut self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CompanyMember>, RepositoryError> {
        let entity = timed!(
            "find_company_member",
            company_member::find_by_company_and_user(&mut *self.tx, company_id, user_id)
        );
        Ok(entity.map(Into::into))
    }

    async fn create(
        &mut self,
        member: &NewCompanyMember,
    ) -> Result<CompanyMember, RepositoryError> {
        let entity = timed!(
            "create_company_member",
            company_member::create(&mut *self.tx, member)
        );
        Ok(entity.into())
    }

    async fn update(
        &mut self,
        id: Uuid,
        update: &MemberUpdate,
    ) -> Result<Option<CompanyMember>, RepositoryError> {
        let entity = timed!(
            "update_company_member",
            company_member::update(&mut *self.tx, id, update)
        );
        Ok(entity.map(Into::into))
    }
}

#[async_trait]
impl RoleRepository for PgUnitOfWork {
    async fn get_by_name(&mut self, name: &str) -> Result<Option<Role>, RepositoryError> {
        let entity = timed!("find_role_by_name", role::find_by_name(&mut *self.tx, name));
        Ok(entity.map(Into::into))
    }

    async fn find_global_assignment(
        &mut self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<UserRole>, RepositoryError> {
        let entity = timed!(
            "find_global_user_role",
            role::find_global_assignment(&mut *self.tx, user_id, role_id)
        );
        entity.map(UserRole::try_from).transpose()
    }

    async fn get_by_user_and_company(
        &mut self,
        user_id: Uuid,
        management_company_id: Uuid,
    ) -> Result<Vec<UserRole>, RepositoryError> {
        let entities = timed!(
            "find_user_roles_by_company",
            role::find_by_user_and_company(&mut *self.tx, user_id, management_company_id)
        );
        entities.into_iter().map(UserRole::try_from).collect()
    }

    async fn create(&mut self, assignment: &NewUserRole) -> Result<UserRole, RepositoryError> {
        let entity = timed!(
            "create_user_role",
            role::create_assignment(&mut *self.tx, assignment)
        );
        UserRole::try_from(entity)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
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
        let timer = QueryTimer::new("commit_invitation_transaction");
        let result = self.tx.commit().await;
        timer.record();
        Ok(result?)
    }
}
