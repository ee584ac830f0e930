//! Repository ports consumed by the invitation services.
//!
//! Ports are only reachable through a [`UnitOfWork`], which binds every
//! repository to one transaction. Dropping a unit of work without calling
//! [`UnitOfWork::commit`] discards all of its writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    AdminInvitation, CompanyMember, CompanyUpdate, ManagementCompany, MemberUpdate,
    NewCompanyMember, NewUserRole, Role, User, UserRole, UserUpdate,
};

/// Errors raised by repository implementations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => RepositoryError::UniqueViolation(db_err.message().to_string()),
                _ => RepositoryError::Storage(format!("Database error: {}", db_err)),
            },
            sqlx::Error::ColumnDecode { index, source } => {
                RepositoryError::Corrupt(format!("Column {}: {}", index, source))
            }
            _ => RepositoryError::Storage(format!("Database error: {}", err)),
        }
    }
}

/// Invitation persistence operations.
#[async_trait]
pub trait InvitationRepository: Send {
    /// Looks up an invitation by the SHA-256 hex digest of its token.
    async fn get_by_token_hash(
        &mut self,
        token_hash: &str,
    ) -> Result<Option<AdminInvitation>, RepositoryError>;

    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<AdminInvitation>, RepositoryError>;

    /// Flips a pending invitation to accepted.
    ///
    /// Returns `None` when the invitation is no longer pending, which makes
    /// this write the commit gate against concurrent acceptance.
    async fn mark_as_accepted(
        &mut self,
        id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> Result<Option<AdminInvitation>, RepositoryError>;

    /// Flips a pending invitation to cancelled. `None` when it is not pending.
    async fn mark_as_cancelled(
        &mut self,
        id: Uuid,
    ) -> Result<Option<AdminInvitation>, RepositoryError>;
}

/// User persistence operations.
#[async_trait]
pub trait UserRepository: Send {
    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    async fn get_by_external_subject_id(
        &mut self,
        subject_id: &str,
    ) -> Result<Option<User>, RepositoryError>;

    async fn update(&mut self, id: Uuid, update: &UserUpdate)
        -> Result<Option<User>, RepositoryError>;
}

/// Management company persistence operations.
#[async_trait]
pub trait CompanyRepository: Send {
    async fn get_by_id(&mut self, id: Uuid) -> Result<Option<ManagementCompany>, RepositoryError>;

    async fn update(
        &mut self,
        id: Uuid,
        update: &CompanyUpdate,
    ) -> Result<Option<ManagementCompany>, RepositoryError>;
}

/// Company membership persistence operations.
#[async_trait]
pub trait MembershipRepository: Send {
    async fn get_by_company_and_user(
        &mut self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CompanyMember>, RepositoryError>;

    async fn create(&mut self, member: &NewCompanyMember)
        -> Result<CompanyMember, RepositoryError>;

    async fn update(
        &mut self,
        id: Uuid,
        update: &MemberUpdate,
    ) -> Result<Option<CompanyMember>, RepositoryError>;
}

/// Role and role assignment persistence operations.
#[async_trait]
pub trait RoleRepository: Send {
    async fn get_by_name(&mut self, name: &str) -> Result<Option<Role>, RepositoryError>;

    /// Finds an assignment of `role_id` to `user_id` that has no scope.
    async fn find_global_assignment(
        &mut self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<UserRole>, RepositoryError>;

    /// Lists the assignments `user_id` holds within one management company.
    async fn get_by_user_and_company(
        &mut self,
        user_id: Uuid,
        management_company_id: Uuid,
    ) -> Result<Vec<UserRole>, RepositoryError>;

    async fn create(&mut self, assignment: &NewUserRole) -> Result<UserRole, RepositoryError>;

    async fn create_company_scoped_role(
        &mut self,
        user_id: Uuid,
        role_id: Uuid,
        management_company_id: Uuid,
        assigned_by: Option<Uuid>,
    ) -> Result<UserRole, RepositoryError> {
        let assignment =
            NewUserRole::management_company(user_id, role_id, management_company_id, assigned_by);
        self.create(&assignment).await
    }
}

/// All repository ports bound to a single transaction.
#[async_trait]
pub trait UnitOfWork: Send {
    fn invitations(&mut self) -> &mut dyn InvitationRepository;
    fn users(&mut self) -> &mut dyn UserRepository;
    fn companies(&mut self) -> &mut dyn CompanyRepository;
    fn memberships(&mut self) -> &mut dyn MembershipRepository;
    fn roles(&mut self) -> &mut dyn RoleRepository;

    /// Publishes every write made through this unit of work.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Source of transaction-bound repository ports.
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Opens a transaction and returns the ports bound to it.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, RepositoryError>;
}
