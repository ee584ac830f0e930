//! Repository for admin invitation database operations.
//!
//! Query functions are generic over the executor so they run on the pool or
//! inside a transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::entities::AdminInvitationEntity;
use crate::metrics::QueryTimer;

/// Finds an invitation by the SHA-256 hex digest of its token.
pub async fn find_by_token_hash<'e, E>(
    executor: E,
    token_hash: &str,
) -> Result<Option<AdminInvitationEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AdminInvitationEntity>(
        r#"
        SELECT id, user_id, management_company_id, token_hash, email, status,
               expires_at, accepted_at, created_by, created_at, updated_at
        FROM admin_invitations
        WHERE token_hash = $1
        "#,
    )
    .bind(token_hash)
    .fetch_optional(executor)
    .await
}

/// Finds an invitation by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    id: Uuid,
) -> Result<Option<AdminInvitationEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AdminInvitationEntity>(
        r#"
        SELECT id, user_id, management_company_id, token_hash, email, status,
               expires_at, accepted_at, created_by, created_at, updated_at
        FROM admin_invitations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Marks a pending invitation as accepted.
///
/// Returns `None` when the invitation is no longer pending.
pub async fn mark_as_accepted<'e, E>(
    executor: E,
    id: Uuid,
    accepted_at: DateTime<Utc>,
) -> Result<Option<AdminInvitationEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AdminInvitationEntity>(
        r#"
        UPDATE admin_invitations
        SET status = 'accepted', accepted_at = $2, updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING id, user_id, management_company_id, token_hash, email, status,
                  expires_at, accepted_at, created_by, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(accepted_at)
    .fetch_optional(executor)
    .await
}

/// Marks a pending invitation as cancelled.
///
/// Returns `None` when the invitation is no longer pending.
pub async fn mark_as_cancelled<'e, E>(
    executor: E,
    id: Uuid,
) -> Result<Option<AdminInvitationEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AdminInvitationEntity>(
        r#"
        UPDATE admin_invitations
        SET status = 'cancelled', updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING id, user_id, management_company_id, token_hash, email, status,
                  expires_at, accepted_at, created_by, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Flips every pending invitation past its expiry to expired.
pub async fn expire_overdue<'e, E>(executor: E, now: DateTime<Utc>) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE admin_invitations
        SET status = 'expired', updated_at = NOW()
        WHERE status = 'pending' AND expires_at < $1
        "#,
    )
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Pool-level admin invitation operations used outside acceptance.
#[derive(Clone)]
pub struct AdminInvitationRepository {
    pool: PgPool,
}

impl AdminInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminInvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_admin_invitation_by_id");
        let result = find_by_id(&self.pool, id).await;
        timer.record();
        result
    }

    /// Expires overdue pending invitations; returns how many were flipped.
    pub async fn expire_overdue(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("expire_overdue_admin_invitations");
        let result = expire_overdue(&self.pool, Utc::now()).await;
        timer.record();
        result
    }
}
