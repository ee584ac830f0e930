//! Repository for user database operations.

use domain::models::UserUpdate;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::entities::UserEntity;

/// Finds a user by ID.
pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserEntity>(
        r#"
        SELECT id, external_subject_id, email, display_name, first_name, last_name,
               is_active, is_email_verified, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Finds the user bound to an identity-provider subject.
pub async fn find_by_external_subject_id<'e, E>(
    executor: E,
    subject_id: &str,
) -> Result<Option<UserEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserEntity>(
        r#"
        SELECT id, external_subject_id, email, display_name, first_name, last_name,
               is_active, is_email_verified, created_at, updated_at
        FROM users
        WHERE external_subject_id = $1
        "#,
    )
    .bind(subject_id)
    .fetch_optional(executor)
    .await
}

/// Applies a partial update. Fields left as `None` keep their stored value.
pub async fn update<'e, E>(
    executor: E,
    id: Uuid,
    update: &UserUpdate,
) -> Result<Option<UserEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserEntity>(
        r#"
        UPDATE users
        SET external_subject_id = COALESCE($2, external_subject_id),
            is_active = COALESCE($3, is_active),
            is_email_verified = COALESCE($4, is_email_verified),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, external_subject_id, email, display_name, first_name, last_name,
                  is_active, is_email_verified, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(update.external_subject_id.as_deref())
    .bind(update.is_active)
    .bind(update.is_email_verified)
    .fetch_optional(executor)
    .await
}
