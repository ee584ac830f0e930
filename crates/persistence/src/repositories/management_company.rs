//! Repository for management company database operations.

use domain::models::CompanyUpdate;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::entities::ManagementCompanyEntity;

pub async fn find_by_id<'e, E>(
    executor: E,
    id: Uuid,
) -> Result<Option<ManagementCompanyEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ManagementCompanyEntity>(
        r#"
        SELECT id, name, legal_name, email, is_active, created_by, created_at, updated_at
        FROM management_companies
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    id: Uuid,
    update: &CompanyUpdate,
) -> Result<Option<ManagementCompanyEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ManagementCompanyEntity>(
        r#"
        UPDATE management_companies
        SET is_active = COALESCE($2, is_active), updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, legal_name, email, is_active, created_by, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(update.is_active)
    .fetch_optional(executor)
    .await
}
