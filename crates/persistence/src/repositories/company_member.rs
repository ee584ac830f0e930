//! Repository for management company membership database operations.

use domain::models::{MemberUpdate, NewCompanyMember};
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::entities::CompanyMemberEntity;

pub async fn find_by_company_and_user<'e, E>(
    executor: E,
    company_id: Uuid,
    user_id: Uuid,
) -> Result<Option<CompanyMemberEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, CompanyMemberEntity>(
        r#"
        SELECT id, management_company_id, user_id, role_name, permissions, is_primary_admin,
               joined_at, invited_at, invited_by, is_active, created_at, updated_at
        FROM management_company_members
        WHERE management_company_id = $1 AND user_id = $2
        "#,
    )
    .bind(company_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e, E>(
    executor: E,
    member: &NewCompanyMember,
) -> Result<CompanyMemberEntity, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, CompanyMemberEntity>(
        r#"
        INSERT INTO management_company_members
            (management_company_id, user_id, role_name, permissions, is_primary_admin,
             joined_at, invited_at, invited_by, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, management_company_id, user_id, role_name, permissions, is_primary_admin,
                  joined_at, invited_at, invited_by, is_active, created_at, updated_at
        "#,
    )
    .bind(member.management_company_id)
    .bind(member.user_id)
    .bind(&member.role_name)
    .bind(Json(member.permissions))
    .bind(member.is_primary_admin)
    .bind(member.joined_at)
    .bind(member.invited_at)
    .bind(member.invited_by)
    .bind(member.is_active)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E>(
    executor: E,
    id: Uuid,
    update: &MemberUpdate,
) -> Result<Option<CompanyMemberEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, CompanyMemberEntity>(
        r#"
        UPDATE management_company_members
        SET is_active = COALESCE($2, is_active),
            joined_at = COALESCE($3, joined_at),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, management_company_id, user_id, role_name, permissions, is_primary_admin,
                  joined_at, invited_at, invited_by, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(update.is_active)
    .bind(update.joined_at)
    .fetch_optional(executor)
    .await
}
