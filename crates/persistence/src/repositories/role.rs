//! Repository for roles and role assignments.

use domain::models::NewUserRole;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::entities::{RoleEntity, UserRoleEntity};

pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<RoleEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, RoleEntity>(
        r#"
        SELECT id, name, description, is_system_role
        FROM roles
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(executor)
    .await
}

/// Finds an unscoped assignment of a role to a user.
pub async fn find_global_assignment<'e, E>(
    executor: E,
    user_id: Uuid,
    role_id: Uuid,
) -> Result<Option<UserRoleEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserRoleEntity>(
        r#"
        SELECT id, user_id, role_id, management_company_id, condominium_id, building_id,
               is_active, assigned_by, assigned_at
        FROM user_roles
        WHERE user_id = $1 AND role_id = $2
          AND management_company_id IS NULL
          AND condominium_id IS NULL
          AND building_id IS NULL
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .fetch_optional(executor)
    .await
}

/// Lists the assignments a user holds within a management company.
pub async fn find_by_user_and_company<'e, E>(
    executor: E,
    user_id: Uuid,
    company_id: Uuid,
) -> Result<Vec<UserRoleEntity>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserRoleEntity>(
        r#"
        SELECT id, user_id, role_id, management_company_id, condominium_id, building_id,
               is_active, assigned_by, assigned_at
        FROM user_roles
        WHERE user_id = $1 AND management_company_id = $2
        ORDER BY assigned_at
        "#,
    )
    .bind(user_id)
    .bind(company_id)
    .fetch_all(executor)
    .await
}

pub async fn create_assignment<'e, E>(
    executor: E,
    assignment: &NewUserRole,
) -> Result<UserRoleEntity, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let (management_company_id, condominium_id, building_id) = assignment.scope.to_columns();
    sqlx::query_as::<_, UserRoleEntity>(
        r#"
        INSERT INTO user_roles
            (user_id, role_id, management_company_id, condominium_id, building_id,
             is_active, assigned_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, role_id, management_company_id, condominium_id, building_id,
                  is_active, assigned_by, assigned_at
        "#,
    )
    .bind(assignment.user_id)
    .bind(assignment.role_id)
    .bind(management_company_id)
    .bind(condominium_id)
    .bind(building_id)
    .bind(assignment.is_active)
    .bind(assignment.assigned_by)
    .fetch_one(executor)
    .await
}
