//! Common test utilities for integration tests.
//!
//! Tests run against the PostgreSQL database named by `TEST_DATABASE_URL`
//! and return early when it is not set.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

/// Connects to the test database and applies migrations, or `None` when unconfigured.
pub async fn test_pool() -> Option<PgPool> {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    persistence::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Ids of one seeded invitation and the records it references.
#[derive(Debug, Clone)]
pub struct SeededInvitation {
    pub token: String,
    pub invitation_id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
}

/// Inserts a pending user, an inactive company and an invitation linking them.
pub async fn seed_invitation(pool: &PgPool, expires_at: DateTime<Utc>) -> SeededInvitation {
    let token = format!("it-token-{}", Uuid::new_v4());
    let email: String = SafeEmail().fake();
    let company_name: String = CompanyName().fake();

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (external_subject_id, email, first_name, last_name)
        VALUES ($1, $2, 'Test', 'Admin')
        RETURNING id
        "#,
    )
    .bind(format!("pending_{}", Uuid::new_v4()))
    .bind(&email)
    .fetch_one(pool)
    .await
    .expect("Failed to insert user");

    let company_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO management_companies (name, email)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(&company_name)
    .bind(&email)
    .fetch_one(pool)
    .await
    .expect("Failed to insert management company");

    let invitation_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO admin_invitations
            (user_id, management_company_id, token_hash, email, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW() - INTERVAL '1 day')
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(company_id)
    .bind(shared::crypto::sha256_hex(&token))
    .bind(&email)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .expect("Failed to insert invitation");

    SeededInvitation {
        token,
        invitation_id,
        user_id,
        company_id,
    }
}

pub async fn seed_pending_invitation(pool: &PgPool) -> SeededInvitation {
    seed_invitation(pool, Utc::now() + Duration::days(7)).await
}

pub async fn invitation_status(pool: &PgPool, id: Uuid) -> String {
    sqlx::query_scalar("SELECT status::text FROM admin_invitations WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to read invitation status")
}

pub async fn count_members(pool: &PgPool, company_id: Uuid, user_id: Uuid) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM management_company_members WHERE management_company_id = $1 AND user_id = $2",
    )
    .bind(company_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .expect("Failed to count members")
}

pub async fn count_user_roles(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count user roles")
}
