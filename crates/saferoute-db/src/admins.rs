//! Database operations for `admins` and `admin_sessions`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `admins` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `admin_sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub admin_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Creates an administrator with an already-hashed password.
///
/// # Errors
///
/// Returns [`DbError::Conflict`] if the username is taken, or
/// [`DbError::Sqlx`] for other failures.
pub async fn create_admin(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<AdminRow, DbError> {
    sqlx::query_as::<_, AdminRow>(
        "INSERT INTO admins (username, password_hash) \
         VALUES ($1, $2) \
         RETURNING id, username, password_hash, created_at",
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(DbError::from_write)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_admin_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<AdminRow>, DbError> {
    let row = sqlx::query_as::<_, AdminRow>(
        "SELECT id, username, password_hash, created_at \
         FROM admins \
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Stores a session keyed by the digest of its bearer token.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_session(
    pool: &PgPool,
    admin_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<SessionRow, DbError> {
    sqlx::query_as::<_, SessionRow>(
        "INSERT INTO admin_sessions (admin_id, token_hash, expires_at) \
         VALUES ($1, $2, $3) \
         RETURNING id, admin_id, expires_at",
    )
    .bind(admin_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .map_err(DbError::from_write)
}

/// Looks up an unexpired session by token digest.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_active_session(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<SessionRow>, DbError> {
    let row = sqlx::query_as::<_, SessionRow>(
        "SELECT id, admin_id, expires_at \
         FROM admin_sessions \
         WHERE token_hash = $1 AND expires_at > NOW()",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Removes expired sessions and returns how many were deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_expired_sessions(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
