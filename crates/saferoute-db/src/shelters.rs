//! Database operations for the `shelters` table.
//!
//! Shelters are submitted unapproved; an administrator either approves them
//! (making them visible to the public listing) or deletes them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const SHELTER_COLUMNS: &str =
    "id, public_id, name, latitude, longitude, description, approved, created_at";

/// A row from the `shelters` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShelterRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields of a new submission. Validation happens before this point.
#[derive(Debug, Clone, Copy)]
pub struct NewShelter<'a> {
    pub name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<&'a str>,
}

/// Inserts an unapproved shelter and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Conflict`] when the name or the exact coordinates are
/// already taken (`shelters_name_key` / `shelters_location_key`), or
/// [`DbError::Sqlx`] for other failures.
pub async fn insert_pending_shelter(
    pool: &PgPool,
    shelter: NewShelter<'_>,
) -> Result<ShelterRow, DbError> {
    sqlx::query_as::<_, ShelterRow>(&format!(
        "INSERT INTO shelters (name, latitude, longitude, description) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {SHELTER_COLUMNS}"
    ))
    .bind(shelter.name)
    .bind(shelter.latitude)
    .bind(shelter.longitude)
    .bind(shelter.description)
    .fetch_one(pool)
    .await
    .map_err(DbError::from_write)
}

/// Returns every approved shelter, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_approved_shelters(pool: &PgPool) -> Result<Vec<ShelterRow>, DbError> {
    let rows = sqlx::query_as::<_, ShelterRow>(&format!(
        "SELECT {SHELTER_COLUMNS} FROM shelters \
         WHERE approved = true \
         ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns every shelter awaiting moderation, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_pending_shelters(pool: &PgPool) -> Result<Vec<ShelterRow>, DbError> {
    let rows = sqlx::query_as::<_, ShelterRow>(&format!(
        "SELECT {SHELTER_COLUMNS} FROM shelters \
         WHERE approved = false \
         ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns an approved shelter by public id, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_approved_shelter(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<ShelterRow>, DbError> {
    let row = sqlx::query_as::<_, ShelterRow>(&format!(
        "SELECT {SHELTER_COLUMNS} FROM shelters \
         WHERE public_id = $1 AND approved = true"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Marks a shelter approved and returns the updated row.
///
/// Approving an already-approved shelter is a no-op that still succeeds.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no shelter has `public_id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn approve_shelter(pool: &PgPool, public_id: Uuid) -> Result<ShelterRow, DbError> {
    sqlx::query_as::<_, ShelterRow>(&format!(
        "UPDATE shelters SET approved = true \
         WHERE public_id = $1 \
         RETURNING {SHELTER_COLUMNS}"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Deletes a shelter (rejecting a submission or removing an approved one).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no shelter has `public_id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn delete_shelter(pool: &PgPool, public_id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM shelters WHERE public_id = $1")
        .bind(public_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
