//! Database operations for the `boards` table.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::DbError;

/// A row from the `boards` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BoardRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Insert a board and return the new row.
///
/// # Errors
///
/// Returns [`DbError::CheckViolation`] for a blank name, or [`DbError::Sqlx`]
/// if the insert fails.
pub async fn create_board(pool: &PgPool, name: &str) -> Result<BoardRow, DbError> {
    let row = sqlx::query_as::<_, BoardRow>(
        "INSERT INTO boards (name) VALUES ($1) \
         RETURNING id, name, created_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a board by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no board has this id, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_board(pool: &PgPool, id: i64) -> Result<BoardRow, DbError> {
    sqlx::query_as::<_, BoardRow>("SELECT id, name, created_at FROM boards WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Whether a board with this id exists.
///
/// `Ok(false)` means not found; any `Err` is a genuine database failure.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn board_exists<'e, E>(executor: E, id: i64) -> Result<bool, DbError>
where
    E: PgExecutor<'e>,
{
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM boards WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await?;

    Ok(exists)
}
