//! Database operations for the `feedbacks` table.

use chrono::{DateTime, Utc};
use feedpulse_core::FeedbackDraft;
use sqlx::{PgExecutor, PgPool};

use crate::DbError;

/// A row from the `feedbacks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub board_id: i64,
    pub channel: String,
    pub text: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert a feedback row from a draft and return it.
///
/// # Errors
///
/// Returns [`DbError::ForeignKeyViolation`] if the board does not exist,
/// [`DbError::CheckViolation`] for an empty channel or text, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_feedback<'e, E>(executor: E, draft: &FeedbackDraft) -> Result<FeedbackRow, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, FeedbackRow>(
        "INSERT INTO feedbacks (board_id, channel, text, date) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, board_id, channel, text, date, created_at",
    )
    .bind(draft.board_id)
    .bind(&draft.channel)
    .bind(&draft.text)
    .bind(draft.date)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Fetch one feedback row by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has this id, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_feedback(pool: &PgPool, id: i64) -> Result<FeedbackRow, DbError> {
    sqlx::query_as::<_, FeedbackRow>(
        "SELECT id, board_id, channel, text, date, created_at \
         FROM feedbacks WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// All feedback of a board, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_feedbacks_by_board(
    pool: &PgPool,
    board_id: i64,
) -> Result<Vec<FeedbackRow>, DbError> {
    let rows = sqlx::query_as::<_, FeedbackRow>(
        "SELECT id, board_id, channel, text, date, created_at \
         FROM feedbacks \
         WHERE board_id = $1 \
         ORDER BY created_at, id",
    )
    .bind(board_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete a feedback row; its analysis goes with it through `ON DELETE CASCADE`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has this id, or [`DbError::Sqlx`]
/// if the delete fails.
pub async fn delete_feedback(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
