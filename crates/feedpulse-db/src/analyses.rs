//! Database operations for the `analyses` table.

use chrono::{DateTime, Utc};
use feedpulse_core::{Classification, Topic};
use sqlx::{PgExecutor, PgPool};

use crate::DbError;

/// A row from the `analyses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRow {
    pub id: i64,
    pub feedback_id: i64,
    pub sentiment_score: f64,
    /// One of the [`Topic`] labels; enforced by a `CHECK` constraint.
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRow {
    /// Parse the stored label back into a [`Topic`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidTopic`] if the label is outside the closed set.
    pub fn topic(&self) -> Result<Topic, DbError> {
        self.topic
            .parse()
            .map_err(|_| DbError::InvalidTopic(self.topic.clone()))
    }
}

/// Insert the analysis of an existing feedback row.
///
/// # Errors
///
/// - [`DbError::ForeignKeyViolation`] if `feedback_id` does not reference a
///   feedback row visible to this executor.
/// - [`DbError::UniqueViolation`] if the feedback already has an analysis.
/// - [`DbError::CheckViolation`] if the score is outside `[-1, 1]`.
/// - [`DbError::Sqlx`] for any other failure.
pub async fn insert_analysis<'e, E>(
    executor: E,
    feedback_id: i64,
    classification: &Classification,
) -> Result<AnalysisRow, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, AnalysisRow>(
        "INSERT INTO analyses (feedback_id, sentiment_score, topic) \
         VALUES ($1, $2, $3) \
         RETURNING id, feedback_id, sentiment_score, topic, created_at",
    )
    .bind(feedback_id)
    .bind(classification.sentiment_score)
    .bind(classification.topic.label())
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Fetch the analysis of one feedback row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the feedback has no analysis, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn find_analysis_by_feedback_id(
    pool: &PgPool,
    feedback_id: i64,
) -> Result<AnalysisRow, DbError> {
    sqlx::query_as::<_, AnalysisRow>(
        "SELECT id, feedback_id, sentiment_score, topic, created_at \
         FROM analyses WHERE feedback_id = $1",
    )
    .bind(feedback_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Fetch the analyses of many feedback rows in one round trip.
///
/// Feedback ids without an analysis are simply absent from the result.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_analyses_for_feedbacks(
    pool: &PgPool,
    feedback_ids: &[i64],
) -> Result<Vec<AnalysisRow>, DbError> {
    if feedback_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, AnalysisRow>(
        "SELECT id, feedback_id, sentiment_score, topic, created_at \
         FROM analyses \
         WHERE feedback_id = ANY($1) \
         ORDER BY feedback_id",
    )
    .bind(feedback_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
