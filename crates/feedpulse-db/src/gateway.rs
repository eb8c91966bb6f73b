//! Transactional persistence contract used by the ingestion pipeline and the
//! metrics aggregator, with its Postgres implementation.
//!
//! A batch runs inside one outer transaction ([`BatchTx`]). Each item runs
//! inside a savepoint opened with [`BatchTx::begin_item`] and closed with
//! either [`BatchTx::release_item`] or [`BatchTx::rollback_item`], so a failed
//! item never leaves a partial row behind and never poisons the outer
//! transaction.

use std::future::Future;

use feedpulse_core::{Classification, FeedbackDraft};
use sqlx::{PgPool, Postgres, Transaction};

use crate::analyses::{insert_analysis, list_analyses_for_feedbacks, AnalysisRow};
use crate::boards::board_exists;
use crate::feedbacks::{insert_feedback, FeedbackRow};
use crate::DbError;

const ITEM_SAVEPOINT: &str = "feedback_item";

/// Opens batch-scoped transactions.
pub trait FeedbackStore: Sync {
    type Batch: BatchTx;

    fn begin_batch(&self) -> impl Future<Output = Result<Self::Batch, DbError>> + Send;
}

/// One open outer transaction.
///
/// Dropping a batch without calling [`BatchTx::commit`] discards its writes.
pub trait BatchTx: Send + Sized {
    /// `Ok(false)` is "not found"; `Err` is an infrastructure failure.
    fn board_exists(&mut self, board_id: i64)
        -> impl Future<Output = Result<bool, DbError>> + Send;

    fn begin_item(&mut self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn release_item(&mut self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn rollback_item(&mut self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn create_feedback(
        &mut self,
        draft: &FeedbackDraft,
    ) -> impl Future<Output = Result<FeedbackRow, DbError>> + Send;

    fn create_analysis(
        &mut self,
        feedback_id: i64,
        classification: &Classification,
    ) -> impl Future<Output = Result<AnalysisRow, DbError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Read access to analyses for metric computation.
pub trait AnalysisLookup: Sync {
    /// Analyses of the given feedback ids; ids without one are absent.
    fn analyses_for(
        &self,
        feedback_ids: &[i64],
    ) -> impl Future<Output = Result<Vec<AnalysisRow>, DbError>> + Send;
}

/// Postgres-backed gateway over a connection pool.
#[derive(Debug, Clone)]
pub struct PgFeedbackStore {
    pool: PgPool,
}

impl PgFeedbackStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl FeedbackStore for PgFeedbackStore {
    type Batch = PgBatch;

    async fn begin_batch(&self) -> Result<PgBatch, DbError> {
        let tx = self.pool.begin().await?;
        Ok(PgBatch { tx })
    }
}

impl AnalysisLookup for PgFeedbackStore {
    async fn analyses_for(&self, feedback_ids: &[i64]) -> Result<Vec<AnalysisRow>, DbError> {
        list_analyses_for_feedbacks(&self.pool, feedback_ids).await
    }
}

/// An outer Postgres transaction holding one pooled connection.
pub struct PgBatch {
    tx: Transaction<'static, Postgres>,
}

impl PgBatch {
    async fn execute(&mut self, statement: &str) -> Result<(), DbError> {
        sqlx::query(statement).execute(&mut *self.tx).await?;
        Ok(())
    }
}

impl BatchTx for PgBatch {
    async fn board_exists(&mut self, board_id: i64) -> Result<bool, DbError> {
        board_exists(&mut *self.tx, board_id).await
    }

    async fn begin_item(&mut self) -> Result<(), DbError> {
        self.execute(&format!("SAVEPOINT {ITEM_SAVEPOINT}")).await
    }

    async fn release_item(&mut self) -> Result<(), DbError> {
        self.execute(&format!("RELEASE SAVEPOINT {ITEM_SAVEPOINT}"))
            .await
    }

    async fn rollback_item(&mut self) -> Result<(), DbError> {
        tracing::debug!("rolling back item savepoint");
        self.execute(&format!("ROLLBACK TO SAVEPOINT {ITEM_SAVEPOINT}"))
            .await
    }

    async fn create_feedback(&mut self, draft: &FeedbackDraft) -> Result<FeedbackRow, DbError> {
        insert_feedback(&mut *self.tx, draft).await
    }

    async fn create_analysis(
        &mut self,
        feedback_id: i64,
        classification: &Classification,
    ) -> Result<AnalysisRow, DbError> {
        insert_analysis(&mut *self.tx, feedback_id, classification).await
    }

    async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
