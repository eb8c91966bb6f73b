//! Batch ingestion: board validation, persistence and classification of each
//! feedback item inside one outer transaction.

use std::collections::HashSet;
use std::fmt;

use feedpulse_classifier::{ClassifierError, Classify};
use feedpulse_core::FeedbackDraft;
use feedpulse_db::{BatchTx, DbError, FeedbackStore};
use serde::Serialize;
use thiserror::Error;

/// A failed item and the reason it failed. `item` is the 1-based position
/// in the batch handed to [`IngestPipeline::run_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub item: usize,
    pub message: String,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item #{}: {}", self.item, self.message)
    }
}

/// Result of a batch that reached the end of its item loop.
///
/// `errors` holds one entry per failed item, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionOutcome {
    pub success_count: usize,
    pub errors: Vec<ItemError>,
}

/// Batch-level failures. Per-item failures never surface here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to begin batch transaction: {0}")]
    Begin(#[source] DbError),

    /// The batch was rolled back; successes recorded so far are discarded.
    #[error("board lookup failed for board {board_id}: {source}")]
    BoardLookup {
        board_id: i64,
        #[source]
        source: DbError,
    },

    /// A savepoint could not be opened, released or rolled back. The outer
    /// transaction is unusable after this, so the batch was rolled back.
    #[error("savepoint handling failed at item #{item}: {source}")]
    Savepoint {
        item: usize,
        #[source]
        source: DbError,
    },

    /// The item loop finished but the commit failed. The outcome describes
    /// what would have been persisted.
    #[error("failed to commit batch with {} successful items: {source}", .outcome.success_count)]
    Commit {
        outcome: IngestionOutcome,
        #[source]
        source: DbError,
    },
}

/// Why a single item was rolled back.
#[derive(Debug, Error)]
pub enum ItemFailure {
    #[error("database error: {0}")]
    Persistence(#[from] DbError),

    #[error("classification failed: {0}")]
    Classification(#[from] ClassifierError),

    #[error("sentiment score {0} is outside [-1, 1]")]
    ScoreOutOfRange(f64),
}

/// Ingests feedback batches through a [`FeedbackStore`] and a [`Classify`]
/// implementation.
pub struct IngestPipeline<S, C> {
    store: S,
    classifier: C,
}

impl<S, C> IngestPipeline<S, C>
where
    S: FeedbackStore,
    C: Classify,
{
    pub fn new(store: S, classifier: C) -> Self {
        Self { store, classifier }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingests drafts parsed from an uploaded file.
    ///
    /// # Errors
    ///
    /// See [`IngestPipeline::run_batch`].
    pub async fn ingest_upload(
        &self,
        drafts: &[FeedbackDraft],
    ) -> Result<IngestionOutcome, IngestError> {
        tracing::info!(items = drafts.len(), source = "upload", "ingesting feedback batch");
        self.run_batch(drafts).await
    }

    /// Ingests drafts built from fetched comments. `requester_email` is only
    /// attached to log records.
    ///
    /// # Errors
    ///
    /// See [`IngestPipeline::run_batch`].
    pub async fn ingest_fetched(
        &self,
        drafts: &[FeedbackDraft],
        requester_email: &str,
    ) -> Result<IngestionOutcome, IngestError> {
        tracing::info!(
            items = drafts.len(),
            source = "fetch",
            requester = requester_email,
            "ingesting feedback batch"
        );
        self.run_batch(drafts).await
    }

    /// Processes `drafts` in order inside one outer transaction.
    ///
    /// 1. An empty batch returns immediately without opening a transaction.
    /// 2. Each board id is checked once per batch. A missing board is a
    ///    per-item error; a failed lookup aborts the whole batch.
    /// 3. Each item runs inside a savepoint: create the feedback row, classify
    ///    its text, check the score bound, create the analysis row. Any failure
    ///    rolls the savepoint back and is recorded as a per-item error. A
    ///    failure of the savepoint itself aborts the whole batch.
    /// 4. The outer transaction is committed when at least one item succeeded
    ///    and rolled back otherwise.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Begin`] if the outer transaction cannot be opened.
    /// - [`IngestError::BoardLookup`] if a board existence check fails.
    /// - [`IngestError::Savepoint`] if an item's savepoint cannot be managed.
    /// - [`IngestError::Commit`] if the final commit fails.
    pub async fn run_batch(
        &self,
        drafts: &[FeedbackDraft],
    ) -> Result<IngestionOutcome, IngestError> {
        let mut outcome = IngestionOutcome::default();
        if drafts.is_empty() {
            return Ok(outcome);
        }

        let mut batch = self.store.begin_batch().await.map_err(IngestError::Begin)?;
        let mut verified_boards: HashSet<i64> = HashSet::new();

        for (idx, draft) in drafts.iter().enumerate() {
            let item = idx + 1;

            if !verified_boards.contains(&draft.board_id) {
                match batch.board_exists(draft.board_id).await {
                    Ok(true) => {
                        verified_boards.insert(draft.board_id);
                    }
                    Ok(false) => {
                        tracing::warn!(item, board_id = draft.board_id, "board does not exist");
                        outcome.errors.push(ItemError {
                            item,
                            message: format!("board with ID {} does not exist", draft.board_id),
                        });
                        continue;
                    }
                    Err(source) => {
                        tracing::error!(
                            item,
                            board_id = draft.board_id,
                            error = %source,
                            "board lookup failed, aborting batch"
                        );
                        if let Err(e) = batch.rollback().await {
                            tracing::warn!(error = %e, "batch rollback failed");
                        }
                        return Err(IngestError::BoardLookup {
                            board_id: draft.board_id,
                            source,
                        });
                    }
                }
            }

            let result = match self.ingest_item(&mut batch, draft).await {
                Ok(result) => result,
                Err(source) => {
                    tracing::error!(item, error = %source, "savepoint failed, aborting batch");
                    if let Err(e) = batch.rollback().await {
                        tracing::warn!(error = %e, "batch rollback failed");
                    }
                    return Err(IngestError::Savepoint { item, source });
                }
            };

            match result {
                Ok(feedback_id) => {
                    tracing::debug!(item, feedback_id, "feedback item ingested");
                    outcome.success_count += 1;
                }
                Err(cause) => {
                    tracing::warn!(item, board_id = draft.board_id, error = %cause, "feedback item failed");
                    outcome.errors.push(ItemError {
                        item,
                        message: cause.to_string(),
                    });
                }
            }
        }

        if outcome.success_count > 0 {
            if let Err(source) = batch.commit().await {
                tracing::error!(error = %source, "batch commit failed");
                return Err(IngestError::Commit { outcome, source });
            }
            tracing::info!(
                succeeded = outcome.success_count,
                failed = outcome.errors.len(),
                "batch committed"
            );
        } else {
            if let Err(e) = batch.rollback().await {
                tracing::warn!(error = %e, "rollback of empty batch failed");
            }
            tracing::info!(failed = outcome.errors.len(), "no item succeeded, batch rolled back");
        }

        Ok(outcome)
    }

    /// Runs one item inside its own savepoint.
    ///
    /// The inner result is the item's own outcome. The outer error is a
    /// savepoint failure, which leaves the outer transaction aborted.
    async fn ingest_item(
        &self,
        batch: &mut S::Batch,
        draft: &FeedbackDraft,
    ) -> Result<Result<i64, ItemFailure>, DbError> {
        batch.begin_item().await?;

        match self.write_item(batch, draft).await {
            Ok(feedback_id) => {
                batch.release_item().await?;
                Ok(Ok(feedback_id))
            }
            Err(cause) => {
                batch.rollback_item().await?;
                Ok(Err(cause))
            }
        }
    }

    async fn write_item(
        &self,
        batch: &mut S::Batch,
        draft: &FeedbackDraft,
    ) -> Result<i64, ItemFailure> {
        let feedback = batch.create_feedback(draft).await?;
        let classification = self.classifier.classify(&draft.text).await?;
        if !classification.score_in_bounds() {
            return Err(ItemFailure::ScoreOutOfRange(classification.sentiment_score));
        }
        batch.create_analysis(feedback.id, &classification).await?;
        Ok(feedback.id)
    }
}
