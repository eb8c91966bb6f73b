//! In-memory fakes of the persistence and classification seams.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use feedpulse_classifier::{ClassifierError, Classify};
use feedpulse_core::{Classification, FeedbackDraft, Topic};
use feedpulse_db::{AnalysisLookup, AnalysisRow, BatchTx, DbError, FeedbackRow, FeedbackStore};

pub(crate) fn draft(board_id: i64, channel: &str, text: &str) -> FeedbackDraft {
    FeedbackDraft {
        board_id,
        channel: channel.to_owned(),
        text: text.to_owned(),
        date: fixed_time(),
    }
}

pub(crate) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

pub(crate) fn feedback_row(id: i64, channel: &str, created_at: DateTime<Utc>) -> FeedbackRow {
    FeedbackRow {
        id,
        board_id: 1,
        channel: channel.to_owned(),
        text: format!("feedback {id}"),
        date: created_at,
        created_at,
    }
}

pub(crate) fn analysis_row(feedback_id: i64, score: f64, topic: Topic) -> AnalysisRow {
    AnalysisRow {
        id: feedback_id + 1000,
        feedback_id,
        sentiment_score: score,
        topic: topic.label().to_owned(),
        created_at: fixed_time(),
    }
}

fn infra_error() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeState {
    pub boards: HashSet<i64>,
    pub feedbacks: Vec<FeedbackRow>,
    pub analyses: Vec<AnalysisRow>,
    pub begin_calls: usize,
    pub board_lookups: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub item_rollbacks: usize,
    pub fail_begin: bool,
    pub fail_commit: bool,
    pub fail_lookup: bool,
    pub failing_board: Option<i64>,
    pub failing_feedback_text: Option<String>,
    pub failing_analysis_text: Option<String>,
    pub fail_savepoint_rollback: bool,
    next_id: i64,
}

/// Gateway fake. Writes stay pending in the batch until commit.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeStore {
    state: Arc<Mutex<FakeState>>,
}

impl FakeStore {
    pub fn with_boards(boards: &[i64]) -> Self {
        let store = Self::default();
        store.lock().boards = boards.iter().copied().collect();
        store
    }

    pub fn with_analyses(rows: Vec<AnalysisRow>) -> Self {
        let store = Self::default();
        store.lock().analyses = rows;
        store
    }

    pub fn fail_begin(&self) {
        self.lock().fail_begin = true;
    }

    pub fn fail_commit(&self) {
        self.lock().fail_commit = true;
    }

    pub fn fail_lookup(&self) {
        self.lock().fail_lookup = true;
    }

    pub fn fail_board_lookup_for(&self, board_id: i64) {
        self.lock().failing_board = Some(board_id);
    }

    /// Feedback inserts with this text fail with a foreign key violation.
    pub fn fail_create_feedback_for(&self, text: &str) {
        self.lock().failing_feedback_text = Some(text.to_owned());
    }

    /// Analysis inserts for feedback with this text fail with a check violation.
    pub fn fail_create_analysis_for(&self, text: &str) {
        self.lock().failing_analysis_text = Some(text.to_owned());
    }

    pub fn fail_savepoint_rollback(&self) {
        self.lock().fail_savepoint_rollback = true;
    }

    pub fn snapshot(&self) -> FakeState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl FeedbackStore for FakeStore {
    type Batch = FakeBatch;

    async fn begin_batch(&self) -> Result<FakeBatch, DbError> {
        let mut state = self.lock();
        state.begin_calls += 1;
        if state.fail_begin {
            return Err(infra_error());
        }
        Ok(FakeBatch {
            store: self.clone(),
            feedbacks: Vec::new(),
            analyses: Vec::new(),
            savepoint: None,
        })
    }
}

impl AnalysisLookup for FakeStore {
    async fn analyses_for(&self, feedback_ids: &[i64]) -> Result<Vec<AnalysisRow>, DbError> {
        let state = self.lock();
        if state.fail_lookup {
            return Err(infra_error());
        }
        Ok(state
            .analyses
            .iter()
            .filter(|a| feedback_ids.contains(&a.feedback_id))
            .cloned()
            .collect())
    }
}

pub(crate) struct FakeBatch {
    store: FakeStore,
    feedbacks: Vec<FeedbackRow>,
    analyses: Vec<AnalysisRow>,
    savepoint: Option<(usize, usize)>,
}

impl BatchTx for FakeBatch {
    async fn board_exists(&mut self, board_id: i64) -> Result<bool, DbError> {
        let mut state = self.store.lock();
        state.board_lookups += 1;
        if state.failing_board == Some(board_id) {
            return Err(infra_error());
        }
        Ok(state.boards.contains(&board_id))
    }

    async fn begin_item(&mut self) -> Result<(), DbError> {
        self.savepoint = Some((self.feedbacks.len(), self.analyses.len()));
        Ok(())
    }

    async fn release_item(&mut self) -> Result<(), DbError> {
        self.savepoint = None;
        Ok(())
    }

    async fn rollback_item(&mut self) -> Result<(), DbError> {
        if self.store.lock().fail_savepoint_rollback {
            return Err(infra_error());
        }
        if let Some((feedbacks, analyses)) = self.savepoint.take() {
            self.feedbacks.truncate(feedbacks);
            self.analyses.truncate(analyses);
        }
        self.store.lock().item_rollbacks += 1;
        Ok(())
    }

    async fn create_feedback(&mut self, draft: &FeedbackDraft) -> Result<FeedbackRow, DbError> {
        let id = {
            let mut state = self.store.lock();
            if state.failing_feedback_text.as_deref() == Some(draft.text.as_str()) {
                return Err(DbError::ForeignKeyViolation("feedbacks_board_id_fkey".to_owned()));
            }
            state.next_id += 1;
            state.next_id
        };
        let row = FeedbackRow {
            id,
            board_id: draft.board_id,
            channel: draft.channel.clone(),
            text: draft.text.clone(),
            date: draft.date,
            created_at: fixed_time(),
        };
        self.feedbacks.push(row.clone());
        Ok(row)
    }

    async fn create_analysis(
        &mut self,
        feedback_id: i64,
        classification: &Classification,
    ) -> Result<AnalysisRow, DbError> {
        let Some(feedback) = self.feedbacks.iter().find(|f| f.id == feedback_id) else {
            return Err(DbError::ForeignKeyViolation("analyses_feedback_id_fkey".to_owned()));
        };
        if self.store.lock().failing_analysis_text.as_deref() == Some(feedback.text.as_str()) {
            return Err(DbError::CheckViolation("analyses_sentiment_score_check".to_owned()));
        }
        let row = analysis_row(feedback_id, classification.sentiment_score, classification.topic);
        self.analyses.push(row.clone());
        Ok(row)
    }

    async fn commit(self) -> Result<(), DbError> {
        let mut state = self.store.lock();
        if state.fail_commit {
            return Err(infra_error());
        }
        state.commits += 1;
        state.feedbacks.extend(self.feedbacks);
        state.analyses.extend(self.analyses);
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbError> {
        self.store.lock().rollbacks += 1;
        Ok(())
    }
}

/// Classifier fake keyed on the feedback text:
/// `flaky` is unavailable, `garbled` fails to parse, `extreme` scores 3.0 and
/// anything else scores 0.5 under `Performance`.
#[derive(Debug, Default)]
pub(crate) struct FakeClassifier {
    calls: AtomicUsize,
}

impl FakeClassifier {
    pub fn positive() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classify for FakeClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match text {
            "flaky" => Err(ClassifierError::Unavailable {
                attempts: 5,
                last_error: "HTTP status server error (503 Service Unavailable)".to_owned(),
            }),
            "garbled" => Err(ClassifierError::Parse("message content: expected value".to_owned())),
            "extreme" => Ok(Classification {
                sentiment_score: 3.0,
                topic: Topic::Performance,
            }),
            _ => Ok(Classification {
                sentiment_score: 0.5,
                topic: Topic::Performance,
            }),
        }
    }
}
