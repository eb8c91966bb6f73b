//! Feedback ingestion, metric aggregation and the feedback sources feeding
//! them.

pub mod ingest;
pub mod metrics;
pub mod sources;
pub mod summary;

#[cfg(test)]
mod testing;

pub use ingest::{IngestError, IngestPipeline, IngestionOutcome, ItemError, ItemFailure};
pub use metrics::{compute_metrics, ItemAnalysis, MetricsError, SENTIMENT_THRESHOLD};
pub use sources::{
    build_fetch_client, comments_to_records, fetch_comments, parse_feedback_file,
    validate_records, Comment, FeedbackRecord, SourceError, ValidatedRecords, FETCH_CHANNELS,
};
pub use summary::IngestionSummary;
