use serde::Serialize;

use crate::ingest::IngestionOutcome;
use crate::sources::ValidatedRecords;

/// Caller-facing result of one ingestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionSummary {
    pub total: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

impl IngestionSummary {
    /// Validation errors come first, then pipeline errors in item order.
    ///
    /// Pipeline errors are numbered by draft position. They are renumbered to
    /// the record's position in the request so both kinds of message share
    /// one index space.
    #[must_use]
    pub fn new(validated: ValidatedRecords, outcome: IngestionOutcome) -> Self {
        let total = validated.errors.len() + validated.drafts.len();
        let mut errors = validated.errors;
        errors.extend(outcome.errors.into_iter().map(|e| {
            let item = e
                .item
                .checked_sub(1)
                .and_then(|i| validated.positions.get(i))
                .copied()
                .unwrap_or(e.item);
            format!("item #{item}: {}", e.message)
        }));
        Self {
            total,
            success_count: outcome.success_count,
            error_count: total.saturating_sub(outcome.success_count),
            errors,
        }
    }
}
