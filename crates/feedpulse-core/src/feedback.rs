use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::topic::Topic;

/// A feedback item that has passed field validation but is not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    pub board_id: i64,
    pub channel: String,
    pub text: String,
    /// When the customer left the feedback, as reported by the source.
    pub date: DateTime<Utc>,
}

/// Sentiment and topic returned by the classifier for one feedback text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Documented as `[-1, 1]`; carried through unchecked.
    pub sentiment_score: f64,
    pub topic: Topic,
}

impl Classification {
    /// Whether the score lies inside the documented `[-1, 1]` range.
    #[must_use]
    pub fn score_in_bounds(&self) -> bool {
        (-1.0..=1.0).contains(&self.sentiment_score)
    }
}
