//! Dashboard metric report for one board.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Percentage of a board's feedback in each sentiment bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBuckets {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Metrics computed on demand from a board's feedback and analyses.
///
/// Field names are the dashboard's JSON contract, including the
/// `percentageSentimentUnderTreshold` spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    #[serde(rename = "distributionByChannel")]
    pub distribution_by_channel: BTreeMap<String, f64>,
    #[serde(rename = "distributionByTopic")]
    pub distribution_by_topic: BTreeMap<String, f64>,
    /// Keyed by calendar day, `YYYY-MM-DD`.
    #[serde(rename = "volumetryByDay")]
    pub volumetry_by_day: BTreeMap<String, f64>,
    #[serde(rename = "averageSentiment")]
    pub average_sentiment: f64,
    #[serde(rename = "Sentiment")]
    pub sentiment: SentimentBuckets,
    #[serde(rename = "percentageSentimentUnderTreshold")]
    pub percentage_under_threshold: f64,
}

/// Round half away from zero to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
