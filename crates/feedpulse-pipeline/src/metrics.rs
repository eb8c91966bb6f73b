//! Per-board statistics over stored feedback and its analyses.

use std::collections::{BTreeMap, HashMap};

use feedpulse_core::{round2, Classification, MetricReport, SentimentBuckets};
use feedpulse_db::{AnalysisLookup, AnalysisRow, DbError, FeedbackRow};
use thiserror::Error;

/// Scores strictly below this value count as "under threshold".
pub const SENTIMENT_THRESHOLD: f64 = -0.5;

const POSITIVE_CUTOFF: f64 = 0.25;
const NEGATIVE_CUTOFF: f64 = -0.25;

/// Reported as the average when any item has no analysis.
const MISSING_ANALYSIS_SENTINEL: f64 = -100.0;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("no analysis found for feedback {feedback_id}")]
    MissingAnalysis { feedback_id: i64 },

    #[error("analysis lookup failed: {0}")]
    Lookup(#[from] DbError),
}

/// One feedback item paired with its analysis, `None` when the lookup failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemAnalysis {
    pub feedback_id: i64,
    pub classification: Option<Classification>,
}

/// Computes the full report for `feedbacks`.
///
/// Analyses are fetched once for all items. An item whose analysis is absent,
/// or whose stored topic does not parse, counts as a failed lookup.
///
/// # Errors
///
/// - [`MetricsError::Lookup`] if the analysis query itself fails.
/// - [`MetricsError::MissingAnalysis`] if any item has no usable analysis,
///   since the topic distribution cannot be computed.
pub async fn compute_metrics<L: AnalysisLookup>(
    lookup: &L,
    feedbacks: &[FeedbackRow],
) -> Result<MetricReport, MetricsError> {
    if feedbacks.is_empty() {
        return Ok(MetricReport::default());
    }

    let ids: Vec<i64> = feedbacks.iter().map(|f| f.id).collect();
    let rows = lookup.analyses_for(&ids).await?;
    let analyses = pair_analyses(feedbacks, rows);

    let missing = analyses.iter().filter(|a| a.classification.is_none()).count();
    if missing > 0 {
        tracing::warn!(missing, total = feedbacks.len(), "feedback items without analysis");
    }

    Ok(MetricReport {
        distribution_by_channel: distribution_by_channel(feedbacks),
        distribution_by_topic: distribution_by_topic(&analyses)?,
        volumetry_by_day: volumetry_by_day(feedbacks),
        average_sentiment: average_sentiment(&analyses),
        sentiment: sentiment_buckets(&analyses),
        percentage_under_threshold: percentage_under_threshold(&analyses, SENTIMENT_THRESHOLD),
    })
}

/// Lines up fetched rows with `feedbacks`, preserving input order.
#[must_use]
pub fn pair_analyses(feedbacks: &[FeedbackRow], rows: Vec<AnalysisRow>) -> Vec<ItemAnalysis> {
    let mut by_feedback: HashMap<i64, Classification> = HashMap::with_capacity(rows.len());
    for row in rows {
        match row.topic() {
            Ok(topic) => {
                by_feedback.insert(
                    row.feedback_id,
                    Classification {
                        sentiment_score: row.sentiment_score,
                        topic,
                    },
                );
            }
            Err(e) => {
                tracing::warn!(feedback_id = row.feedback_id, error = %e, "skipping unreadable analysis");
            }
        }
    }

    feedbacks
        .iter()
        .map(|f| ItemAnalysis {
            feedback_id: f.id,
            classification: by_feedback.get(&f.id).copied(),
        })
        .collect()
}

/// Share of items per channel, in percent.
#[must_use]
pub fn distribution_by_channel(feedbacks: &[FeedbackRow]) -> BTreeMap<String, f64> {
    percentages(feedbacks.iter().map(|f| f.channel.clone()), feedbacks.len())
}

/// Share of items per `created_at` calendar day (`YYYY-MM-DD`), in percent.
#[must_use]
pub fn volumetry_by_day(feedbacks: &[FeedbackRow]) -> BTreeMap<String, f64> {
    percentages(
        feedbacks
            .iter()
            .map(|f| f.created_at.format("%Y-%m-%d").to_string()),
        feedbacks.len(),
    )
}

/// Share of items per topic label, in percent.
///
/// # Errors
///
/// Returns [`MetricsError::MissingAnalysis`] for the first item without an
/// analysis.
pub fn distribution_by_topic(
    analyses: &[ItemAnalysis],
) -> Result<BTreeMap<String, f64>, MetricsError> {
    let labels = analyses
        .iter()
        .map(|a| {
            a.classification
                .map(|c| c.topic.label().to_owned())
                .ok_or(MetricsError::MissingAnalysis {
                    feedback_id: a.feedback_id,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(percentages(labels.into_iter(), analyses.len()))
}

/// Mean sentiment score, or `-100.0` if any item has no analysis.
#[must_use]
pub fn average_sentiment(analyses: &[ItemAnalysis]) -> f64 {
    if analyses.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    for a in analyses {
        match a.classification {
            Some(c) => sum += c.sentiment_score,
            None => return MISSING_ANALYSIS_SENTINEL,
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let count = analyses.len() as f64;
    round2(sum / count)
}

/// Positive / neutral / negative shares. Items without an analysis are left
/// out of every bucket but still count in the denominator.
#[must_use]
pub fn sentiment_buckets(analyses: &[ItemAnalysis]) -> SentimentBuckets {
    let (mut positive, mut neutral, mut negative) = (0usize, 0usize, 0usize);
    for score in scores(analyses) {
        if score > POSITIVE_CUTOFF {
            positive += 1;
        } else if score < NEGATIVE_CUTOFF {
            negative += 1;
        } else {
            neutral += 1;
        }
    }
    SentimentBuckets {
        positive: percent(positive, analyses.len()),
        neutral: percent(neutral, analyses.len()),
        negative: percent(negative, analyses.len()),
    }
}

/// Share of items scoring strictly below `threshold`.
#[must_use]
pub fn percentage_under_threshold(analyses: &[ItemAnalysis], threshold: f64) -> f64 {
    let under = scores(analyses).filter(|s| *s < threshold).count();
    percent(under, analyses.len())
}

fn scores(analyses: &[ItemAnalysis]) -> impl Iterator<Item = f64> + '_ {
    analyses
        .iter()
        .filter_map(|a| a.classification.map(|c| c.sentiment_score))
}

fn percentages(keys: impl Iterator<Item = String>, total: usize) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| (key, percent(count, total)))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}
