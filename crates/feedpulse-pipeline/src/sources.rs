//! Turning raw inputs into validated feedback drafts.
//!
//! Two sources are supported: an uploaded JSON file of `{date, channel, text}`
//! records and a remote JSON endpoint of comments.

use std::time::Duration;

use chrono::{DateTime, Utc};
use feedpulse_core::FeedbackDraft;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Channels randomly assigned to fetched comments.
pub const FETCH_CHANNELS: [&str; 4] = ["twitter", "facebook", "instagram", "web"];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no feedback provided")]
    Empty,

    #[error("too many feedback items: {count} (maximum {max})")]
    TooMany { count: usize, max: usize },

    #[error("invalid feedback JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("comment source returned status {status}")]
    UnexpectedStatus { status: u16 },
}

/// One feedback entry as it appears in an uploaded file.
///
/// Missing fields deserialize to empty values and are caught by
/// [`validate_records`]. A missing date means "now".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub text: String,
}

/// A comment from the remote comment source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: i64,
    pub id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Parses an uploaded feedback file.
///
/// # Errors
///
/// - [`SourceError::Json`] if the bytes are not a JSON array of records.
/// - [`SourceError::Empty`] if the array is empty.
/// - [`SourceError::TooMany`] if it holds more than `max_items` records.
pub fn parse_feedback_file(
    bytes: &[u8],
    max_items: usize,
) -> Result<Vec<FeedbackRecord>, SourceError> {
    let records: Vec<FeedbackRecord> = serde_json::from_slice(bytes)?;
    if records.is_empty() {
        return Err(SourceError::Empty);
    }
    if records.len() > max_items {
        return Err(SourceError::TooMany {
            count: records.len(),
            max: max_items,
        });
    }
    Ok(records)
}

/// Builds the HTTP client used for [`fetch_comments`].
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the client cannot be constructed.
pub fn build_fetch_client(timeout_secs: u64) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("feedpulse/0.1 (feedback-fetch)")
        .build()?)
}

/// Fetches the comment list at `url`.
///
/// # Errors
///
/// - [`SourceError::Http`] on network failure.
/// - [`SourceError::UnexpectedStatus`] for anything but `200 OK`.
/// - [`SourceError::Json`] if the body is not a JSON array of comments.
pub async fn fetch_comments(client: &Client, url: &str) -> Result<Vec<Comment>, SourceError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(SourceError::UnexpectedStatus {
            status: status.as_u16(),
        });
    }
    let body = response.text().await?;
    let comments: Vec<Comment> = serde_json::from_str(&body)?;
    tracing::debug!(url, count = comments.len(), "fetched comments");
    Ok(comments)
}

/// Maps comments to feedback records: the body becomes the text, the channel
/// is drawn from [`FETCH_CHANNELS`] and the date is the current time.
pub fn comments_to_records<R>(comments: Vec<Comment>, rng: &mut R) -> Vec<FeedbackRecord>
where
    R: Rng + ?Sized,
{
    let now = Utc::now();
    comments
        .into_iter()
        .map(|c| FeedbackRecord {
            date: Some(now),
            channel: FETCH_CHANNELS[rng.random_range(0..FETCH_CHANNELS.len())].to_owned(),
            text: c.body,
        })
        .collect()
}

/// Records that passed validation, with the 1-based input position of each
/// draft and messages for the records that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedRecords {
    pub drafts: Vec<FeedbackDraft>,
    pub positions: Vec<usize>,
    pub errors: Vec<String>,
}

impl ValidatedRecords {
    /// Keeps at most `limit` drafts.
    pub fn truncate(&mut self, limit: usize) {
        self.drafts.truncate(limit);
        self.positions.truncate(limit);
    }
}

/// Splits records into drafts bound to `board_id` and messages for records
/// with an empty channel or text. Message indices are 1-based positions in
/// `records`.
#[must_use]
pub fn validate_records(records: Vec<FeedbackRecord>, board_id: i64) -> ValidatedRecords {
    let mut validated = ValidatedRecords {
        drafts: Vec::with_capacity(records.len()),
        positions: Vec::with_capacity(records.len()),
        errors: Vec::new(),
    };
    let now = Utc::now();

    for (idx, record) in records.into_iter().enumerate() {
        if record.channel.trim().is_empty() || record.text.trim().is_empty() {
            validated
                .errors
                .push(format!("item #{} missing required fields", idx + 1));
            continue;
        }
        validated.drafts.push(FeedbackDraft {
            board_id,
            channel: record.channel,
            text: record.text,
            date: record.date.unwrap_or(now),
        });
        validated.positions.push(idx + 1);
    }

    validated
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn parses_records_with_and_without_date() {
        let json = br#"[
            {"date": "2025-02-01T10:00:00Z", "channel": "email", "text": "Love it"},
            {"channel": "web", "text": "Too slow"}
        ]"#;

        let records = parse_feedback_file(json, 10).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].channel, "email");
        assert!(records[0].date.is_some());
        assert!(records[1].date.is_none());
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(matches!(parse_feedback_file(b"[]", 10), Err(SourceError::Empty)));
    }

    #[test]
    fn more_than_max_items_is_rejected() {
        let records: Vec<FeedbackRecord> = (0..11)
            .map(|i| FeedbackRecord {
                date: None,
                channel: "email".to_owned(),
                text: format!("feedback {i}"),
            })
            .collect();
        let json = serde_json::to_vec(&records).unwrap();

        let err = parse_feedback_file(&json, 10).unwrap_err();

        assert!(matches!(err, SourceError::TooMany { count: 11, max: 10 }));
    }

    #[test]
    fn non_array_is_a_json_error() {
        assert!(matches!(
            parse_feedback_file(br#"{"channel": "email"}"#, 10),
            Err(SourceError::Json(_))
        ));
    }

    #[test]
    fn validation_reports_incomplete_records_by_position() {
        let records = vec![
            FeedbackRecord {
                channel: "email".to_owned(),
                text: "fine".to_owned(),
                ..FeedbackRecord::default()
            },
            FeedbackRecord {
                channel: String::new(),
                text: "no channel".to_owned(),
                ..FeedbackRecord::default()
            },
            FeedbackRecord {
                channel: "web".to_owned(),
                text: "   ".to_owned(),
                ..FeedbackRecord::default()
            },
        ];

        let validated = validate_records(records, 42);

        assert_eq!(validated.drafts.len(), 1);
        assert_eq!(validated.drafts[0].board_id, 42);
        assert_eq!(validated.positions, vec![1]);
        assert_eq!(
            validated.errors,
            vec![
                "item #2 missing required fields".to_owned(),
                "item #3 missing required fields".to_owned(),
            ]
        );
    }

    #[test]
    fn comments_map_to_records_with_known_channels() {
        let comments = vec![
            Comment {
                post_id: 1,
                id: 1,
                name: "id labore ex et quam laborum".to_owned(),
                email: "Eliseo@gardner.biz".to_owned(),
                body: "laudantium enim quasi est".to_owned(),
            },
            Comment {
                post_id: 1,
                id: 2,
                name: "quo vero reiciendis".to_owned(),
                email: "Jayne_Kuhic@sydney.com".to_owned(),
                body: "est natus enim nihil".to_owned(),
            },
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let records = comments_to_records(comments, &mut rng);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "laudantium enim quasi est");
        for r in &records {
            assert!(FETCH_CHANNELS.contains(&r.channel.as_str()), "got {}", r.channel);
            assert!(r.date.is_some());
        }
    }
}
