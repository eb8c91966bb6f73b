//! Chat completion payloads and response parsing.
//!
//! The request asks the model for a JSON object `{"topic", "sentiment_score"}`.
//! Generation parameters are pinned (including the seed) so the same text
//! classifies the same way across runs.

use feedpulse_core::{Classification, Topic};
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

const TEMPERATURE: f32 = 1.0;
const TOP_P: f32 = 1.0;
const RANDOM_SEED: u64 = 42_069;
const MAX_TOKENS: u32 = 4_000;

const ASSISTANT_ACK: &str = "Sure, please provide the sentence you'd like me to analyze.";

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub random_seed: u64,
    pub max_tokens: u32,
    pub safe_prompt: bool,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ChatRequest {
    /// Builds the three-message conversation used to classify one feedback text.
    #[must_use]
    pub fn for_feedback(model: &str, text: &str) -> Self {
        Self {
            model: model.to_owned(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction(),
                },
                ChatMessage {
                    role: "assistant",
                    content: ASSISTANT_ACK.to_owned(),
                },
                ChatMessage {
                    role: "user",
                    content: text.to_owned(),
                },
            ],
            temperature: TEMPERATURE,
            top_p: TOP_P,
            random_seed: RANDOM_SEED,
            max_tokens: MAX_TOKENS,
            safe_prompt: false,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

/// Instruction listing every allowed topic label and the expected output shape.
#[must_use]
pub fn system_instruction() -> String {
    let labels = Topic::ALL
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "I will give you a sentence. Analyse it and give it a sentiment score between -1 and +1 \
         (negative, neutral and positive). Also give it a topic in French, chosen among exactly \
         these labels: {labels}. Answer only with JSON in this format:\n\
         {{\"topic\": \"the topic of the sentence\", \"sentiment_score\": 0}}"
    )
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    topic: String,
    sentiment_score: f64,
}

/// Extracts a [`Classification`] from a raw chat completion response body.
///
/// The score is passed through unchanged; range checking is left to the
/// caller.
///
/// # Errors
///
/// Returns [`ClassifierError::Parse`] if the envelope is not valid JSON, has
/// no choices, the message content is not the expected object, or the topic
/// is not one of the known labels.
pub fn parse_completion(body: &str) -> Result<Classification, ClassifierError> {
    let envelope: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ClassifierError::Parse(format!("completion envelope: {e}")))?;

    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ClassifierError::Parse("completion has no choices".to_owned()))?;

    let content = strip_code_fence(&choice.message.content);
    let raw: RawClassification = serde_json::from_str(content)
        .map_err(|e| ClassifierError::Parse(format!("message content: {e}")))?;

    let topic = raw
        .topic
        .parse::<Topic>()
        .map_err(|e| ClassifierError::Parse(e.to_string()))?;

    Ok(Classification {
        sentiment_score: raw.sentiment_score,
        topic,
    })
}

/// Models sometimes wrap JSON output in a markdown fence even in JSON mode.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
