//! HTTP client for the Mistral chat completions endpoint.

use std::future::Future;
use std::time::Duration;

use feedpulse_core::{AppConfig, Classification};
use reqwest::{Client, Url};

use crate::error::ClassifierError;
use crate::prompt::{parse_completion, ChatRequest};
use crate::retry::retry_fixed;

/// Total number of requests made for one classification before giving up.
pub const MAX_ATTEMPTS: u32 = 5;

const COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Anything that can turn feedback text into a [`Classification`].
///
/// The ingestion pipeline depends on this trait rather than on
/// [`ClassifierClient`] so it can run against an in-memory fake.
pub trait Classify: Sync {
    fn classify(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Classification, ClassifierError>> + Send;
}

/// Connection settings for [`ClassifierClient`].
#[derive(Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClassifierConfig {
    /// Extracts classifier settings from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::MissingApiKey`] when `MISTRAL_API_KEY` was
    /// not provided.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ClassifierError> {
        let api_key = config
            .mistral_api_key
            .clone()
            .ok_or(ClassifierError::MissingApiKey)?;
        Ok(Self {
            api_key,
            base_url: config.classifier_base_url.clone(),
            model: config.classifier_model.clone(),
            timeout_secs: config.classifier_timeout_secs,
        })
    }
}

/// Classifies feedback text through the chat completions API.
pub struct ClassifierClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl ClassifierClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClassifierError::InvalidBaseUrl`] if
    /// `config.base_url` does not parse.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("feedpulse/0.1 (feedback-classification)")
            .build()?;

        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(COMPLETIONS_PATH))
            .map_err(|e| ClassifierError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint,
        })
    }

    /// Convenience constructor for tests pointing at a mock server.
    ///
    /// # Errors
    ///
    /// Same as [`ClassifierClient::new`].
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, ClassifierError> {
        Self::new(&ClassifierConfig {
            api_key: api_key.to_owned(),
            base_url: base_url.to_owned(),
            model: "mistral-large-latest".to_owned(),
            timeout_secs: 5,
        })
    }

    /// The fully-resolved completions URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Classifies `text`, retrying transport failures up to [`MAX_ATTEMPTS`]
    /// times in total.
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::Unavailable`] when every attempt failed to get a
    ///   2xx response.
    /// - [`ClassifierError::Parse`] when a 2xx response did not hold a valid
    ///   classification. This is not retried.
    pub async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let request = ChatRequest::for_feedback(&self.model, text);
        let body = retry_fixed(MAX_ATTEMPTS, || self.send(&request)).await?;
        let classification = parse_completion(&body)?;
        tracing::debug!(
            topic = %classification.topic,
            sentiment_score = classification.sentiment_score,
            "feedback classified"
        );
        Ok(classification)
    }

    /// Sends one completion request and returns the raw body of a 2xx response.
    async fn send(&self, request: &ChatRequest) -> Result<String, ClassifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

impl Classify for ClassifierClient {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        ClassifierClient::classify(self, text).await
    }
}
