use thiserror::Error;

/// Errors returned by the classification client.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Network failure or non-2xx status; no usable response was obtained.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Every attempt failed with a transient error.
    #[error("classification service unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    /// A response arrived but did not hold a valid classification.
    #[error("invalid classification response: {0}")]
    Parse(String),

    #[error("MISTRAL_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid classifier base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
