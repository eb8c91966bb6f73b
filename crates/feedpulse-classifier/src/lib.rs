//! Sentiment and topic classification of feedback text through the Mistral
//! chat completions API.

pub mod client;
pub mod error;
pub mod prompt;

mod retry;

pub use client::{Classify, ClassifierClient, ClassifierConfig, MAX_ATTEMPTS};
pub use error::ClassifierError;
pub use prompt::parse_completion;
