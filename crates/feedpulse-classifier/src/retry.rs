//! Fixed-count retry for classification requests.
//!
//! Transport failures and non-2xx responses are retried immediately, with no
//! delay between attempts. Anything else is returned as-is on first failure.

use std::future::Future;

use crate::error::ClassifierError;

/// Only HTTP-level failures are retried; a response that arrived but could
/// not be parsed will not improve on a second try.
pub(crate) fn is_retriable(err: &ClassifierError) -> bool {
    match err {
        ClassifierError::Http(_) => true,
        ClassifierError::Unavailable { .. }
        | ClassifierError::Parse(_)
        | ClassifierError::MissingApiKey
        | ClassifierError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` up to `max_attempts` times in total.
///
/// Returns [`ClassifierError::Unavailable`] once every attempt has failed with
/// a retriable error.
pub(crate) async fn retry_fixed<T, F, Fut>(
    max_attempts: u32,
    mut operation: F,
) -> Result<T, ClassifierError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClassifierError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) => return Err(err),
            Err(err) if attempt >= max_attempts => {
                tracing::error!(attempts = attempt, error = %err, "classifier gave up");
                return Err(ClassifierError::Unavailable {
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }
            Err(err) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %err,
                    "classifier request failed, retrying"
                );
            }
        }
    }
}
