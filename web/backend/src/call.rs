use crate::error::ProviderError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Result of a call raced against a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T> {
    Completed(T),
    TimedOut,
}

impl<T> CallOutcome<Result<T, ProviderError>> {
    /// Folds a timeout into the provider error space.
    pub fn into_result(self) -> Result<T, ProviderError> {
        match self {
            CallOutcome::Completed(result) => result,
            CallOutcome::TimedOut => Err(ProviderError::Timeout),
        }
    }
}

/// Runs `call` for at most `limit`. On timeout the call future is dropped,
/// which aborts any request it has in flight.
pub async fn with_timeout<F>(limit: Duration, call: F) -> CallOutcome<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(limit, call).await {
        Ok(output) => CallOutcome::Completed(output),
        Err(_) => CallOutcome::TimedOut,
    }
}

/// Uniform random delay in `0..=max`.
pub fn jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=max_ms))
}
