//! Bounded retries for data source calls.

use funnelwatch_core::FunnelError;
use std::future::Future;

/// How many times a failed fetch is retried.
///
/// A fetch runs at most `1 + max_retries` times. There is no delay between
/// attempts; every attempt already pays the endpoint's latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `fetch` until it succeeds or the attempts are spent.
    pub async fn run<T, F, Fut>(&self, what: &'static str, mut fetch: F) -> Result<T, FunnelError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FunnelError>>,
    {
        let attempts = self.max_attempts();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match fetch().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(what, attempt, "fetch recovered after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(what, attempt, attempts, error = %e, "fetch attempt failed");
                    last_error = e.to_string();
                }
            }
        }

        tracing::error!(what, attempts, "fetch failed, retries exhausted");
        Err(FunnelError::FetchFailed {
            what,
            attempts,
            reason: last_error,
        })
    }
}
