use postsearch_common::{AppConfig, Result, SearchError};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounded retry of a fallible async operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Pause between attempts
    pub delay: Duration,

    /// Also retry `InvalidResponse` (malformed or incomplete upstream data)
    pub retry_invalid_responses: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::ZERO,
            retry_invalid_responses: true,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: config.retry_delay(),
            retry_invalid_responses: config.retry_invalid_responses,
        }
    }

    /// Whether `err` is worth another attempt under this policy.
    ///
    /// Only transient errors qualify; `InvalidResponse` additionally needs
    /// `retry_invalid_responses`.
    pub fn is_retryable(&self, err: &SearchError) -> bool {
        if matches!(err, SearchError::InvalidResponse(_)) {
            return self.retry_invalid_responses;
        }
        err.is_transient()
    }

    /// Run `op` until it succeeds, fails terminally, or the attempts run out.
    ///
    /// `op` receives the 1-based attempt number. Terminal errors are returned
    /// unchanged; exhausting the budget yields `RetriesExhausted` carrying the
    /// last error.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !self.is_retryable(&e) => return Err(e),
                Err(e) if attempt >= max_attempts => {
                    return Err(SearchError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed with {}: retrying",
                        attempt, max_attempts, e
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
