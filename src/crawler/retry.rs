//! Retry-with-backoff shared by page fetches and document downloads

use crate::config::HttpConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How many times to try one URL and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Linear backoff unit: after attempt `n` the delay is `n * base_delay`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_base_delay_ms),
        )
    }

    /// Delay slept after the given (1-based) failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the attempt budget is spent
///
/// `operation` receives the 1-based attempt number. `is_retryable` decides
/// whether an error is transient. The last error is returned on exhaustion.
///
/// # Example
///
/// ```
/// use scoped_harvest::crawler::{retry_with_backoff, RetryPolicy};
/// use std::time::Duration;
///
/// # async fn example() {
/// let policy = RetryPolicy::new(3, Duration::from_millis(1));
/// let result: Result<u32, String> =
///     retry_with_backoff(&policy, "demo", |_e: &String| true, |attempt| async move {
///         if attempt < 3 { Err(format!("attempt {} failed", attempt)) } else { Ok(attempt) }
///     })
///     .await;
/// assert_eq!(result, Ok(3));
/// # }
/// ```
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.max_attempts && is_retryable(&error) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}",
                    label,
                    attempt,
                    policy.max_attempts,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                tracing::debug!("{}: giving up after attempt {}: {}", label, attempt, error);
                return Err(error);
            }
        }
    }
}
