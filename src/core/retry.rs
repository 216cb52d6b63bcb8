//! Retry logic with exponential backoff
//!
//! Used by the registry HTTP client for transient transport failures.
//! The orchestration layer never retries: local validation errors and
//! registry rejections are surfaced immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Options for retry behavior
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the delay between retries.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

/// Executes operations with exponential backoff on transient failures
///
/// # Examples
///
/// ```no_run
/// use orb_publisher::core::{RetryManager, RetryOptions};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let manager = RetryManager::new(RetryOptions::default());
///     let value = manager
///         .retry(|| async { Ok::<_, anyhow::Error>(42) })
///         .await?;
///     assert_eq!(value, 42);
///     Ok(())
/// }
/// ```
pub struct RetryManager {
    options: RetryOptions,
}

impl RetryManager {
    pub fn new(options: RetryOptions) -> Self {
        Self { options }
    }

    /// Run `operation`, retrying transient failures up to `max_attempts`.
    ///
    /// Non-transient errors are returned immediately without a retry.
    pub async fn retry<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut delay = self.options.initial_delay;
        let mut last_error: Option<E> = None;

        for attempt in 1..=self.options.max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if !self.is_transient_error(&error) {
                        return Err(error);
                    }

                    if attempt >= self.options.max_attempts {
                        return Err(error);
                    }

                    last_error = Some(error);

                    sleep(delay).await;
                    delay = Duration::from_secs_f64(
                        delay.as_secs_f64() * self.options.backoff_multiplier,
                    )
                    .min(self.options.max_delay);
                }
            }
        }

        // Unreachable: the loop always returns on the final attempt.
        Err(last_error.unwrap())
    }

    /// Check whether an error looks like a transient transport failure.
    fn is_transient_error<E: std::fmt::Display>(&self, error: &E) -> bool {
        let message = error.to_string().to_lowercase();

        // Covers reqwest/hyper wording plus raw OS error strings.
        const TRANSIENT_PATTERNS: &[&str] = &[
            "timed out",
            "timeout",
            "connection refused",
            "connection reset",
            "connection closed",
            "error sending request",
            "dns error",
            "network error",
            "temporarily unavailable",
        ];

        TRANSIENT_PATTERNS
            .iter()
            .any(|pattern| message.contains(pattern))
    }
}
