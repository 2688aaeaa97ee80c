//! Retry configuration, delay calculation, and the attempt loop.
//!
//! Each upstream attempt is classified into an [`Attempt`]; the loop in
//! [`with_retry()`] inspects the variant to decide whether to back off and
//! try again. The loop itself only ever returns `Success` or `Exhausted`.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::UpstreamError;
use crate::query::QueryKey;
use crate::telemetry;

/// Configuration for retry behaviour on transient upstream errors.
///
/// Uses exponential backoff with additive uniform jitter:
/// `min(initial_delay * 2^attempt, max_delay) + uniform[0, jitter)`.
///
/// ```rust
/// # use cardseer::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(200))
///     .jitter(Duration::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 1s.
    pub initial_delay: Duration,
    /// Maximum backoff before jitter (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
    /// Upper bound of the random jitter added to each delay.
    /// `Duration::ZERO` disables jitter. Default: 1s.
    pub jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Create a new config with the default backoff schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the jitter bound.
    pub fn jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    ///
    /// Does NOT include jitter; see [`effective_delay()`](Self::effective_delay).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Backoff for `attempt` plus a fresh random jitter.
    pub fn effective_delay(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            rand::thread_rng().gen_range(Duration::ZERO..self.jitter)
        };
        self.delay_for_attempt(attempt) + jitter
    }
}

/// Classified outcome of an upstream attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Success(T),
    /// Failed, but another attempt may succeed.
    Retryable(UpstreamError),
    /// Failed for good: either permanently or with no attempts left.
    Exhausted(UpstreamError),
}

impl<T> Attempt<T> {
    /// Classify the result of a single attempt.
    pub fn classify(result: Result<T, UpstreamError>) -> Self {
        match result {
            Ok(value) => Attempt::Success(value),
            Err(e) if e.is_transient() => Attempt::Retryable(e),
            Err(e) => Attempt::Exhausted(e),
        }
    }

    /// Collapse into a `Result`. A leftover `Retryable` counts as a failure.
    pub fn into_result(self) -> Result<T, UpstreamError> {
        match self {
            Attempt::Success(value) => Ok(value),
            Attempt::Retryable(e) | Attempt::Exhausted(e) => Err(e),
        }
    }
}

/// Run `f` until it succeeds, fails permanently, or attempts run out.
///
/// Sleeps for [`RetryConfig::effective_delay()`] between attempts; there is
/// no sleep after the final attempt. Returns `Success` or `Exhausted`
/// carrying the last observed error.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    key: &QueryKey,
    f: F,
) -> Attempt<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match Attempt::classify(f().await) {
            Attempt::Retryable(e) if attempt + 1 < max_attempts => {
                let delay = config.effective_delay(attempt);
                metrics::counter!(telemetry::RETRIES_TOTAL).increment(1);
                warn!(
                    %key,
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after transient upstream error"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Attempt::Retryable(e) => return Attempt::Exhausted(e),
            terminal => return terminal,
        }
    }
}
