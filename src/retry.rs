//! Backoff policy for 429 responses.
//!
//! Only rate-limited responses are retried. The wait before retry `n`
//! (counting from zero) is `min(2^n, 60)` seconds.

use crate::Config;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// The longest the client will wait between two attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Decides whether and how long to wait before retrying a 429 response.
///
/// # Examples
///
/// ```
/// use fathom::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(true, 3);
/// assert_eq!(policy.delay_for_retry(0), Some(Duration::from_secs(1)));
/// assert_eq!(policy.delay_for_retry(2), Some(Duration::from_secs(4)));
/// assert_eq!(policy.delay_for_retry(3), None);
///
/// assert_eq!(RetryPolicy::new(false, 3).delay_for_retry(0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Whether 429 responses are retried at all.
    pub auto_retry: bool,
    /// How many retries are allowed after the original attempt.
    pub max_retries: u32,
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(auto_retry: bool, max_retries: u32) -> Self {
        Self {
            auto_retry,
            max_retries,
        }
    }

    /// Returns the policy described by a configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.auto_retry, config.max_retries)
    }

    /// Returns the wait before retry number `retry_count` (the original
    /// attempt is `0`), or `None` when no retry is allowed.
    pub fn delay_for_retry(&self, retry_count: u32) -> Option<Duration> {
        if !self.auto_retry || retry_count >= self.max_retries {
            return None;
        }
        Some(backoff(retry_count))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Returns `min(2^retry_count, 60)` seconds.
pub fn backoff(retry_count: u32) -> Duration {
    let seconds = 2u64.saturating_pow(retry_count);
    Duration::from_secs(seconds).min(MAX_BACKOFF)
}

/// Suspends the in-flight call between retries.
///
/// The default [`TokioSleeper`] awaits a tokio timer, which only parks the
/// future that is retrying. Tests substitute an implementation that records
/// the requested durations instead of waiting.
pub trait Sleeper: Send + Sync {
    /// Returns a future that completes after `duration`.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Sleeps with [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(duration))
    }
}
