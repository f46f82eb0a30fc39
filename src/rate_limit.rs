//! Rate limit tracking from `RateLimit-*` response headers.
//!
//! Every response the API sends carries its current quota in three headers.
//! [`RateLimitState`] is one parsed snapshot of them; [`RateLimiter`] holds the
//! latest snapshot for a client.

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

const LIMIT_HEADER: &str = "ratelimit-limit";
const REMAINING_HEADER: &str = "ratelimit-remaining";
const RESET_HEADER: &str = "ratelimit-reset";

/// The last known rate limit quota.
///
/// Fields are `None` when the corresponding header was absent or not an
/// integer on the response the snapshot was taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    /// Requests allowed per window (`RateLimit-Limit`).
    pub limit: Option<u64>,

    /// Requests left in the current window (`RateLimit-Remaining`).
    pub remaining: Option<u64>,

    /// Seconds until the window resets (`RateLimit-Reset`).
    pub reset: Option<u64>,
}

impl RateLimitState {
    /// Parses a snapshot from response headers.
    ///
    /// Header names are matched case-insensitively. When a header is repeated
    /// only its first value is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use fathom::RateLimitState;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("ratelimit-limit", "60".parse().unwrap());
    /// headers.insert("ratelimit-remaining", "45".parse().unwrap());
    ///
    /// let state = RateLimitState::from_headers(&headers);
    /// assert_eq!(state.limit, Some(60));
    /// assert_eq!(state.remaining, Some(45));
    /// assert_eq!(state.reset, None);
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: parse_header(headers, LIMIT_HEADER),
            remaining: parse_header(headers, REMAINING_HEADER),
            reset: parse_header(headers, RESET_HEADER),
        }
    }

    /// Returns `true` if the quota is known to be exhausted.
    pub fn is_rate_limited(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Returns `true` if a caller with the given auto-retry setting should
    /// hold off and retry: auto-retry is on and no requests remain.
    pub fn should_retry(&self, auto_retry: bool) -> bool {
        auto_retry && self.is_rate_limited()
    }

    /// Returns how long to wait for the window to reset, with a one second
    /// buffer. Zero when the reset time is unknown.
    pub fn wait_time(&self) -> Duration {
        match self.reset {
            Some(reset) => Duration::from_secs(reset.saturating_add(1)),
            None => Duration::ZERO,
        }
    }

    /// Returns `true` if no rate limit header was present.
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset.is_none()
    }
}

fn parse_header(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Holds the most recent [`RateLimitState`] observed by a client.
///
/// Each update replaces the whole snapshot. When a client is shared between
/// concurrent calls the last response to finish wins; the snapshot is
/// advisory and nothing in the request path reads it.
#[derive(Debug, Default)]
pub struct RateLimiter {
    state: Mutex<RateLimitState>,
}

impl RateLimiter {
    /// Creates a tracker with no observed headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot with one parsed from `headers` and returns it.
    pub fn update_from_headers(&self, headers: &HeaderMap) -> RateLimitState {
        let state = RateLimitState::from_headers(headers);
        self.replace(state);
        state
    }

    /// Replaces the snapshot.
    pub fn replace(&self, state: RateLimitState) {
        let mut guard = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = state;
    }

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> RateLimitState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
