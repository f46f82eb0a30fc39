//! Successful response wrapper.
//!
//! [`Response`] carries the parsed body together with the transport details
//! of the exchange that produced it.

use crate::rate_limit::RateLimitState;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful (200, 201 or 204) response.
///
/// # Examples
///
/// ```no_run
/// use fathom::{Client, Config};
///
/// # async fn example() -> Result<(), fathom::Error> {
/// let client = Client::new(Config::new("api-key"))?;
///
/// let response = client.get("meetings", &Default::default()).await?;
/// println!("Status: {}", response.status);
/// println!("Took {:?} over {} attempt(s)", response.latency, response.attempts);
/// println!("Remaining quota: {:?}", response.rate_limit().remaining);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The parsed response body.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt until this response, including backoff.
    pub latency: Duration,

    /// Number of attempts made; `1` when no 429 retry happened.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Returns `true` if the request was rate limited and retried.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns the rate limit quota reported by this response.
    pub fn rate_limit(&self) -> RateLimitState {
        RateLimitState::from_headers(&self.headers)
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}
