//! Error types for Fathom API calls.
//!
//! Every HTTP failure maps to exactly one [`Error`] variant chosen by status
//! code. Those variants keep the status, the extracted message, the raw
//! response body and the response headers so callers can inspect what the
//! server actually said.

use crate::rate_limit::RateLimitState;
use http::{HeaderMap, StatusCode};

/// The error type for every fallible operation in this crate.
///
/// # Examples
///
/// ```no_run
/// use fathom::{Client, Config, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new(Config::new("api-key"))?;
///
/// match client.meetings().list(&Default::default()).await {
///     Ok(meetings) => println!("{} meetings", meetings.len()),
///     Err(Error::RateLimited { rate_limit, .. }) => {
///         eprintln!("Rate limited, resets in {:?}s", rate_limit.reset);
///     }
///     Err(Error::Authentication { message, .. }) => eprintln!("Bad API key: {}", message),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The client is not usable as configured (missing API key, invalid URL).
    ///
    /// Raised before any request is sent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The server rejected the request as malformed (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the response body
        message: String,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: Box<HeaderMap>,
    },

    /// The API key was missing or rejected (401).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the response body
        message: String,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: Box<HeaderMap>,
    },

    /// The API key is not allowed to perform this request (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the response body
        message: String,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: Box<HeaderMap>,
    },

    /// The requested entity does not exist (404).
    #[error("Not found: {message}")]
    NotFound {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the response body
        message: String,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: Box<HeaderMap>,
    },

    /// The server answered 429 and no retry was left (or auto-retry is off).
    ///
    /// `rate_limit` is parsed from the 429 response's own headers.
    #[error("Rate limited: {message}")]
    RateLimited {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the response body
        message: String,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: Box<HeaderMap>,
        /// Quota reported by the 429 response
        rate_limit: RateLimitState,
    },

    /// The server failed to handle the request (5xx).
    #[error("Server error: {message}")]
    Server {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the response body
        message: String,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: Box<HeaderMap>,
    },

    /// Any status the client does not otherwise handle.
    #[error("Unexpected response {status}: {message}")]
    Unexpected {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the response body
        message: String,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: Box<HeaderMap>,
    },

    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The operation is not offered for this resource. No request was sent.
    #[error("{0}")]
    Unsupported(String),

    /// A dynamic attribute read named a key the entity does not have.
    #[error("No such attribute: {0}")]
    UnknownAttribute(String),
}

impl Error {
    /// Builds the error for a non-success status other than 429.
    pub(crate) fn from_status(
        status: StatusCode,
        message: String,
        raw_response: String,
        headers: HeaderMap,
    ) -> Self {
        let headers = Box::new(headers);
        match status.as_u16() {
            400 => Error::BadRequest {
                status,
                message,
                raw_response,
                headers,
            },
            401 => Error::Authentication {
                status,
                message,
                raw_response,
                headers,
            },
            403 => Error::Forbidden {
                status,
                message,
                raw_response,
                headers,
            },
            404 => Error::NotFound {
                status,
                message,
                raw_response,
                headers,
            },
            500..=599 => Error::Server {
                status,
                message,
                raw_response,
                headers,
            },
            _ => Error::Unexpected {
                status,
                message,
                raw_response,
                headers,
            },
        }
    }

    /// Returns `true` if repeating the same request could succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// use fathom::Error;
    ///
    /// assert!(!Error::Configuration("missing key".into()).is_retryable());
    /// assert!(!Error::Unsupported("no list endpoint".into()).is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RateLimited { .. } | Error::Server { .. } | Error::Transport(_)
        )
    }

    /// Returns the HTTP status code for errors produced by a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::BadRequest { status, .. }
            | Error::Authentication { status, .. }
            | Error::Forbidden { status, .. }
            | Error::NotFound { status, .. }
            | Error::RateLimited { status, .. }
            | Error::Server { status, .. }
            | Error::Unexpected { status, .. } => Some(*status),
            Error::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the message extracted from the error response body.
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::BadRequest { message, .. }
            | Error::Authentication { message, .. }
            | Error::Forbidden { message, .. }
            | Error::NotFound { message, .. }
            | Error::RateLimited { message, .. }
            | Error::Server { message, .. }
            | Error::Unexpected { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns the raw response body for errors produced by a response.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::BadRequest { raw_response, .. }
            | Error::Authentication { raw_response, .. }
            | Error::Forbidden { raw_response, .. }
            | Error::NotFound { raw_response, .. }
            | Error::RateLimited { raw_response, .. }
            | Error::Server { raw_response, .. }
            | Error::Unexpected { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the response headers for errors produced by a response.
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Error::BadRequest { headers, .. }
            | Error::Authentication { headers, .. }
            | Error::Forbidden { headers, .. }
            | Error::NotFound { headers, .. }
            | Error::RateLimited { headers, .. }
            | Error::Server { headers, .. }
            | Error::Unexpected { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// Returns the quota reported by a 429 response.
    pub fn rate_limit(&self) -> Option<&RateLimitState> {
        match self {
            Error::RateLimited { rate_limit, .. } => Some(rate_limit),
            _ => None,
        }
    }
}

/// A specialized `Result` type for Fathom API calls.
pub type Result<T> = std::result::Result<T, Error>;
