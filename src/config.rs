//! Client configuration.
//!
//! A [`Config`] is built once and handed to [`Client`](crate::Client). There
//! is no global state; tests create a fresh `Config` (or call
//! [`Config::reset`]) to start from the defaults.

use crate::{Error, Result};
use std::fmt;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "FATHOM_API_KEY";
/// Environment variable toggling automatic 429 retries.
pub const AUTO_RETRY_ENV: &str = "FATHOM_AUTO_RETRY";
/// Environment variable holding the retry bound.
pub const MAX_RETRIES_ENV: &str = "FATHOM_MAX_RETRIES";
/// Environment variable toggling operational logging.
pub const DEBUG_ENV: &str = "FATHOM_DEBUG";
/// Environment variable toggling request/response tracing.
pub const DEBUG_HTTP_ENV: &str = "FATHOM_DEBUG_HTTP";

/// Settings shared by every request a client makes.
///
/// # Examples
///
/// ```
/// use fathom::Config;
///
/// let config = Config::builder()
///     .api_key("secret")
///     .max_retries(5)
///     .debug(true)
///     .build();
///
/// assert_eq!(config.api_key().unwrap(), "secret");
/// assert!(config.auto_retry);
/// assert_eq!(config.max_retries, 5);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// The key sent as `X-Api-Key`. Calls fail if it is unset or empty.
    pub api_key: Option<String>,

    /// Whether 429 responses are retried with backoff. Defaults to `true`.
    pub auto_retry: bool,

    /// How many times a 429 response is retried. Defaults to `3`.
    pub max_retries: u32,

    /// Emit operational log events (rate limits, retries). Defaults to `false`.
    pub debug: bool,

    /// Emit request/response trace events. Defaults to `false`.
    pub debug_http: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            auto_retry: true,
            max_retries: 3,
            debug: false,
            debug_http: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("auto_retry", &self.auto_retry)
            .field("max_retries", &self.max_retries)
            .field("debug", &self.debug)
            .field("debug_http", &self.debug_http)
            .finish()
    }
}

impl Config {
    /// Creates a default configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Creates a new builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reads the configuration from `FATHOM_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a boolean or the retry bound
    /// cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config {
            api_key: lookup(API_KEY_ENV).filter(|key| !key.is_empty()),
            ..Default::default()
        };

        if let Some(value) = lookup(AUTO_RETRY_ENV) {
            config.auto_retry = parse_bool(AUTO_RETRY_ENV, &value)?;
        }
        if let Some(value) = lookup(MAX_RETRIES_ENV) {
            config.max_retries = value.trim().parse().map_err(|_| {
                Error::Configuration(format!(
                    "{} must be a non-negative integer, got {:?}",
                    MAX_RETRIES_ENV, value
                ))
            })?;
        }
        if let Some(value) = lookup(DEBUG_ENV) {
            config.debug = parse_bool(DEBUG_ENV, &value)?;
        }
        if let Some(value) = lookup(DEBUG_HTTP_ENV) {
            config.debug_http = parse_bool(DEBUG_HTTP_ENV, &value)?;
        }

        Ok(config)
    }

    /// Restores every setting, including the API key, to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns the API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the key is unset or empty.
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::Configuration(
                "api key is not configured".to_string(),
            )),
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Configuration(format!(
            "{} must be a boolean, got {:?}",
            name, value
        ))),
    }
}

/// Builder for [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    auto_retry: Option<bool>,
    max_retries: Option<u32>,
    debug: Option<bool>,
    debug_http: Option<bool>,
}

impl ConfigBuilder {
    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets whether 429 responses are retried.
    pub fn auto_retry(mut self, auto_retry: bool) -> Self {
        self.auto_retry = Some(auto_retry);
        self
    }

    /// Sets how many times a 429 response is retried.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Sets whether operational log events are emitted.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Sets whether request/response trace events are emitted.
    pub fn debug_http(mut self, debug_http: bool) -> Self {
        self.debug_http = Some(debug_http);
        self
    }

    /// Builds the `Config`.
    pub fn build(self) -> Config {
        let default = Config::default();
        Config {
            api_key: self.api_key,
            auto_retry: self.auto_retry.unwrap_or(default.auto_retry),
            max_retries: self.max_retries.unwrap_or(default.max_retries),
            debug: self.debug.unwrap_or(default.debug),
            debug_http: self.debug_http.unwrap_or(default.debug_http),
        }
    }
}
