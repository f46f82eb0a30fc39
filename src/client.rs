//! The request pipeline.
//!
//! [`Client`] builds one authenticated request, sends it, records the rate
//! limit headers, classifies the status code and retries 429 responses with
//! exponential backoff. Use [`ClientBuilder`] to configure it.

use crate::{
    config::Config,
    metadata::{QueryParams, RequestMetadata},
    rate_limit::{RateLimitState, RateLimiter},
    retry::{RetryPolicy, Sleeper, TokioSleeper},
    Error, Response, Result,
};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// The API origin and version prefix.
pub const DEFAULT_BASE_URL: &str = "https://api.fathom.ai/external/v1";

/// The `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("fathom-rust/", env!("CARGO_PKG_VERSION"));

const API_KEY_HEADER: &str = "x-api-key";
const JSON: &str = "application/json";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// A client for the Fathom API.
///
/// Cloning is cheap; clones share the connection pool, the configuration and
/// the rate limit snapshot.
///
/// # Examples
///
/// ```no_run
/// use fathom::{Client, Config, QueryParams};
///
/// # async fn example() -> Result<(), fathom::Error> {
/// let client = Client::new(Config::new("api-key"))?;
///
/// let mut params = QueryParams::new();
/// params.insert("include_summary".to_string(), "true".to_string());
///
/// for meeting in client.meetings().list(&params).await? {
///     println!("{:?}: {:?}", meeting.id(), meeting.get("title"));
/// }
/// println!("Quota left: {:?}", client.rate_limit().remaining);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    config: Config,
    retry_policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    rate_limiter: RateLimiter,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("config", &self.inner.config)
            .field("rate_limit", &self.rate_limit())
            .finish()
    }
}

impl Client {
    /// Creates a client for the public API origin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Creates a new `ClientBuilder`.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns the rate limit snapshot from the most recent response.
    pub fn rate_limit(&self) -> RateLimitState {
        self.inner.rate_limiter.snapshot()
    }

    /// Sends a request and returns its parsed body.
    ///
    /// Successful bodies that are empty or not valid JSON yield an empty
    /// object.
    ///
    /// # Errors
    ///
    /// Returns the [`Error`] variant matching the response status, or
    /// [`Error::Transport`] if no response arrived.
    pub async fn execute(
        &self,
        method: Method,
        path: impl Into<String>,
        query_params: &QueryParams,
        body: Option<Value>,
    ) -> Result<Value> {
        let mut metadata = RequestMetadata::new(method, path)
            .with_query_params(query_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        metadata.body = body;
        Ok(self.call(metadata).await?.data)
    }

    /// Sends a request and returns the parsed body with response details.
    ///
    /// A 429 response is retried while the configuration allows it, waiting
    /// `min(2^n, 60)` seconds before retry `n`. Any other failure status is
    /// returned immediately.
    pub async fn call(&self, metadata: RequestMetadata) -> Result<Response<Value>> {
        let api_key = self.inner.config.api_key()?;
        let url = self.build_url(&metadata)?;
        let body = metadata
            .body_to_send()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| Error::Configuration(format!("Failed to serialize request body: {}", e)))?;

        let start_time = Instant::now();
        let mut retry_count: u32 = 0;

        loop {
            let attempt = retry_count as usize + 1;
            let response = self
                .send(&metadata, &url, api_key, body.as_deref(), attempt)
                .await?;

            let status = response.status();
            let headers = response.headers().clone();
            let raw_body = response.text().await?;
            let latency = start_time.elapsed();

            let rate_limit = self.inner.rate_limiter.update_from_headers(&headers);

            if self.inner.config.debug_http {
                tracing::debug!(
                    status = status.as_u16(),
                    latency_ms = latency.as_millis(),
                    attempt = attempt,
                    body = %raw_body,
                    "Received HTTP response"
                );
            }
            if self.inner.config.debug {
                tracing::info!(
                    limit = ?rate_limit.limit,
                    remaining = ?rate_limit.remaining,
                    reset_secs = ?rate_limit.reset,
                    "Rate limit updated"
                );
            }

            match status.as_u16() {
                200 | 201 => {
                    let data = self.parse_json(&raw_body);
                    return Ok(Response::new(
                        data, raw_body, status, headers, latency, attempt,
                    ));
                }
                204 => {
                    return Ok(Response::new(
                        Value::Object(Map::new()),
                        raw_body,
                        status,
                        headers,
                        latency,
                        attempt,
                    ));
                }
                429 => {
                    if let Some(delay) = self.inner.retry_policy.delay_for_retry(retry_count) {
                        if self.inner.config.debug {
                            tracing::warn!(
                                delay_secs = delay.as_secs(),
                                retry = retry_count + 1,
                                max_retries = self.inner.retry_policy.max_retries,
                                path = %metadata.path,
                                "Rate limited - waiting before retry"
                            );
                        }
                        self.inner.sleeper.sleep(delay).await;
                        retry_count += 1;
                        continue;
                    }

                    return Err(Error::RateLimited {
                        status,
                        message: error_message(status, &raw_body),
                        raw_response: raw_body,
                        headers: Box::new(headers),
                        rate_limit,
                    });
                }
                _ => {
                    let message = error_message(status, &raw_body);
                    if self.inner.config.debug {
                        tracing::warn!(
                            status = status.as_u16(),
                            method = %metadata.method,
                            path = %metadata.path,
                            message = %message,
                            "Request failed"
                        );
                    }
                    return Err(Error::from_status(status, message, raw_body, headers));
                }
            }
        }
    }

    fn build_url(&self, metadata: &RequestMetadata) -> Result<Url> {
        let raw = format!("{}{}", self.inner.base_url, metadata.normalized_path());
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::Configuration(format!("Invalid request URL {}: {}", raw, e)))?;

        if !metadata.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &metadata.query_params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Executes a single attempt.
    async fn send(
        &self,
        metadata: &RequestMetadata,
        url: &Url,
        api_key: &str,
        body: Option<&[u8]>,
        attempt: usize,
    ) -> Result<reqwest::Response> {
        if self.inner.config.debug_http {
            tracing::debug!(
                method = %metadata.method,
                url = %url,
                attempt = attempt,
                "Executing HTTP request"
            );
        }

        let mut request = self
            .inner
            .http_client
            .request(metadata.method.clone(), url.clone())
            .header(API_KEY_HEADER, api_key)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);

        if let Some(body) = body {
            if self.inner.config.debug_http {
                tracing::debug!(body = %String::from_utf8_lossy(body), "Request body");
            }
            request = request.body(body.to_vec());
        }

        let response = request.send().await?;
        Ok(response)
    }

    fn parse_json(&self, raw_body: &str) -> Value {
        if raw_body.trim().is_empty() {
            return Value::Object(Map::new());
        }

        match serde_json::from_str(raw_body) {
            Ok(value) => value,
            Err(e) => {
                if self.inner.config.debug {
                    tracing::warn!(error = %e, "Failed to parse JSON response body");
                }
                Value::Object(Map::new())
            }
        }
    }

    /// Makes a GET request.
    pub async fn get(
        &self,
        path: impl Into<String>,
        query_params: &QueryParams,
    ) -> Result<Response<Value>> {
        let metadata = RequestMetadata::new(Method::GET, path)
            .with_query_params(query_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.call(metadata).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post(&self, path: impl Into<String>, body: Value) -> Result<Response<Value>> {
        self.call(RequestMetadata::new(Method::POST, path).with_body(body))
            .await
    }

    /// Makes a PUT request with a JSON body.
    pub async fn put(&self, path: impl Into<String>, body: Value) -> Result<Response<Value>> {
        self.call(RequestMetadata::new(Method::PUT, path).with_body(body))
            .await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch(&self, path: impl Into<String>, body: Value) -> Result<Response<Value>> {
        self.call(RequestMetadata::new(Method::PATCH, path).with_body(body))
            .await
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, path: impl Into<String>) -> Result<Response<Value>> {
        self.call(RequestMetadata::new(Method::DELETE, path)).await
    }
}

/// Picks the human readable message for an error response.
///
/// Uses the body's `error` field, then its `message` field, and otherwise
/// `HTTP <code>: <reason>`.
fn error_message(status: StatusCode, raw_body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(raw_body)
        .ok()
        .and_then(|body| {
            let object = body.as_object()?;
            ["error", "message"]
                .iter()
                .filter_map(|key| object.get(*key))
                .find(|value| !value.is_null())
                .map(|value| match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
        });

    from_body.unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    })
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use fathom::{Client, Config};
///
/// # fn example() -> Result<(), fathom::Error> {
/// let client = Client::builder()
///     .config(Config::builder().api_key("api-key").max_retries(5).build())
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: Config,
    base_url: Option<String>,
    sleeper: Arc<dyn Sleeper>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            base_url: None,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the API key, keeping the rest of the configuration.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Overrides the API origin and prefix, e.g. for a local test server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();
        Url::parse(url)
            .map_err(|e| Error::Configuration(format!("Invalid base URL {}: {}", url, e)))?;
        self.base_url = Some(url.trim_end_matches('/').to_string());
        Ok(self)
    }

    /// Replaces how the client waits between 429 retries.
    pub fn sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// A missing API key is not an error here; every call reports it instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<Client> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                Error::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        let retry_policy = RetryPolicy::from_config(&self.config);

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                config: self.config,
                retry_policy,
                sleeper: self.sleeper,
                rate_limiter: RateLimiter::new(),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
