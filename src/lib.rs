//! # Fathom - an async client for the Fathom meeting API
//!
//! Typed access to meetings, recordings, teams, team members and webhooks,
//! built on `reqwest`. Every call is authenticated with an API key,
//! failures map to one [`Error`] variant per status class, rate limit
//! headers are tracked per client, and 429 responses are retried with
//! exponential backoff.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fathom::{Client, Config, QueryParams};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fathom::Error> {
//!     let client = Client::new(Config::from_env()?)?;
//!
//!     // List meetings with their summaries
//!     let mut params = QueryParams::new();
//!     params.insert("include_summary".to_string(), "true".to_string());
//!     for meeting in client.meetings().list(&params).await? {
//!         println!("{:?} (recording {:?})", meeting.get("title"), meeting.recording_id());
//!     }
//!
//!     // Subscribe to new recordings
//!     let webhook = client
//!         .webhooks()
//!         .create(json!({
//!             "destination_url": "https://example.com/fathom",
//!             "include_summary": true,
//!             "triggered_for": ["my_recordings"],
//!         }))
//!         .await?;
//!     println!("Webhook {:?} active: {}", webhook.id(), webhook.is_active());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Rate Limits
//!
//! Each response updates the client's [`RateLimitState`]. When the API
//! answers 429 and [`Config::auto_retry`] is set, the call waits
//! `min(2^n, 60)` seconds before retry `n` (from zero), up to
//! [`Config::max_retries`] times, then fails with [`Error::RateLimited`].
//!
//! ```no_run
//! use fathom::{Client, Config, Error, QueryParams};
//!
//! # async fn example() -> Result<(), Error> {
//! let client = Client::new(Config::builder().api_key("key").auto_retry(false).build())?;
//!
//! match client.teams().list(&QueryParams::new()).await {
//!     Ok(teams) => println!("{} teams, {:?} calls left", teams.len(), client.rate_limit().remaining),
//!     Err(Error::RateLimited { rate_limit, .. }) => {
//!         eprintln!("Slow down; window resets in {:?}s", rate_limit.reset);
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
pub mod metadata;
pub mod rate_limit;
pub mod resource;
pub mod resources;
mod response;
pub mod retry;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, USER_AGENT};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use metadata::{QueryParams, RequestMetadata};
pub use rate_limit::{RateLimitState, RateLimiter};
pub use resource::{ListEndpoint, Resource, ResourceDescriptor, ResourceType, Resources, RetrieveEndpoint};
pub use resources::{Meeting, Recording, Team, TeamMember, Webhook};
pub use response::Response;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
