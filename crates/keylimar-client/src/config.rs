//! # Client Configuration
//!
//! Configuration for the API client and session manager.
//!
//! ## Configuration Sources
//! 1. Explicit values passed to [`ClientConfig::from_env_or`]
//! 2. Environment variables (`KEYLIMAR_API_URL`)
//! 3. Defaults (production backend URL, 240 s ping interval)

use std::time::Duration;
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "https://api.abastokeylimar.com/api/";

/// How often the keep-alive task checks expiry and pings the backend.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(240);

/// Configuration for [`crate::ApiClient`] and [`crate::SessionManager`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; always ends with a slash so relative joins work.
    pub base_url: Url,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Connection establishment timeout.
    pub connect_timeout: Duration,

    /// Keep-alive ping interval while a session is active.
    pub ping_interval: Duration,

    /// Maximum automatic retries for idempotent GETs (mutations never retry).
    pub max_retries: u32,

    /// Initial backoff between retries (doubles per attempt).
    pub initial_backoff: Duration,

    /// Backoff ceiling.
    pub max_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: Url::parse(DEFAULT_API_URL).expect("default URL is valid"),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            ping_interval: DEFAULT_PING_INTERVAL,
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Creates a config from an explicit base URL, falling back to the
    /// `KEYLIMAR_API_URL` environment variable, then the default.
    pub fn from_env_or(base_url: Option<String>) -> ApiResult<Self> {
        let raw = base_url
            .or_else(|| std::env::var("KEYLIMAR_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::with_base_url(&raw)
    }

    /// Creates a config with the given base URL and default timings.
    pub fn with_base_url(raw: &str) -> ApiResult<Self> {
        // A missing trailing slash would make Url::join drop the last path
        // segment, so normalize here once.
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };
        let base_url = Url::parse(&normalized)?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                base_url.scheme()
            )));
        }

        Ok(ClientConfig {
            base_url,
            ..Default::default()
        })
    }

    /// Resolves a relative endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> ApiResult<Url> {
        // Endpoint paths are relative ("sales/") so they append to the base
        // rather than replacing its path.
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}
