use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Default Runway API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.dev.runwayml.com/v1";

/// Runway API version sent in the `X-Runway-Version` header
pub const DEFAULT_API_VERSION: &str = "2024-11-06";

/// Model used when a request does not name one
pub const DEFAULT_MODEL: &str = "gen4_image";

/// Aspect ratio used when a request does not name one
pub const DEFAULT_RATIO: &str = "1024:1024";

/// Runway text-to-image backend configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RunwayConfig {
    /// API secret; falls back to the environment when unset
    pub api_key: Option<SecretString>,
    /// Base URL override, mostly useful for tests
    pub base_url: String,
    /// Value of the `X-Runway-Version` header
    pub api_version: String,
    /// Delay between task status polls (e.g. "5s")
    pub poll_interval: String,
    /// Ceiling on how long a single task is awaited (e.g. "10m")
    pub max_wait: String,
    /// Timeout applied to each individual HTTP call
    pub request_timeout: String,
    /// Model used when the client omits one
    pub default_model: String,
    /// Ratio used when the client omits one
    pub default_ratio: String,
}

impl Default for RunwayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            poll_interval: "5s".to_string(),
            max_wait: "10m".to_string(),
            request_timeout: "60s".to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_ratio: DEFAULT_RATIO.to_string(),
        }
    }
}

impl RunwayConfig {
    /// The configured credential, treating an empty value as missing
    pub fn credential(&self) -> Option<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }

    /// Parsed [`Self::poll_interval`]
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration
    pub fn poll_interval(&self) -> anyhow::Result<Duration> {
        parse_duration("runway.poll_interval", &self.poll_interval)
    }

    /// Parsed [`Self::max_wait`]
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration
    pub fn max_wait(&self) -> anyhow::Result<Duration> {
        parse_duration("runway.max_wait", &self.max_wait)
    }

    /// Parsed [`Self::request_timeout`]
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration
    pub fn request_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("runway.request_timeout", &self.request_timeout)
    }
}

fn parse_duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{value}': {e}"))
}

/// Whether `ratio` has the `<width>:<height>` shape with positive integers
pub fn is_valid_ratio(ratio: &str) -> bool {
    ratio
        .split_once(':')
        .is_some_and(|(w, h)| [w, h].iter().all(|side| side.parse::<u32>().is_ok_and(|n| n > 0)))
}
