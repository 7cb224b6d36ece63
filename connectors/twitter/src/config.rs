//! Tap configuration.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TwitterError, TwitterResult};
use crate::track::Tracklist;

/// Number of records printed before disconnecting when nothing else is configured.
pub const DEFAULT_LIMIT: u64 = 100;

/// OAuth 1.0a user-context credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth 1.0a Consumer Key (API Key)
    #[serde(default)]
    pub consumer_key: String,

    /// OAuth 1.0a Consumer Secret (API Secret)
    #[serde(default)]
    pub consumer_secret: String,

    /// OAuth 1.0a Access Token
    #[serde(default)]
    pub access_token: String,

    /// OAuth 1.0a Access Token Secret
    #[serde(default)]
    pub access_token_secret: String,
}

impl Credentials {
    #[must_use]
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }

    /// Check that all four values are present.
    pub fn validate(&self) -> TwitterResult<()> {
        for (field, value) in [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("access_token", &self.access_token),
            ("access_token_secret", &self.access_token_secret),
        ] {
            if value.trim().is_empty() {
                return Err(TwitterError::Config(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &str) -> &'static str {
            if value.is_empty() { "" } else { "[REDACTED]" }
        }

        f.debug_struct("Credentials")
            .field("consumer_key", &redact(&self.consumer_key))
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("access_token", &redact(&self.access_token))
            .field("access_token_secret", &redact(&self.access_token_secret))
            .finish()
    }
}

/// Configuration for one tap run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Stream credentials, flattened into the top-level object
    #[serde(flatten)]
    pub credentials: Credentials,

    /// Base URL for the streaming API (default: https://stream.twitter.com)
    #[serde(default = "default_stream_url")]
    pub stream_url: String,

    /// Keywords to filter on
    #[serde(default)]
    pub tracklist: Tracklist,

    /// Records to print before disconnecting
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_stream_url() -> String {
    "https://stream.twitter.com".into()
}

const fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            stream_url: default_stream_url(),
            tracklist: Tracklist::default(),
            limit: default_limit(),
        }
    }
}

impl TrackerConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> TwitterResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TwitterError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate required fields.
    pub fn validate(&self) -> TwitterResult<()> {
        self.credentials.validate()?;
        if self.stream_url.trim().is_empty() {
            return Err(TwitterError::Config("stream_url is required".into()));
        }
        if self.tracklist.is_empty() {
            return Err(TwitterError::Config(
                "tracklist must contain at least one keyword".into(),
            ));
        }
        Ok(())
    }

    /// Full URL of the statuses filter endpoint.
    #[must_use]
    pub fn filter_url(&self) -> String {
        format!(
            "{}/1.1/statuses/filter.json",
            self.stream_url.trim_end_matches('/')
        )
    }
}
