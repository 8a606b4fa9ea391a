//! Hub REST client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Where the hub lives and how to talk to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubRestConfig {
    /// Base URL of the hub, e.g. `http://homeassistant.local:8123`.
    pub url: String,
    /// Long-lived access token.
    pub token: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl HubRestConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for HubRestConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            token: String::new(),
            request_timeout_ms: 5000,
        }
    }
}
