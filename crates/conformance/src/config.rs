//! Harness configuration

use std::time::Duration;

/// Connection settings shared by every request the engine makes
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the target server
    pub base_url: String,

    /// Bounded connect/read timeout for each request
    pub timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4567".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl HarnessConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
