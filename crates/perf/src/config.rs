//! Harness configuration

use std::time::Duration;

/// Settings for one experiment run
#[derive(Debug, Clone)]
pub struct PerfConfig {
    /// Base URL of the target server
    pub base_url: String,

    /// Bounded timeout for each batch request
    pub request_timeout: Duration,

    /// Resource sampler tick
    pub sample_interval: Duration,

    /// Object counts per experiment
    pub load_levels: Vec<usize>,

    /// Pause between experiments so measurements don't bleed into each other
    pub cooldown: Duration,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4567".to_string(),
            request_timeout: Duration::from_secs(5),
            sample_interval: Duration::from_millis(100),
            load_levels: vec![10, 100, 500, 1000],
            cooldown: Duration::from_secs(1),
        }
    }
}

impl PerfConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
