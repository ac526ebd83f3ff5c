//! Configuration for the metrics engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the metrics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Records per trend window
    /// Default: 10
    pub trend_window: usize,

    /// Sources listed in a snapshot
    /// Default: 5
    pub top_k: usize,

    /// Lifetime of cached source figures (in seconds)
    /// Default: 300 seconds (5 minutes)
    pub cache_ttl_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            trend_window: 10,
            top_k: 5,
            cache_ttl_secs: 300,
        }
    }
}

impl MetricsConfig {
    /// Cache lifetime as a Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.trend_window == 0 {
            return Err("trend_window must be greater than 0".to_string());
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        Ok(())
    }
}
