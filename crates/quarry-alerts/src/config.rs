//! Alert evaluator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for alert classification and deduplication
///
/// # Examples
///
/// ```
/// use quarry_alerts::AlertConfig;
///
/// let config = AlertConfig::default();
/// assert_eq!(config.cooldown_secs, 3600);
/// assert_eq!(config.window_capacity, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Confidence needed for an urgent or high-signal alert
    /// Default: 0.6
    pub min_confidence: f64,

    /// Relevance at which a record alerts without an external judgment
    /// Default: 0.9
    pub high_signal_relevance: f64,

    /// Whether high-signal records alert at all
    /// Default: true
    pub alert_on_high_signal: bool,

    /// Window in which an identical fingerprint is suppressed (in seconds)
    /// Default: 3600 seconds (1 hour)
    pub cooldown_secs: u64,

    /// Maximum remembered fingerprints; the oldest is evicted first
    /// Default: 200
    pub window_capacity: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            high_signal_relevance: 0.9,
            alert_on_high_signal: true,
            cooldown_secs: 3600,
            window_capacity: 200,
        }
    }
}

impl AlertConfig {
    /// Cooldown as a Duration
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err("min_confidence must be within [0.0, 1.0]".to_string());
        }
        if !(0.0..=1.0).contains(&self.high_signal_relevance) {
            return Err("high_signal_relevance must be within [0.0, 1.0]".to_string());
        }
        if self.window_capacity == 0 {
            return Err("window_capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}
