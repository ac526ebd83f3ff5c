//! Configuration for the tracker and the threshold adapter

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Blend weights for the priority score
///
/// Weights are non-negative and sum to 1.0, which keeps the blended
/// priority inside [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    /// Weight of `success_count / total_uses`
    pub success_rate: f64,

    /// Weight of the running mean relevance
    pub relevance: f64,

    /// Weight of the recency factor
    pub recency: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            success_rate: 0.4,
            relevance: 0.4,
            recency: 0.2,
        }
    }
}

impl PriorityWeights {
    /// Combine the three factors into a priority in [0.0, 1.0]
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_learning::PriorityWeights;
    ///
    /// let w = PriorityWeights::default();
    /// let p = w.blend(1.0, 0.5, 1.0);
    /// assert!((p - 0.8).abs() < 1e-9);
    /// ```
    pub fn blend(&self, success_rate: f64, avg_relevance: f64, recency: f64) -> f64 {
        let priority = self.success_rate * success_rate
            + self.relevance * avg_relevance
            + self.recency * recency;
        priority.clamp(0.0, 1.0)
    }

    /// Check weights are non-negative and sum to 1.0
    pub fn validate(&self) -> Result<(), String> {
        let weights = [self.success_rate, self.relevance, self.recency];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("priority weights must be finite and non-negative".to_string());
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("priority weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }
}

/// Configuration for the source performance tracker
///
/// # Examples
///
/// ```
/// use quarry_learning::TrackerConfig;
///
/// let config = TrackerConfig::default();
/// assert_eq!(config.success_threshold, 0.7);
/// assert_eq!(config.recency_half_life_hours, 168);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Record relevance at or above this counts as a success
    /// Default: 0.7
    pub success_threshold: f64,

    /// Priority blend weights
    /// Default: (0.4, 0.4, 0.2)
    pub weights: PriorityWeights,

    /// Half-life of the recency factor (in hours)
    /// Default: 168 hours (7 days)
    pub recency_half_life_hours: u64,

    /// Priority given to sources with no recorded uses
    /// Default: 0.5
    pub neutral_priority: f64,

    /// Consecutive failures tolerated before failures count against a source
    /// Default: 3
    pub max_consecutive_failures: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            success_threshold: 0.7,
            weights: PriorityWeights::default(),
            recency_half_life_hours: 168,
            neutral_priority: 0.5,
            max_consecutive_failures: 3,
        }
    }
}

impl TrackerConfig {
    /// Exploratory preset: faster decay, more weight on recency, and a
    /// higher starting priority so unexplored sources get tried sooner
    pub fn exploratory() -> Self {
        Self {
            success_threshold: 0.7,
            weights: PriorityWeights {
                success_rate: 0.35,
                relevance: 0.35,
                recency: 0.3,
            },
            recency_half_life_hours: 72,
            neutral_priority: 0.65,
            max_consecutive_failures: 5,
        }
    }

    /// Conservative preset: slow decay, trusts long track records
    pub fn conservative() -> Self {
        Self {
            success_threshold: 0.75,
            weights: PriorityWeights {
                success_rate: 0.45,
                relevance: 0.45,
                recency: 0.1,
            },
            recency_half_life_hours: 720,
            neutral_priority: 0.4,
            max_consecutive_failures: 2,
        }
    }

    /// Recency half-life as a Duration
    pub fn recency_half_life(&self) -> Duration {
        Duration::from_secs(self.recency_half_life_hours * 3600)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.weights.validate()?;
        if !(0.0..=1.0).contains(&self.success_threshold) {
            return Err("success_threshold must be within [0.0, 1.0]".to_string());
        }
        if !(0.0..=1.0).contains(&self.neutral_priority) {
            return Err("neutral_priority must be within [0.0, 1.0]".to_string());
        }
        if self.recency_half_life_hours == 0 {
            return Err("recency_half_life_hours must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Configuration for the confidence threshold adapter
///
/// # Examples
///
/// ```
/// use quarry_learning::ThresholdConfig;
///
/// let config = ThresholdConfig::default();
/// assert_eq!(config.learning_rate, 0.05);
/// assert_eq!((config.min_threshold, config.max_threshold), (0.3, 0.9));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Starting threshold
    /// Default: 0.7
    pub initial_threshold: f64,

    /// Step size toward each observed confidence
    /// Default: 0.05
    pub learning_rate: f64,

    /// Lower clamp
    /// Default: 0.3
    pub min_threshold: f64,

    /// Upper clamp
    /// Default: 0.9
    pub max_threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            initial_threshold: 0.7,
            learning_rate: 0.05,
            min_threshold: 0.3,
            max_threshold: 0.9,
        }
    }
}

impl ThresholdConfig {
    /// Strict preset: demands higher confidence and moves slowly
    pub fn strict() -> Self {
        Self {
            initial_threshold: 0.8,
            learning_rate: 0.02,
            min_threshold: 0.5,
            max_threshold: 0.95,
        }
    }

    /// Relaxed preset: accepts weaker answers and adapts quickly
    pub fn relaxed() -> Self {
        Self {
            initial_threshold: 0.5,
            learning_rate: 0.1,
            min_threshold: 0.2,
            max_threshold: 0.8,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_threshold) || !(0.0..=1.0).contains(&self.max_threshold) {
            return Err("threshold bounds must be within [0.0, 1.0]".to_string());
        }
        if self.min_threshold > self.max_threshold {
            return Err("min_threshold cannot exceed max_threshold".to_string());
        }
        if !(self.min_threshold..=self.max_threshold).contains(&self.initial_threshold) {
            return Err("initial_threshold must lie between min_threshold and max_threshold".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err("learning_rate must be within (0.0, 1.0]".to_string());
        }
        Ok(())
    }
}
