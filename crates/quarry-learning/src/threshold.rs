//! Adaptive confidence threshold

use crate::{LearningError, ThresholdConfig};
use quarry_domain::{Clock, ScoredRecord, SystemClock};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Serializable snapshot of the adapter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCheckpoint {
    /// Threshold at checkpoint time
    pub threshold: f64,

    /// Number of updates applied so far
    pub updates: u64,

    /// When the checkpoint was taken, milliseconds since Unix epoch
    pub saved_at_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct ThresholdState {
    threshold: f64,
    updates: u64,
}

/// Exponential moving average of answer confidence, clamped to bounds
///
/// Answers below the current threshold are considered weak and may get
/// another retrieval round.
///
/// # Examples
///
/// ```
/// use quarry_learning::{ConfidenceThresholdAdapter, ThresholdConfig};
///
/// let adapter = ConfidenceThresholdAdapter::new(ThresholdConfig::default()).unwrap();
/// assert_eq!(adapter.current_threshold().unwrap(), 0.7);
/// assert!(adapter.below_threshold(0.5).unwrap());
/// assert!(!adapter.below_threshold(0.8).unwrap());
/// ```
#[derive(Debug)]
pub struct ConfidenceThresholdAdapter {
    config: ThresholdConfig,
    clock: Arc<dyn Clock>,
    state: RwLock<ThresholdState>,
}

impl ConfidenceThresholdAdapter {
    /// Create an adapter starting at the configured initial threshold
    pub fn new(config: ThresholdConfig) -> Result<Self, LearningError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an adapter with an injected clock
    pub fn with_clock(config: ThresholdConfig, clock: Arc<dyn Clock>) -> Result<Self, LearningError> {
        config.validate().map_err(LearningError::Config)?;
        let state = ThresholdState {
            threshold: config.initial_threshold,
            updates: 0,
        };
        Ok(Self {
            config,
            clock,
            state: RwLock::new(state),
        })
    }

    /// Get the adapter configuration
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Current threshold
    pub fn current_threshold(&self) -> Result<f64, LearningError> {
        Ok(self.read()?.threshold)
    }

    /// Number of updates applied
    pub fn updates(&self) -> Result<u64, LearningError> {
        Ok(self.read()?.updates)
    }

    /// Move the threshold toward the record's confidence
    ///
    /// Returns the new threshold.
    pub fn update(&self, record: &ScoredRecord) -> Result<f64, LearningError> {
        self.observe(record.confidence_score)
    }

    /// Move the threshold toward an observed confidence
    pub fn observe(&self, confidence: f64) -> Result<f64, LearningError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(LearningError::InvalidInput(format!(
                "confidence must be within [0.0, 1.0], got {}",
                confidence
            )));
        }

        let mut state = self.write()?;
        let previous = state.threshold;
        let next = previous + self.config.learning_rate * (confidence - previous);
        state.threshold = next.clamp(self.config.min_threshold, self.config.max_threshold);
        state.updates += 1;

        tracing::debug!(
            "Threshold {:.4} -> {:.4} after confidence {:.3}",
            previous,
            state.threshold,
            confidence
        );
        Ok(state.threshold)
    }

    /// Whether the record's answer falls short of the threshold
    pub fn should_retry(&self, record: &ScoredRecord) -> Result<bool, LearningError> {
        self.below_threshold(record.confidence_score)
    }

    /// Whether a confidence falls short, before any record exists
    pub fn below_threshold(&self, confidence: f64) -> Result<bool, LearningError> {
        Ok(confidence < self.current_threshold()?)
    }

    /// Snapshot the current state
    pub fn checkpoint(&self) -> Result<ThresholdCheckpoint, LearningError> {
        let state = self.read()?;
        Ok(ThresholdCheckpoint {
            threshold: state.threshold,
            updates: state.updates,
            saved_at_ms: self.clock.now_millis(),
        })
    }

    /// Restore from a checkpoint
    ///
    /// The restored threshold is clamped to this adapter's bounds, so a
    /// checkpoint taken under a looser configuration stays usable.
    pub fn restore(&self, checkpoint: &ThresholdCheckpoint) -> Result<(), LearningError> {
        if !checkpoint.threshold.is_finite() {
            return Err(LearningError::InvalidInput(
                "checkpoint threshold is not a finite number".to_string(),
            ));
        }

        let mut state = self.write()?;
        state.threshold = checkpoint
            .threshold
            .clamp(self.config.min_threshold, self.config.max_threshold);
        state.updates = checkpoint.updates;

        tracing::info!(
            "Restored confidence threshold {:.4} ({} updates)",
            state.threshold,
            state.updates
        );
        Ok(())
    }

    /// Write a checkpoint as JSON to `path`
    pub fn save_to(&self, path: &Path) -> Result<ThresholdCheckpoint, LearningError> {
        let checkpoint = self.checkpoint()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&checkpoint)?;
        std::fs::write(path, json)?;
        tracing::debug!("Saved threshold checkpoint to {}", path.display());
        Ok(checkpoint)
    }

    /// Restore from a JSON checkpoint at `path`
    ///
    /// Returns `Ok(false)` when no checkpoint exists yet.
    pub fn load_from(&self, path: &Path) -> Result<bool, LearningError> {
        if !path.exists() {
            tracing::debug!("No threshold checkpoint at {}", path.display());
            return Ok(false);
        }
        let json = std::fs::read_to_string(path)?;
        let checkpoint: ThresholdCheckpoint = serde_json::from_str(&json)?;
        self.restore(&checkpoint)?;
        Ok(true)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, ThresholdState>, LearningError> {
        self.state.read().map_err(|_| LearningError::Poisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, ThresholdState>, LearningError> {
        self.state.write().map_err(|_| LearningError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_domain::ManualClock;
    use tempfile::TempDir;

    fn adapter() -> ConfidenceThresholdAdapter {
        ConfidenceThresholdAdapter::with_clock(ThresholdConfig::default(), Arc::new(ManualClock::new(42)))
            .unwrap()
    }

    #[test]
    fn test_starts_at_initial_threshold() {
        let adapter = adapter();
        assert_eq!(adapter.current_threshold().unwrap(), 0.7);
        assert_eq!(adapter.updates().unwrap(), 0);
    }

    #[test]
    fn test_single_update() {
        let adapter = adapter();
        let next = adapter.observe(0.9).unwrap();
        // 0.7 + 0.05 * (0.9 - 0.7)
        assert!((next - 0.71).abs() < 1e-9);
        assert_eq!(adapter.updates().unwrap(), 1);
    }

    #[test]
    fn test_update_from_record() {
        let adapter = adapter();
        let record = ScoredRecord::new("q", 0.5, 0.3, vec![], 1);
        let next = adapter.update(&record).unwrap();
        assert!((next - 0.68).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_at_upper_bound() {
        let adapter = adapter();
        for _ in 0..500 {
            adapter.observe(1.0).unwrap();
        }
        assert_eq!(adapter.current_threshold().unwrap(), 0.9);
    }

    #[test]
    fn test_clamped_at_lower_bound() {
        let adapter = adapter();
        for _ in 0..500 {
            adapter.observe(0.0).unwrap();
        }
        assert_eq!(adapter.current_threshold().unwrap(), 0.3);
    }

    #[test]
    fn test_rejects_invalid_confidence() {
        let adapter = adapter();
        assert!(adapter.observe(f64::NAN).is_err());
        assert!(adapter.observe(-0.1).is_err());
        assert_eq!(adapter.updates().unwrap(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ThresholdConfig {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            ConfidenceThresholdAdapter::new(config),
            Err(LearningError::Config(_))
        ));
    }

    #[test]
    fn test_below_threshold_boundary() {
        let adapter = adapter();
        assert!(!adapter.below_threshold(0.7).unwrap());
        assert!(adapter.below_threshold(0.69).unwrap());
    }

    #[test]
    fn test_should_retry_record() {
        let adapter = adapter();
        let weak = ScoredRecord::new("q", 0.9, 0.5, vec![], 1);
        let strong = ScoredRecord::new("q", 0.2, 0.7, vec![], 2);
        assert!(adapter.should_retry(&weak).unwrap());
        assert!(!adapter.should_retry(&strong).unwrap());
    }

    #[test]
    fn test_checkpoint_restore_clamps() {
        let adapter = adapter();
        adapter
            .restore(&ThresholdCheckpoint {
                threshold: 0.99,
                updates: 12,
                saved_at_ms: 0,
            })
            .unwrap();
        assert_eq!(adapter.current_threshold().unwrap(), 0.9);
        assert_eq!(adapter.updates().unwrap(), 12);

        let checkpoint = adapter.checkpoint().unwrap();
        assert_eq!(checkpoint.saved_at_ms, 42);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("threshold.json");

        let original = adapter();
        original.observe(0.2).unwrap();
        original.observe(0.2).unwrap();
        let saved = original.save_to(&path).unwrap();

        let restored = adapter();
        assert!(restored.load_from(&path).unwrap());
        assert!((restored.current_threshold().unwrap() - saved.threshold).abs() < 1e-12);
        assert_eq!(restored.updates().unwrap(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let adapter = adapter();
        assert!(!adapter.load_from(&dir.path().join("absent.json")).unwrap());
        assert_eq!(adapter.current_threshold().unwrap(), 0.7);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("threshold.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            adapter().load_from(&path),
            Err(LearningError::Serialization(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: threshold stays inside its bounds for any confidence sequence
        #[test]
        fn test_threshold_stays_bounded(
            confidences in prop::collection::vec(0.0f64..=1.0, 10_000)
        ) {
            let adapter = ConfidenceThresholdAdapter::new(ThresholdConfig::default()).unwrap();
            for c in confidences {
                let t = adapter.observe(c).unwrap();
                prop_assert!((0.3..=0.9).contains(&t));
            }
        }
    }
}
