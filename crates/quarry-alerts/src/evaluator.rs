//! Alert classification and deduplication

use crate::{AlertConfig, RecentAlerts};
use quarry_domain::{Alert, AlertReason, AlertState, Fingerprint, ScoredRecord};

/// Classifies records and suppresses repeats inside the cooldown
///
/// # Examples
///
/// ```
/// use quarry_alerts::{AlertConfig, AlertEvaluator, RecentAlerts};
/// use quarry_domain::{AlertReason, ScoredRecord};
///
/// let evaluator = AlertEvaluator::new(AlertConfig::default());
/// let mut recent = RecentAlerts::new(200);
/// let record = ScoredRecord::new("Outage in eu-west", 0.8, 0.9, vec![], 0);
///
/// let first = evaluator.evaluate(&record, Some(true), &mut recent, 1_000);
/// let second = evaluator.evaluate(&record, Some(true), &mut recent, 2_000);
/// assert!(first.triggered);
/// assert!(!second.triggered);
/// assert_eq!(second.reason, AlertReason::Duplicate);
/// ```
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    config: AlertConfig,
}

impl AlertEvaluator {
    /// Create an evaluator
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    /// Get the evaluator configuration
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Urgency classification for a record
    ///
    /// `external` is the classifier's opaque judgment, `None` when no
    /// classifier ran or it failed.
    pub fn classify(&self, record: &ScoredRecord, external: Option<bool>) -> AlertReason {
        let confident = record.confidence_score >= self.config.min_confidence;
        match external {
            Some(true) if confident => AlertReason::Urgent,
            Some(true) => AlertReason::UnverifiedUrgent,
            Some(false) => AlertReason::Routine,
            None if self.config.alert_on_high_signal
                && confident
                && record.relevance_score >= self.config.high_signal_relevance =>
            {
                AlertReason::HighSignal
            }
            None => AlertReason::Routine,
        }
    }

    /// Evaluate one record against the recent-alert window
    ///
    /// Emitted alerts are recorded in `recent`; suppressed ones are not.
    pub fn evaluate(
        &self,
        record: &ScoredRecord,
        external: Option<bool>,
        recent: &mut RecentAlerts,
        now_ms: u64,
    ) -> Alert {
        let classification = self.classify(record, external);
        let fingerprint = Fingerprint::from_parts(&record.query_text, classification.as_str());

        let suppressed = |reason: AlertReason, fingerprint: Fingerprint| Alert {
            triggered: false,
            reason,
            fingerprint,
            timestamp: now_ms,
            record_id: record.id,
            state: AlertState::Suppressed,
        };

        if !is_alertable(classification) {
            tracing::debug!("Record {} is {}, no alert", record.id, classification.as_str());
            return suppressed(classification, fingerprint);
        }

        let cooldown_ms = self.config.cooldown().as_millis() as u64;
        if recent.emitted_within(&fingerprint, now_ms, cooldown_ms) {
            tracing::debug!("Suppressed duplicate alert {}", fingerprint);
            return suppressed(AlertReason::Duplicate, fingerprint);
        }

        recent.record(fingerprint.clone(), now_ms);
        tracing::info!(
            "Alert emitted for record {} ({})",
            record.id,
            classification.as_str()
        );

        Alert {
            triggered: true,
            reason: classification,
            fingerprint,
            timestamp: now_ms,
            record_id: record.id,
            state: AlertState::Emitted,
        }
    }
}

fn is_alertable(reason: AlertReason) -> bool {
    matches!(
        reason,
        AlertReason::Urgent | AlertReason::HighSignal | AlertReason::UnverifiedUrgent
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: u64 = 3_600_000;

    fn record(text: &str, relevance: f64, confidence: f64) -> ScoredRecord {
        ScoredRecord::new(text, relevance, confidence, vec![], 0)
    }

    fn evaluator() -> AlertEvaluator {
        AlertEvaluator::new(AlertConfig::default())
    }

    #[test]
    fn test_classification_table() {
        let e = evaluator();
        assert_eq!(e.classify(&record("q", 0.5, 0.8), Some(true)), AlertReason::Urgent);
        assert_eq!(
            e.classify(&record("q", 0.5, 0.3), Some(true)),
            AlertReason::UnverifiedUrgent
        );
        assert_eq!(e.classify(&record("q", 0.95, 0.8), Some(false)), AlertReason::Routine);
        assert_eq!(e.classify(&record("q", 0.95, 0.8), None), AlertReason::HighSignal);
        assert_eq!(e.classify(&record("q", 0.95, 0.4), None), AlertReason::Routine);
        assert_eq!(e.classify(&record("q", 0.5, 0.9), None), AlertReason::Routine);
    }

    #[test]
    fn test_high_signal_can_be_disabled() {
        let e = AlertEvaluator::new(AlertConfig {
            alert_on_high_signal: false,
            ..Default::default()
        });
        assert_eq!(e.classify(&record("q", 0.95, 0.9), None), AlertReason::Routine);
    }

    #[test]
    fn test_identical_fingerprint_triggers_once_within_cooldown() {
        let e = evaluator();
        let mut recent = RecentAlerts::new(200);

        let a = e.evaluate(&record("Disk  FULL on db-1", 0.5, 0.9), Some(true), &mut recent, 0);
        let b = e.evaluate(&record("disk full on DB-1", 0.5, 0.9), Some(true), &mut recent, 10_000);

        assert_eq!(a.state, AlertState::Emitted);
        assert_eq!(b.state, AlertState::Suppressed);
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!([a.triggered, b.triggered].iter().filter(|t| **t).count(), 1);
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_emits_again_after_cooldown() {
        let e = evaluator();
        let mut recent = RecentAlerts::new(200);
        let r = record("outage", 0.5, 0.9);

        assert!(e.evaluate(&r, Some(true), &mut recent, 0).triggered);
        assert!(e.evaluate(&r, Some(true), &mut recent, HOUR_MS).triggered);
    }

    #[test]
    fn test_different_classification_is_distinct() {
        let e = evaluator();
        let mut recent = RecentAlerts::new(200);

        let urgent = e.evaluate(&record("outage", 0.5, 0.9), Some(true), &mut recent, 0);
        let unverified = e.evaluate(&record("outage", 0.5, 0.2), Some(true), &mut recent, 1);
        assert!(urgent.triggered);
        assert!(unverified.triggered);
        assert_ne!(urgent.fingerprint, unverified.fingerprint);
    }

    #[test]
    fn test_routine_not_remembered() {
        let e = evaluator();
        let mut recent = RecentAlerts::new(200);
        let alert = e.evaluate(&record("weather", 0.3, 0.3), None, &mut recent, 0);

        assert!(!alert.triggered);
        assert_eq!(alert.reason, AlertReason::Routine);
        assert!(recent.is_empty());
    }

    #[test]
    fn test_alert_points_at_record() {
        let e = evaluator();
        let mut recent = RecentAlerts::new(200);
        let r = record("breach", 0.95, 0.95);
        let alert = e.evaluate(&r, None, &mut recent, 42);

        assert_eq!(alert.record_id, r.id);
        assert_eq!(alert.timestamp, 42);
        assert_eq!(alert.fingerprint.as_str(), "breach|high_signal");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: within the cooldown, repeated evaluations trigger at most once
        #[test]
        fn test_at_most_one_trigger_in_cooldown(
            text in "[a-z ]{1,32}",
            offsets in prop::collection::vec(0u64..3_599_999, 1..20),
        ) {
            let e = AlertEvaluator::new(AlertConfig::default());
            let mut recent = RecentAlerts::new(200);
            let record = ScoredRecord::new(text, 0.5, 0.9, vec![], 0);

            let mut sorted = offsets;
            sorted.sort_unstable();
            let triggered = sorted
                .iter()
                .filter(|t| e.evaluate(&record, Some(true), &mut recent, **t).triggered)
                .count();
            prop_assert_eq!(triggered, 1);
        }
    }
}
