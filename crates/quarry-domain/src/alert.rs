//! Alert values produced by the alert evaluator

use crate::RecordId;
use std::fmt;

/// Normalized key used to deduplicate semantically similar alerts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Build a fingerprint from query text and a classification tag
    ///
    /// The text is case-folded and runs of whitespace collapse to a
    /// single space.
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::Fingerprint;
    ///
    /// let a = Fingerprint::from_parts("  Outage in\tEU-West ", "urgent");
    /// let b = Fingerprint::from_parts("outage in eu-west", "urgent");
    /// assert_eq!(a, b);
    /// ```
    pub fn from_parts(text: &str, tag: &str) -> Self {
        Self(format!("{}|{}", normalize_text(text), tag))
    }

    /// The normalized string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case-fold and collapse whitespace
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Why an alert did or did not fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertReason {
    /// External classifier flagged the result and it is well supported
    Urgent,

    /// Strong relevance and confidence without an external judgment
    HighSignal,

    /// External classifier flagged the result but confidence is weak
    UnverifiedUrgent,

    /// Nothing worth alerting on
    Routine,

    /// Same fingerprint already emitted inside the cooldown
    Duplicate,
}

impl AlertReason {
    /// Short classification tag
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertReason::Urgent => "urgent",
            AlertReason::HighSignal => "high_signal",
            AlertReason::UnverifiedUrgent => "unverified_urgent",
            AlertReason::Routine => "routine",
            AlertReason::Duplicate => "duplicate",
        }
    }
}

/// Terminal state of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    /// No alert sent
    Suppressed,
    /// Alert sent and remembered for dedup
    Emitted,
}

/// Result of one alert evaluation
///
/// Alerts point at the record that produced them but do not own it.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Whether an alert was emitted
    pub triggered: bool,

    /// Classification tag
    pub reason: AlertReason,

    /// Dedup key
    pub fingerprint: Fingerprint,

    /// Evaluation time, milliseconds since Unix epoch
    pub timestamp: u64,

    /// Record that was evaluated
    pub record_id: RecordId,

    /// Final state of the evaluation
    pub state: AlertState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello   WORLD\n"), "hello world");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_fingerprint_includes_tag() {
        let a = Fingerprint::from_parts("disk full", "urgent");
        let b = Fingerprint::from_parts("disk full", "high_signal");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "disk full|urgent");
    }

    #[test]
    fn test_reason_tags() {
        assert_eq!(AlertReason::Duplicate.as_str(), "duplicate");
        assert_eq!(AlertReason::HighSignal.as_str(), "high_signal");
    }
}
