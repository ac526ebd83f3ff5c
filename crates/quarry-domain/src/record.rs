//! Scored records - one per processed query

use crate::ValidationError;
use std::fmt;

/// Unique identifier for a record based on UUIDv7
///
/// UUIDv7 ids sort by creation time, so they double as a tiebreaker
/// for records created in the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u128);

impl RecordId {
    /// Generate a new UUIDv7-based RecordId
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RecordId from a raw u128 value
    ///
    /// Used by the storage layer when reading rows back.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RecordId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUID string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// One source consulted while answering a query
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUsage {
    /// Tool/source identifier
    pub source_id: String,

    /// Wall time of the tool call in milliseconds
    pub latency_ms: u64,

    /// Whether this source contributed to a high-relevance answer
    pub contributed_to_high_relevance: bool,
}

impl SourceUsage {
    /// Create a new source usage entry
    pub fn new(source_id: impl Into<String>, latency_ms: u64, contributed: bool) -> Self {
        Self {
            source_id: source_id.into(),
            latency_ms,
            contributed_to_high_relevance: contributed,
        }
    }
}

/// Outcome of one processed query
///
/// Records are immutable once appended; the store never updates them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    /// Unique identifier
    pub id: RecordId,

    /// Creation time, milliseconds since Unix epoch
    pub timestamp: u64,

    /// The input query
    pub query_text: String,

    /// How well the answer addresses the query [0.0, 1.0]
    pub relevance_score: f64,

    /// Synthesizer's confidence in its answer [0.0, 1.0]
    pub confidence_score: f64,

    /// Sources consulted, in the order they were ranked
    pub sources_used: Vec<SourceUsage>,

    /// Optional grouping key
    pub session_id: Option<String>,
}

impl ScoredRecord {
    /// Create a new record with a fresh id
    pub fn new(
        query_text: impl Into<String>,
        relevance_score: f64,
        confidence_score: f64,
        sources_used: Vec<SourceUsage>,
        timestamp: u64,
    ) -> Self {
        Self {
            id: RecordId::new(),
            timestamp,
            query_text: query_text.into(),
            relevance_score,
            confidence_score,
            sources_used,
            session_id: None,
        }
    }

    /// Attach a session id
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Check scores and required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.query_text.trim().is_empty() {
            return Err(ValidationError::MissingField("query_text"));
        }

        check_score("relevance_score", self.relevance_score)?;
        check_score("confidence_score", self.confidence_score)?;

        for (position, usage) in self.sources_used.iter().enumerate() {
            if usage.source_id.trim().is_empty() {
                return Err(ValidationError::InvalidSource {
                    position,
                    reason: "source_id is empty".to_string(),
                });
            }
        }

        if let Some(session) = &self.session_id {
            if session.trim().is_empty() {
                return Err(ValidationError::MissingField("session_id"));
            }
        }

        Ok(())
    }
}

fn check_score(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ScoreOutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(relevance: f64, confidence: f64) -> ScoredRecord {
        ScoredRecord::new(
            "what is rust",
            relevance,
            confidence,
            vec![SourceUsage::new("web", 120, true)],
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_record_id_display_and_parse() {
        let id = RecordId::new();
        let id_str = id.to_string();
        assert_eq!(id_str.len(), 36);

        let parsed = RecordId::from_string(&id_str).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_record_id_invalid_string() {
        assert!(RecordId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_record_ids_are_ordered() {
        let id1 = RecordId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = RecordId::new();
        assert!(id1 < id2);
    }

    #[test]
    fn test_valid_record() {
        assert!(record(0.8, 0.6).validate().is_ok());
        assert!(record(0.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_score_out_of_range() {
        let err = record(1.2, 0.5).validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ScoreOutOfRange { field: "relevance_score", .. }
        ));

        let err = record(0.5, -0.1).validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ScoreOutOfRange { field: "confidence_score", .. }
        ));
    }

    #[test]
    fn test_nan_score_rejected() {
        assert!(record(f64::NAN, 0.5).validate().is_err());
    }

    #[test]
    fn test_empty_query_rejected() {
        let mut r = record(0.5, 0.5);
        r.query_text = "   ".to_string();
        assert_eq!(
            r.validate().unwrap_err(),
            ValidationError::MissingField("query_text")
        );
    }

    #[test]
    fn test_empty_source_id_rejected() {
        let mut r = record(0.5, 0.5);
        r.sources_used.push(SourceUsage::new("", 10, false));
        assert!(matches!(
            r.validate().unwrap_err(),
            ValidationError::InvalidSource { position: 1, .. }
        ));
    }

    #[test]
    fn test_with_session() {
        let r = record(0.5, 0.5).with_session("s-1");
        assert_eq!(r.session_id.as_deref(), Some("s-1"));
    }
}
