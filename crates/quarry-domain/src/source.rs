//! Per-source ranking state

/// Performance summary for one tool/source
///
/// Only the source performance tracker mutates these; everyone else
/// sees copies.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePriority {
    /// Tool/source identifier
    pub source_id: String,

    /// Human-readable name (defaults to the id)
    pub display_name: String,

    /// Number of recorded uses, never decreases
    pub total_uses: u64,

    /// Uses whose record relevance met the success threshold
    pub success_count: u64,

    /// Running mean of record relevance
    pub avg_relevance: f64,

    /// Running mean of call latency
    pub avg_latency_ms: f64,

    /// Blended ranking value [0.0, 1.0] as of the last update
    pub priority_score: f64,

    /// Time of the last recorded use, milliseconds since Unix epoch
    pub last_used_ms: u64,

    /// Failures since the last successful call
    pub consecutive_failures: u32,

    /// Failures over the whole lifetime
    pub total_failures: u64,
}

impl SourcePriority {
    /// Create an unused entry with the given starting priority
    pub fn new(source_id: impl Into<String>, neutral_priority: f64) -> Self {
        let source_id = source_id.into();
        Self {
            display_name: source_id.clone(),
            source_id,
            total_uses: 0,
            success_count: 0,
            avg_relevance: 0.0,
            avg_latency_ms: 0.0,
            priority_score: neutral_priority,
            last_used_ms: 0,
            consecutive_failures: 0,
            total_failures: 0,
        }
    }

    /// Fraction of uses that were successes (0.0 when unused)
    pub fn success_rate(&self) -> f64 {
        if self.total_uses == 0 {
            0.0
        } else {
            self.success_count as f64 / self.total_uses as f64
        }
    }
}
