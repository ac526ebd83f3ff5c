//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the agent core and
//! infrastructure. Implementations live in other crates or are supplied
//! by the embedding application.

use crate::{CollaboratorError, RecordId, ScoredRecord, ToolError};
use async_trait::async_trait;

/// Append-only, chronologically ordered store of scored records
///
/// Implemented by the infrastructure layer (quarry-store).
///
/// Implementations serialize `append` internally and must make a record
/// fully visible to every reader before `append` returns. Records that
/// share a timestamp keep their insertion order.
pub trait RecordStore: Send + Sync {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append a record; rejects records that fail validation
    fn append(&self, record: ScoredRecord) -> Result<RecordId, Self::Error>;

    /// Up to `n` most recently appended records, newest first
    fn read_recent(&self, n: usize) -> Result<Vec<ScoredRecord>, Self::Error>;

    /// Records with `start_ms <= timestamp <= end_ms`, ascending by timestamp
    fn read_range(&self, start_ms: u64, end_ms: u64) -> Result<Vec<ScoredRecord>, Self::Error>;

    /// Total number of records
    fn count(&self) -> Result<usize, Self::Error>;

    /// Full-history aggregates
    fn stats(&self) -> Result<RecordStats, Self::Error>;

    /// Paginated history, newest first
    fn query_records(&self, query: &RecordQuery) -> Result<Vec<ScoredRecord>, Self::Error>;

    /// The most recent `window_size` records and the `window_size` before them
    ///
    /// Both windows come back empty with `sufficient == false` when fewer
    /// than `2 * window_size` records exist (or `window_size` is zero).
    fn read_window_pair(&self, window_size: usize) -> Result<WindowPair, Self::Error> {
        if window_size == 0 {
            return Ok(WindowPair::insufficient());
        }

        let needed = window_size.saturating_mul(2);
        let mut recent = self.read_recent(needed)?;
        if recent.len() < needed {
            return Ok(WindowPair::insufficient());
        }

        let older = recent.split_off(window_size);
        Ok(WindowPair {
            recent,
            older,
            sufficient: true,
        })
    }

    /// Number of records with `start_ms <= timestamp <= end_ms`
    fn count_between(&self, start_ms: u64, end_ms: u64) -> Result<usize, Self::Error> {
        Ok(self.read_range(start_ms, end_ms)?.len())
    }
}

/// Paging and filtering for history reads
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Maximum results to return (all when `None`)
    pub limit: Option<usize>,

    /// Number of newest records to skip
    pub offset: usize,

    /// Keep only records with at least this relevance
    pub min_relevance: Option<f64>,
}

/// Aggregates over every stored record
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecordStats {
    /// Number of records
    pub count: usize,

    /// Mean relevance (0.0 when empty)
    pub mean_relevance: f64,

    /// Mean confidence (0.0 when empty)
    pub mean_confidence: f64,
}

/// Two adjacent windows for trend comparison
#[derive(Debug, Clone, Default)]
pub struct WindowPair {
    /// Newest records, newest first
    pub recent: Vec<ScoredRecord>,

    /// The records immediately preceding `recent`, newest first
    pub older: Vec<ScoredRecord>,

    /// False when the store did not hold enough records
    pub sufficient: bool,
}

impl WindowPair {
    /// Empty windows flagged as insufficient
    pub fn insufficient() -> Self {
        Self::default()
    }
}

/// Content returned by one tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Retrieved text
    pub content: String,

    /// Call latency in milliseconds
    pub latency_ms: u64,
}

/// Trait for tool/source invocation (web search, API calls)
///
/// Transport is the implementor's concern. Fan-out and timeouts belong to
/// the orchestrator.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Run `query` against the named source
    async fn invoke(&self, source_id: &str, query: &str) -> Result<ToolResult, ToolError>;
}

/// A synthesized answer
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Answer text
    pub answer_text: String,

    /// Synthesizer's confidence [0.0, 1.0]
    pub confidence_score: f64,
}

/// Trait for LLM answer synthesis
///
/// Implemented by the infrastructure layer (quarry-llm).
#[async_trait]
pub trait LlmSynthesizer: Send + Sync {
    /// Combine tool results into an answer
    ///
    /// `tool_results` pairs each source id with what it returned.
    async fn synthesize(
        &self,
        query: &str,
        tool_results: &[(String, ToolResult)],
    ) -> Result<Synthesis, CollaboratorError>;
}

/// Trait for an external yes/no urgency judgment
///
/// The alert evaluator treats the answer as opaque input.
#[async_trait]
pub trait UrgencyClassifier: Send + Sync {
    /// Whether the record warrants urgent attention
    async fn classify(&self, record: &ScoredRecord) -> Result<bool, CollaboratorError>;
}

/// Trait for handing a finished answer to report generation
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist a report and return where it went
    async fn write_report(
        &self,
        record: &ScoredRecord,
        answer_text: &str,
    ) -> Result<String, CollaboratorError>;
}
