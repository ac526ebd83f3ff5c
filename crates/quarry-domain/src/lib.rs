//! Quarry Domain Layer
//!
//! Core value types and capability traits for the Quarry research agent.
//! Every other crate depends on this one; it carries no infrastructure.
//!
//! ## Key Concepts
//!
//! - **ScoredRecord**: one processed query with relevance and confidence scores
//! - **SourcePriority**: ranking state kept per tool/source
//! - **Alert**: the outcome of one alert evaluation, keyed by a fingerprint
//! - **Clock**: injectable time source so decay and cooldowns are testable
//!
//! ## Architecture
//!
//! - Pure data and validation only
//! - Trait definitions for the record store and external collaborators
//!   (tool providers, LLM synthesis, urgency classification, report sinks)
//! - Implementations live in `quarry-store`, `quarry-llm` and `quarry-agent`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alert;
pub mod clock;
pub mod error;
pub mod record;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use alert::{Alert, AlertReason, AlertState, Fingerprint};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CollaboratorError, ToolError, ValidationError};
pub use record::{RecordId, ScoredRecord, SourceUsage};
pub use source::SourcePriority;
pub use traits::{
    LlmSynthesizer, RecordQuery, RecordStats, RecordStore, ReportSink, Synthesis, ToolProvider,
    ToolResult, UrgencyClassifier, WindowPair,
};
