//! Error values shared across layers

use thiserror::Error;

/// A record failed validation and must not be stored
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A score is outside [0.0, 1.0] or not finite
    #[error("{field} must be within [0.0, 1.0], got {value}")]
    ScoreOutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// A required field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A source entry is malformed
    #[error("Invalid source entry at position {position}: {reason}")]
    InvalidSource {
        /// Index into `sources_used`
        position: usize,
        /// What is wrong with it
        reason: String,
    },
}

/// Failure of a single tool invocation
///
/// The orchestrator absorbs these; one failing source never aborts a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// The provider does not know this source
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// The call did not finish in time
    #[error("Tool call to {0} timed out")]
    Timeout(String),

    /// The source answered with an error
    #[error("Tool {source_id} failed: {message}")]
    Failed {
        /// Source that failed
        source_id: String,
        /// Provider-supplied detail
        message: String,
    },
}

/// Failure reported by an LLM-backed collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The collaborator answered with something unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Any other failure
    #[error("Collaborator error: {0}")]
    Other(String),
}
