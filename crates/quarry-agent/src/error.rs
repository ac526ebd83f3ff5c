//! Error types for the research agent

use quarry_domain::ValidationError;
use quarry_learning::LearningError;
use quarry_metrics::MetricsError;
use thiserror::Error;

/// Errors surfaced by the research agent
#[derive(Error, Debug)]
pub enum AgentError {
    /// No record store is attached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The request or the record built from it failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A collaborator or internal component failed unexpectedly
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<LearningError> for AgentError {
    fn from(e: LearningError) -> Self {
        AgentError::Internal(e.to_string())
    }
}

impl From<MetricsError> for AgentError {
    fn from(e: MetricsError) -> Self {
        AgentError::Internal(e.to_string())
    }
}
