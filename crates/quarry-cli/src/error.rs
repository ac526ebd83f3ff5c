//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store error
    #[error("Store error: {0}")]
    Store(#[from] quarry_store::StoreError),

    /// Learning state error
    #[error("Learning error: {0}")]
    Learning(#[from] quarry_learning::LearningError),

    /// Metrics error
    #[error("Metrics error: {0}")]
    Metrics(#[from] quarry_metrics::MetricsError),

    /// Agent configuration error
    #[error("Agent error: {0}")]
    Agent(#[from] quarry_agent::AgentError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
