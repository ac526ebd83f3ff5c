//! Error types for the learning components

use thiserror::Error;

/// Errors that can occur while updating or persisting learned state
#[derive(Error, Debug)]
pub enum LearningError {
    /// Input value outside its documented range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A lock was poisoned by a panicking writer
    #[error("Learning state lock poisoned")]
    Poisoned,

    /// Checkpoint file could not be read or written
    #[error("Checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Checkpoint file could not be encoded or decoded
    #[error("Checkpoint format error: {0}")]
    Serialization(#[from] serde_json::Error),
}
