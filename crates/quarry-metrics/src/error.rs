//! Error types for metrics computation

use quarry_learning::LearningError;
use thiserror::Error;

/// Errors that can occur while computing metrics
#[derive(Error, Debug)]
pub enum MetricsError {
    /// The record store failed
    #[error("Store error: {0}")]
    Store(String),

    /// The tracker or threshold adapter failed
    #[error("Learning state error: {0}")]
    Learning(#[from] LearningError),

    /// Cache lock was poisoned
    #[error("Metrics cache lock poisoned")]
    Poisoned,
}
