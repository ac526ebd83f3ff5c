//! Quarry LLM Collaborators
//!
//! Implementations of the `LlmSynthesizer` and `UrgencyClassifier`
//! capabilities from `quarry-domain`, plus deterministic mocks.
//!
//! # Providers
//!
//! - [`OllamaSynthesizer`]: answers from numbered tool results via a local
//!   Ollama model, JSON `{answer, confidence}` response
//! - [`OllamaUrgencyClassifier`]: yes/no urgency judgment
//! - [`MockSynthesizer`], [`MockToolProvider`], [`MockUrgencyClassifier`]:
//!   network-free stand-ins for tests and demos
//!
//! # Examples
//!
//! ```
//! use quarry_domain::{LlmSynthesizer, ToolResult};
//! use quarry_llm::MockSynthesizer;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let synthesizer = MockSynthesizer::new(0.8);
//! let results = vec![(
//!     "web".to_string(),
//!     ToolResult { content: "Rust 1.0 shipped in 2015".into(), latency_ms: 5 },
//! )];
//! let synthesis = synthesizer.synthesize("when did rust ship", &results).await.unwrap();
//! assert_eq!(synthesis.confidence_score, 0.8);
//! # }
//! ```

#![warn(missing_docs)]

mod classifier;
mod mock;
pub mod ollama;
pub mod prompt;
mod synthesizer;

use quarry_domain::CollaboratorError;
use thiserror::Error;

pub use classifier::OllamaUrgencyClassifier;
pub use mock::{MockSynthesizer, MockToolProvider, MockUrgencyClassifier};
pub use ollama::OllamaClient;
pub use synthesizer::OllamaSynthesizer;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl From<LlmError> for CollaboratorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Communication(msg) => CollaboratorError::Communication(msg),
            LlmError::InvalidResponse(msg) => CollaboratorError::InvalidResponse(msg),
            LlmError::ModelNotAvailable(model) => {
                CollaboratorError::Other(format!("model not available: {}", model))
            }
            LlmError::Other(msg) => CollaboratorError::Other(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let e: CollaboratorError = LlmError::Communication("refused".into()).into();
        assert_eq!(e, CollaboratorError::Communication("refused".into()));

        let e: CollaboratorError = LlmError::ModelNotAvailable("llama3".into()).into();
        assert!(matches!(e, CollaboratorError::Other(msg) if msg.contains("llama3")));
    }
}
