//! Ollama-backed urgency judgment

use crate::prompt::{build_urgency_prompt, parse_yes_no};
use crate::OllamaClient;
use async_trait::async_trait;
use quarry_domain::{CollaboratorError, ScoredRecord, UrgencyClassifier};

/// Asks a local Ollama model whether a record is urgent
#[derive(Debug, Clone)]
pub struct OllamaUrgencyClassifier {
    client: OllamaClient,
}

impl OllamaUrgencyClassifier {
    /// Create a classifier over an Ollama client
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UrgencyClassifier for OllamaUrgencyClassifier {
    async fn classify(&self, record: &ScoredRecord) -> Result<bool, CollaboratorError> {
        let raw = self.client.generate(&build_urgency_prompt(record)).await?;
        let urgent = parse_yes_no(&raw)?;
        tracing::debug!("Record {} classified urgent={}", record.id, urgent);
        Ok(urgent)
    }
}
