//! Ollama-backed answer synthesis

use crate::prompt::{build_synthesis_prompt, parse_synthesis};
use crate::OllamaClient;
use async_trait::async_trait;
use quarry_domain::{CollaboratorError, LlmSynthesizer, Synthesis, ToolResult};

/// Synthesizes answers from tool results with a local Ollama model
///
/// # Examples
///
/// ```no_run
/// use quarry_llm::{OllamaClient, OllamaSynthesizer};
///
/// let client = OllamaClient::default_endpoint("llama3").unwrap();
/// let synthesizer = OllamaSynthesizer::new(client);
/// ```
#[derive(Debug, Clone)]
pub struct OllamaSynthesizer {
    client: OllamaClient,
}

impl OllamaSynthesizer {
    /// Create a synthesizer over an Ollama client
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmSynthesizer for OllamaSynthesizer {
    async fn synthesize(
        &self,
        query: &str,
        tool_results: &[(String, ToolResult)],
    ) -> Result<Synthesis, CollaboratorError> {
        let prompt = build_synthesis_prompt(query, tool_results);
        tracing::debug!(
            "Synthesizing with {} ({} sources, {} prompt bytes)",
            self.client.model(),
            tool_results.len(),
            prompt.len()
        );

        let raw = self.client.generate_json(&prompt).await?;
        let synthesis = parse_synthesis(&raw)?;

        tracing::debug!("Synthesis confidence {:.3}", synthesis.confidence_score);
        Ok(synthesis)
    }
}
