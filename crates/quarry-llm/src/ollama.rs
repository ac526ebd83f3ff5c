//! Ollama HTTP client
//!
//! Shared by the synthesizer and the urgency classifier.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama generate API
//! - Optional JSON mode
//! - Retry with exponential backoff
//! - Request timeout
//!
//! # Examples
//!
//! ```no_run
//! use quarry_llm::OllamaClient;
//!
//! let client = OllamaClient::new("http://localhost:11434", "llama3").unwrap();
//! ```

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Minimal client for Ollama's `/api/generate`
#[derive(Debug, Clone)]
pub struct OllamaClient {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
    backoff_base: Duration,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a client for `model` at `endpoint`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_secs(1),
        })
    }

    /// Create a client against the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the first backoff delay; later delays double
    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generate free text
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.send(prompt, None).await
    }

    /// Generate with Ollama's JSON mode enabled
    pub async fn generate_json(&self, prompt: &str) -> Result<String, LlmError> {
        self.send(prompt, Some("json")).await
    }

    async fn send(&self, prompt: &str, format: Option<&str>) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format,
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<GenerateResponse>()
                        .await
                        .map(|r| r.response)
                        .map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        });
                }
                Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                    return Err(LlmError::ModelNotAvailable(self.model.clone()));
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(LlmError::Communication(format!("HTTP {}: {}", status, text)));
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = self.backoff_base * 2u32.pow(attempts - 1);
                tracing::warn!(
                    "Ollama request failed (attempt {}/{}), retrying in {:?}",
                    attempts,
                    self.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}
