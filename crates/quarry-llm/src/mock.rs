//! Deterministic collaborators for tests and demos
//!
//! None of these make network calls. Clones share call counters.

use async_trait::async_trait;
use quarry_domain::{
    CollaboratorError, LlmSynthesizer, ScoredRecord, Synthesis, ToolError, ToolProvider,
    ToolResult, UrgencyClassifier,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockTool {
    Respond {
        content: String,
        latency_ms: u64,
        delay: Duration,
    },
    Fail(String),
}

/// Tool provider answering from a fixed table
///
/// # Examples
///
/// ```
/// use quarry_llm::MockToolProvider;
///
/// let tools = MockToolProvider::new()
///     .with_source("web", "Rust is a systems language")
///     .with_failure("flaky", "503");
/// assert_eq!(tools.call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockToolProvider {
    tools: HashMap<String, MockTool>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockToolProvider {
    /// Create a provider with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source returning `content` with a nominal latency
    pub fn with_source(self, source_id: impl Into<String>, content: impl Into<String>) -> Self {
        self.with_response(source_id, content, 25, Duration::ZERO)
    }

    /// Add a source with explicit reported latency and real delay
    pub fn with_response(
        mut self,
        source_id: impl Into<String>,
        content: impl Into<String>,
        latency_ms: u64,
        delay: Duration,
    ) -> Self {
        self.tools.insert(
            source_id.into(),
            MockTool::Respond {
                content: content.into(),
                latency_ms,
                delay,
            },
        );
        self
    }

    /// Add a source that always fails
    pub fn with_failure(mut self, source_id: impl Into<String>, message: impl Into<String>) -> Self {
        self.tools
            .insert(source_id.into(), MockTool::Fail(message.into()));
        self
    }

    /// Number of invocations so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Source ids in invocation order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ToolProvider for MockToolProvider {
    async fn invoke(&self, source_id: &str, _query: &str) -> Result<ToolResult, ToolError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(source_id.to_string());

        match self.tools.get(source_id) {
            Some(MockTool::Respond {
                content,
                latency_ms,
                delay,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(ToolResult {
                    content: content.clone(),
                    latency_ms: *latency_ms,
                })
            }
            Some(MockTool::Fail(message)) => Err(ToolError::Failed {
                source_id: source_id.to_string(),
                message: message.clone(),
            }),
            None => Err(ToolError::UnknownSource(source_id.to_string())),
        }
    }
}

/// Synthesizer that echoes the query and tool content
///
/// Confidence comes from a queue of scripted values, falling back to a
/// default once the queue is drained.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    default_confidence: f64,
    scripted: Arc<Mutex<VecDeque<f64>>>,
    failure: Option<String>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockSynthesizer {
    /// Always answer with `confidence`
    pub fn new(confidence: f64) -> Self {
        Self {
            default_confidence: confidence,
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            failure: None,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer with these confidences in order, then the last one
    pub fn with_confidences(confidences: impl IntoIterator<Item = f64>) -> Self {
        let scripted: VecDeque<f64> = confidences.into_iter().collect();
        let mut mock = Self::new(scripted.back().copied().unwrap_or(0.5));
        mock.scripted = Arc::new(Mutex::new(scripted));
        mock
    }

    /// Fail every call with a communication error
    pub fn failing(message: impl Into<String>) -> Self {
        let mut mock = Self::new(0.0);
        mock.failure = Some(message.into());
        mock
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of synthesize calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new(0.8)
    }
}

#[async_trait]
impl LlmSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        query: &str,
        tool_results: &[(String, ToolResult)],
    ) -> Result<Synthesis, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(CollaboratorError::Communication(message.clone()));
        }

        let confidence = self
            .scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.default_confidence);

        let mut answer_text = format!("Answer to {}:", query);
        for (_, result) in tool_results {
            answer_text.push(' ');
            answer_text.push_str(&result.content);
        }

        Ok(Synthesis {
            answer_text,
            confidence_score: confidence,
        })
    }
}

/// Classifier with a fixed verdict
#[derive(Debug, Clone)]
pub struct MockUrgencyClassifier {
    verdict: Result<bool, CollaboratorError>,
    calls: Arc<AtomicUsize>,
}

impl MockUrgencyClassifier {
    /// Always return `urgent`
    pub fn new(urgent: bool) -> Self {
        Self {
            verdict: Ok(urgent),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            verdict: Err(CollaboratorError::Communication(message.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of classify calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UrgencyClassifier for MockUrgencyClassifier {
    async fn classify(&self, _record: &ScoredRecord) -> Result<bool, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }
}
