//! The research pipeline

use crate::scoring::RelevanceScorer;
use crate::{AgentConfig, AgentError};
use futures::future::join_all;
use quarry_alerts::{AlertEvaluator, RecentAlerts};
use quarry_domain::{
    Alert, Clock, LlmSynthesizer, RecordId, RecordQuery, RecordStore, ReportSink, ScoredRecord,
    SourceUsage, Synthesis, SystemClock, ToolError, ToolProvider, ToolResult, UrgencyClassifier,
    ValidationError,
};
use quarry_learning::{
    ConfidenceThresholdAdapter, SourcePerformanceTracker, ThresholdCheckpoint,
};
use quarry_metrics::{MetricsEngine, MetricsSnapshot};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

/// One research query
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchRequest {
    /// Natural-language query
    pub query: String,

    /// Sources per round; the configured default when `None`
    pub max_sources: Option<usize>,

    /// Whether to run alert evaluation
    pub alert_enabled: bool,

    /// Whether to hand the answer to the report sink
    pub include_report: bool,

    /// Caller's session, stored with the record
    pub session_id: Option<String>,
}

impl ResearchRequest {
    /// Request with alerts on and no report
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_sources: None,
            alert_enabled: true,
            include_report: false,
            session_id: None,
        }
    }

    /// Limit sources per round
    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = Some(max_sources);
        self
    }

    /// Enable or disable alert evaluation
    pub fn with_alerts(mut self, enabled: bool) -> Self {
        self.alert_enabled = enabled;
        self
    }

    /// Request a report
    pub fn with_report(mut self, include: bool) -> Self {
        self.include_report = include;
        self
    }

    /// Tag the record with a session
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// What `process_query` returns
#[derive(Debug, Clone)]
pub struct ResearchResult {
    /// Id of the persisted record
    pub record_id: RecordId,

    /// Final synthesized answer
    pub synthesized_answer: String,

    /// Lexical relevance of the answer
    pub relevance_score: f64,

    /// Synthesizer's confidence
    pub confidence_score: f64,

    /// Whether an alert was emitted
    pub alert_triggered: bool,

    /// The full alert evaluation, when alerts were enabled
    pub alert: Option<Alert>,

    /// Where the report went, when one was written
    pub report_path: Option<String>,

    /// Sources whose results were used, in call order
    pub sources_used: Vec<SourceUsage>,

    /// Retrieval rounds performed
    pub rounds: usize,
}

struct Attached<S: RecordStore> {
    store: Arc<S>,
    metrics: MetricsEngine<S>,
}

struct Gathered {
    results: Vec<(String, ToolResult)>,
    failures: Vec<(String, u64)>,
}

/// Research agent: ranks sources, calls tools, synthesizes, scores,
/// persists and learns
///
/// All learned state lives inside the components this value owns. Many
/// queries may run concurrently against one agent.
///
/// # Examples
///
/// ```
/// use quarry_agent::{AgentConfig, ResearchAgent, ResearchRequest};
/// use quarry_domain::SystemClock;
/// use quarry_llm::{MockSynthesizer, MockToolProvider};
/// use quarry_store::MemoryStore;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = AgentConfig::default().with_source("web");
/// let tools = MockToolProvider::new().with_source("web", "Rust ownership rules explained");
/// let agent: ResearchAgent<MemoryStore> = ResearchAgent::new(
///     config,
///     Arc::new(tools),
///     Arc::new(MockSynthesizer::new(0.9)),
///     Arc::new(SystemClock),
/// )
/// .unwrap();
///
/// agent.attach_store(Arc::new(MemoryStore::new())).unwrap();
/// let result = agent.process_query(ResearchRequest::new("rust ownership")).await.unwrap();
/// assert_eq!(result.sources_used.len(), 1);
/// # }
/// ```
pub struct ResearchAgent<S: RecordStore> {
    config: AgentConfig,
    clock: Arc<dyn Clock>,
    tools: Arc<dyn ToolProvider>,
    synthesizer: Arc<dyn LlmSynthesizer>,
    classifier: Option<Arc<dyn UrgencyClassifier>>,
    report_sink: Option<Arc<dyn ReportSink>>,
    tracker: Arc<SourcePerformanceTracker>,
    threshold: Arc<ConfidenceThresholdAdapter>,
    scorer: RelevanceScorer,
    evaluator: AlertEvaluator,
    recent_alerts: Mutex<RecentAlerts>,
    attached: RwLock<Option<Arc<Attached<S>>>>,
}

impl<S: RecordStore + 'static> ResearchAgent<S> {
    /// Create an agent with no store attached
    pub fn new(
        config: AgentConfig,
        tools: Arc<dyn ToolProvider>,
        synthesizer: Arc<dyn LlmSynthesizer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AgentError> {
        config.validate().map_err(AgentError::Config)?;

        let tracker = Arc::new(SourcePerformanceTracker::with_clock(
            config.tracker.clone(),
            clock.clone(),
        ));
        for source in &config.sources {
            let name = source.display_name.clone().unwrap_or_else(|| source.id.clone());
            tracker.register_source(&source.id, name)?;
        }

        let threshold = Arc::new(ConfidenceThresholdAdapter::with_clock(
            config.threshold.clone(),
            clock.clone(),
        )?);

        Ok(Self {
            scorer: RelevanceScorer::new(config.scoring.clone()),
            evaluator: AlertEvaluator::new(config.alerts.clone()),
            recent_alerts: Mutex::new(RecentAlerts::new(config.alerts.window_capacity)),
            config,
            clock,
            tools,
            synthesizer,
            classifier: None,
            report_sink: None,
            tracker,
            threshold,
            attached: RwLock::new(None),
        })
    }

    /// Create an agent reading the system clock
    pub fn with_system_clock(
        config: AgentConfig,
        tools: Arc<dyn ToolProvider>,
        synthesizer: Arc<dyn LlmSynthesizer>,
    ) -> Result<Self, AgentError> {
        Self::new(config, tools, synthesizer, Arc::new(SystemClock))
    }

    /// Consult an external urgency classifier during alert evaluation
    pub fn with_classifier(mut self, classifier: Arc<dyn UrgencyClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Hand answers to a report sink when requested
    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.report_sink = Some(sink);
        self
    }

    /// Get the agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The source tracker
    pub fn tracker(&self) -> &Arc<SourcePerformanceTracker> {
        &self.tracker
    }

    /// The confidence threshold adapter
    pub fn threshold(&self) -> &Arc<ConfidenceThresholdAdapter> {
        &self.threshold
    }

    /// Whether a store is attached
    pub fn is_attached(&self) -> bool {
        self.attached.read().map(|a| a.is_some()).unwrap_or(false)
    }

    /// Attach the record store and restore learned state
    ///
    /// Loads the threshold checkpoint when one is configured, and rebuilds
    /// source priorities from history if no outcomes have been recorded yet.
    pub fn attach_store(&self, store: Arc<S>) -> Result<(), AgentError> {
        if let Some(path) = &self.config.checkpoint_path {
            if self.threshold.load_from(path)? {
                tracing::info!("Loaded threshold checkpoint from {}", path.display());
            }
        }

        if self.tracker.top(usize::MAX)?.iter().all(|s| s.total_uses == 0) {
            let history = store
                .query_records(&RecordQuery::default())
                .map_err(|e| AgentError::Internal(format!("Failed to read history: {}", e)))?;
            self.tracker.replay(&history)?;
        }

        let metrics = MetricsEngine::with_clock(
            store.clone(),
            self.tracker.clone(),
            self.threshold.clone(),
            self.config.metrics.clone(),
            self.clock.clone(),
        );

        let mut attached = self.attached.write().map_err(|_| poisoned("store slot"))?;
        *attached = Some(Arc::new(Attached { store, metrics }));
        tracing::info!("Record store attached");
        Ok(())
    }

    /// Detach the store and write a final checkpoint
    ///
    /// Queries already past the store lookup finish normally.
    pub fn shutdown(&self) -> Result<Option<ThresholdCheckpoint>, AgentError> {
        let detached = self
            .attached
            .write()
            .map_err(|_| poisoned("store slot"))?
            .take()
            .is_some();
        let checkpoint = self.checkpoint()?;
        tracing::info!("Research agent shut down (store was attached: {})", detached);
        Ok(checkpoint)
    }

    /// Save the threshold checkpoint if a path is configured
    pub fn checkpoint(&self) -> Result<Option<ThresholdCheckpoint>, AgentError> {
        match &self.config.checkpoint_path {
            Some(path) => Ok(Some(self.threshold.save_to(path)?)),
            None => Ok(None),
        }
    }

    /// Forget alert fingerprints older than the cooldown
    pub fn prune_alerts(&self) -> Result<usize, AgentError> {
        let now_ms = self.clock.now_millis();
        let cooldown_ms = self.config.alerts.cooldown().as_millis() as u64;
        let mut recent = self.recent_alerts.lock().map_err(|_| poisoned("alert window"))?;
        Ok(recent.prune(now_ms, cooldown_ms))
    }

    /// Number of remembered alert fingerprints
    pub fn recent_alert_count(&self) -> usize {
        self.recent_alerts.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Run one query through the full pipeline
    ///
    /// Tool failures are absorbed: the source is dropped from this query
    /// and its failure streak grows. Synthesis, validation and append
    /// failures fail the query without touching learned state.
    pub async fn process_query(&self, request: ResearchRequest) -> Result<ResearchResult, AgentError> {
        let query = request.query.trim().to_string();
        if query.is_empty() {
            return Err(ValidationError::MissingField("query_text").into());
        }

        let attached = self.attached()?;
        let started = Instant::now();
        tracing::info!("Processing query: {}", query);

        let ranked = self.tracker.rank(&self.config.source_ids())?;
        let per_round = request
            .max_sources
            .unwrap_or(self.config.default_max_sources)
            .max(1);

        let mut gathered = Gathered {
            results: Vec::new(),
            failures: Vec::new(),
        };
        let mut cursor = 0;
        let mut rounds = 0;

        let synthesis = loop {
            let end = (cursor + per_round).min(ranked.len());
            let batch = &ranked[cursor..end];
            cursor = end;
            rounds += 1;

            self.fan_out(batch, &query, &mut gathered).await;
            let synthesis = self.synthesize(&query, &gathered.results).await?;

            if rounds >= self.config.max_rounds
                || cursor >= ranked.len()
                || !self.threshold.below_threshold(synthesis.confidence_score)?
            {
                break synthesis;
            }
            tracing::debug!(
                "Confidence {:.3} below threshold, widening search (round {})",
                synthesis.confidence_score,
                rounds + 1
            );
        };

        let score = self.scorer.score(&query, &synthesis.answer_text, &gathered.results);
        let sources_used: Vec<SourceUsage> = gathered
            .results
            .iter()
            .zip(&score.contributions)
            .map(|((source_id, result), contributed)| {
                SourceUsage::new(source_id.clone(), result.latency_ms, *contributed)
            })
            .collect();

        let mut record = ScoredRecord::new(
            query.clone(),
            score.relevance,
            synthesis.confidence_score,
            sources_used.clone(),
            self.clock.now_millis(),
        );
        if let Some(session) = &request.session_id {
            record = record.with_session(session.clone());
        }
        record.validate()?;

        let record_id = attached
            .store
            .append(record.clone())
            .map_err(|e| AgentError::Internal(format!("Failed to persist record: {}", e)))?;

        // No await between append and the learning updates below
        self.learn(&attached, &record, &gathered.failures)?;

        let alert = if request.alert_enabled {
            Some(self.evaluate_alert(&record).await?)
        } else {
            None
        };

        let report_path = if request.include_report {
            self.write_report(&record, &synthesis.answer_text).await
        } else {
            None
        };

        tracing::info!(
            "Query {} done in {:?}: relevance={:.3}, confidence={:.3}, rounds={}, sources={}",
            record_id,
            started.elapsed(),
            record.relevance_score,
            record.confidence_score,
            rounds,
            sources_used.len()
        );

        Ok(ResearchResult {
            record_id,
            synthesized_answer: synthesis.answer_text,
            relevance_score: record.relevance_score,
            confidence_score: record.confidence_score,
            alert_triggered: alert.as_ref().map(|a| a.triggered).unwrap_or(false),
            alert,
            report_path,
            sources_used,
            rounds,
        })
    }

    /// Current metrics; the empty snapshot when no store is attached or a
    /// read fails
    pub fn get_metrics(&self) -> MetricsSnapshot {
        let attached = match self.attached() {
            Ok(attached) => attached,
            Err(_) => return self.empty_snapshot(),
        };
        attached.metrics.snapshot().unwrap_or_else(|e| {
            tracing::warn!("Metrics unavailable, returning defaults: {}", e);
            self.empty_snapshot()
        })
    }

    /// History page, newest first; empty when no store is attached or the
    /// read fails
    pub fn get_history(&self, limit: usize, offset: usize, min_relevance: Option<f64>) -> Vec<ScoredRecord> {
        let attached = match self.attached() {
            Ok(attached) => attached,
            Err(_) => return Vec::new(),
        };
        let query = RecordQuery {
            limit: Some(limit),
            offset,
            min_relevance,
        };
        attached.store.query_records(&query).unwrap_or_else(|e| {
            tracing::warn!("History unavailable: {}", e);
            Vec::new()
        })
    }

    fn attached(&self) -> Result<Arc<Attached<S>>, AgentError> {
        self.attached
            .read()
            .map_err(|_| poisoned("store slot"))?
            .clone()
            .ok_or_else(|| AgentError::ServiceUnavailable("record store is not initialized".to_string()))
    }

    async fn fan_out(&self, batch: &[String], query: &str, gathered: &mut Gathered) {
        let timeout = self.config.tool_timeout();
        let calls = batch.iter().map(|source_id| async move {
            let started = Instant::now();
            let outcome = match tokio::time::timeout(timeout, self.tools.invoke(source_id, query)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ToolError::Timeout(source_id.clone())),
            };
            (source_id, outcome, started.elapsed().as_millis() as u64)
        });

        for (source_id, outcome, elapsed_ms) in join_all(calls).await {
            match outcome {
                Ok(result) => gathered.results.push((source_id.clone(), result)),
                Err(e) => {
                    tracing::warn!("Tool {} failed: {}", source_id, e);
                    gathered.failures.push((source_id.clone(), elapsed_ms));
                }
            }
        }
    }

    async fn synthesize(
        &self,
        query: &str,
        results: &[(String, ToolResult)],
    ) -> Result<Synthesis, AgentError> {
        match tokio::time::timeout(
            self.config.synthesis_timeout(),
            self.synthesizer.synthesize(query, results),
        )
        .await
        {
            Ok(Ok(synthesis)) => Ok(synthesis),
            Ok(Err(e)) => Err(AgentError::Internal(format!("Synthesis failed: {}", e))),
            Err(_) => Err(AgentError::Internal(format!(
                "Synthesis timed out after {:?}",
                self.config.synthesis_timeout()
            ))),
        }
    }

    fn learn(
        &self,
        attached: &Attached<S>,
        record: &ScoredRecord,
        failures: &[(String, u64)],
    ) -> Result<(), AgentError> {
        for usage in &record.sources_used {
            self.tracker
                .record_outcome(&usage.source_id, record.relevance_score, usage.latency_ms)?;
        }
        for (source_id, latency_ms) in failures {
            self.tracker.record_failure(source_id, *latency_ms)?;
        }
        attached.metrics.invalidate_sources()?;
        self.threshold.update(record)?;
        Ok(())
    }

    async fn evaluate_alert(&self, record: &ScoredRecord) -> Result<Alert, AgentError> {
        let external = match &self.classifier {
            Some(classifier) => {
                match tokio::time::timeout(self.config.classify_timeout(), classifier.classify(record)).await {
                    Ok(Ok(urgent)) => Some(urgent),
                    Ok(Err(e)) => {
                        tracing::warn!("Urgency classifier failed: {}", e);
                        None
                    }
                    Err(_) => {
                        tracing::warn!("Urgency classifier timed out");
                        None
                    }
                }
            }
            None => None,
        };

        let now_ms = self.clock.now_millis();
        let mut recent = self.recent_alerts.lock().map_err(|_| poisoned("alert window"))?;
        Ok(self.evaluator.evaluate(record, external, &mut recent, now_ms))
    }

    async fn write_report(&self, record: &ScoredRecord, answer_text: &str) -> Option<String> {
        let sink = self.report_sink.as_ref()?;
        match tokio::time::timeout(self.config.report_timeout(), sink.write_report(record, answer_text)).await {
            Ok(Ok(path)) => Some(path),
            Ok(Err(e)) => {
                tracing::warn!("Report hand-off failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("Report hand-off timed out");
                None
            }
        }
    }

    fn empty_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            confidence_threshold: self.threshold.current_threshold().unwrap_or_default(),
            generated_at_ms: self.clock.now_millis(),
            ..MetricsSnapshot::default()
        }
    }
}

fn poisoned(what: &str) -> AgentError {
    AgentError::Internal(format!("{} lock poisoned", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_domain::ManualClock;
    use quarry_llm::{MockSynthesizer, MockToolProvider, MockUrgencyClassifier};
    use quarry_store::MemoryStore;

    fn agent_with(
        config: AgentConfig,
        tools: MockToolProvider,
        synthesizer: MockSynthesizer,
    ) -> ResearchAgent<MemoryStore> {
        let agent = ResearchAgent::new(
            config,
            Arc::new(tools),
            Arc::new(synthesizer),
            Arc::new(ManualClock::new(1_700_000_000_000)),
        )
        .unwrap();
        agent.attach_store(Arc::new(MemoryStore::new())).unwrap();
        agent
    }

    #[tokio::test]
    async fn test_not_attached_is_unavailable() {
        let agent: ResearchAgent<MemoryStore> = ResearchAgent::new(
            AgentConfig::default().with_source("web"),
            Arc::new(MockToolProvider::new()),
            Arc::new(MockSynthesizer::default()),
            Arc::new(ManualClock::new(0)),
        )
        .unwrap();

        let result = agent.process_query(ResearchRequest::new("q")).await;
        assert!(matches!(result, Err(AgentError::ServiceUnavailable(_))));
        assert!(agent.get_history(10, 0, None).is_empty());
        assert_eq!(agent.get_metrics().total_queries, 0);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let agent = agent_with(
            AgentConfig::default(),
            MockToolProvider::new(),
            MockSynthesizer::default(),
        );
        let result = agent.process_query(ResearchRequest::new("   ")).await;
        assert!(matches!(result, Err(AgentError::Validation(_))));
        assert_eq!(agent.get_metrics().total_queries, 0);
    }

    #[tokio::test]
    async fn test_tool_failure_absorbed() {
        let config = AgentConfig::default().with_source("web").with_source("down");
        let tools = MockToolProvider::new()
            .with_source("web", "rust borrow checker")
            .with_failure("down", "503");
        let agent = agent_with(config, tools, MockSynthesizer::new(0.9));

        let result = agent
            .process_query(ResearchRequest::new("rust borrow checker"))
            .await
            .unwrap();

        assert_eq!(result.sources_used.len(), 1);
        assert_eq!(result.sources_used[0].source_id, "web");

        let down = agent.tracker().get("down").unwrap().unwrap();
        assert_eq!(down.total_failures, 1);
        assert_eq!(down.total_uses, 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_leaves_no_record() {
        let agent = agent_with(
            AgentConfig::default().with_source("web"),
            MockToolProvider::new().with_source("web", "x"),
            MockSynthesizer::failing("model offline"),
        );

        let result = agent.process_query(ResearchRequest::new("q")).await;
        assert!(matches!(result, Err(AgentError::Internal(_))));
        assert_eq!(agent.get_metrics().total_queries, 0);
        assert_eq!(agent.threshold().updates().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_rejected() {
        let agent = agent_with(
            AgentConfig::default().with_source("web"),
            MockToolProvider::new().with_source("web", "x"),
            MockSynthesizer::new(1.5),
        );
        let result = agent.process_query(ResearchRequest::new("q")).await;
        assert!(matches!(result, Err(AgentError::Validation(_))));
        assert!(agent.get_history(10, 0, None).is_empty());
    }

    #[tokio::test]
    async fn test_second_round_when_confidence_low() {
        let config = AgentConfig {
            default_max_sources: 1,
            ..AgentConfig::default().with_source("a").with_source("b")
        };
        let tools = MockToolProvider::new()
            .with_source("a", "first")
            .with_source("b", "second");
        let synthesizer = MockSynthesizer::with_confidences([0.2, 0.85]);
        let agent = agent_with(config, tools.clone(), synthesizer.clone());

        let result = agent.process_query(ResearchRequest::new("q")).await.unwrap();
        assert_eq!(result.rounds, 2);
        assert_eq!(result.sources_used.len(), 2);
        assert_eq!(result.confidence_score, 0.85);
        assert_eq!(synthesizer.call_count(), 2);
        assert_eq!(tools.call_count(), 2);
    }

    #[tokio::test]
    async fn test_single_round_when_confident() {
        let config = AgentConfig {
            default_max_sources: 1,
            ..AgentConfig::default().with_source("a").with_source("b")
        };
        let tools = MockToolProvider::new()
            .with_source("a", "first")
            .with_source("b", "second");
        let agent = agent_with(config, tools.clone(), MockSynthesizer::new(0.95));

        let result = agent.process_query(ResearchRequest::new("q")).await.unwrap();
        assert_eq!(result.rounds, 1);
        assert_eq!(tools.call_count(), 1);
    }

    #[tokio::test]
    async fn test_threshold_updated_per_query() {
        let agent = agent_with(
            AgentConfig::default().with_source("web"),
            MockToolProvider::new().with_source("web", "x"),
            MockSynthesizer::new(0.9),
        );
        agent.process_query(ResearchRequest::new("q")).await.unwrap();

        assert_eq!(agent.threshold().updates().unwrap(), 1);
        assert!((agent.threshold().current_threshold().unwrap() - 0.71).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_alert_deduplicated_across_queries() {
        let config = AgentConfig::default().with_source("web");
        let tools = MockToolProvider::new().with_source("web", "database outage");
        let agent = agent_with(config, tools, MockSynthesizer::new(0.9))
            .with_classifier(Arc::new(MockUrgencyClassifier::new(true)));

        let first = agent
            .process_query(ResearchRequest::new("Database outage"))
            .await
            .unwrap();
        let second = agent
            .process_query(ResearchRequest::new("database   OUTAGE"))
            .await
            .unwrap();

        assert!(first.alert_triggered);
        assert!(!second.alert_triggered);
    }

    #[tokio::test]
    async fn test_alerts_disabled() {
        let agent = agent_with(
            AgentConfig::default().with_source("web"),
            MockToolProvider::new().with_source("web", "x"),
            MockSynthesizer::new(0.9),
        )
        .with_classifier(Arc::new(MockUrgencyClassifier::new(true)));

        let result = agent
            .process_query(ResearchRequest::new("q").with_alerts(false))
            .await
            .unwrap();
        assert!(!result.alert_triggered);
        assert!(result.alert.is_none());
    }

    #[tokio::test]
    async fn test_classifier_failure_falls_back() {
        let agent = agent_with(
            AgentConfig::default().with_source("web"),
            MockToolProvider::new().with_source("web", "x"),
            MockSynthesizer::new(0.9),
        )
        .with_classifier(Arc::new(MockUrgencyClassifier::failing("timeout")));

        let result = agent.process_query(ResearchRequest::new("q")).await.unwrap();
        assert!(!result.alert_triggered);
        assert!(result.alert.is_some());
    }

    #[tokio::test]
    async fn test_history_and_session() {
        let agent = agent_with(
            AgentConfig::default().with_source("web"),
            MockToolProvider::new().with_source("web", "x"),
            MockSynthesizer::new(0.9),
        );
        agent
            .process_query(ResearchRequest::new("first").with_session("s-1"))
            .await
            .unwrap();
        agent.process_query(ResearchRequest::new("second")).await.unwrap();

        let history = agent.get_history(10, 0, None);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].query_text, "second");
        assert_eq!(history[1].session_id.as_deref(), Some("s-1"));
        assert_eq!(agent.get_history(1, 1, None)[0].query_text, "first");
    }

    #[tokio::test]
    async fn test_shutdown_detaches() {
        let agent = agent_with(
            AgentConfig::default().with_source("web"),
            MockToolProvider::new().with_source("web", "x"),
            MockSynthesizer::new(0.9),
        );
        assert!(agent.is_attached());
        assert!(agent.shutdown().unwrap().is_none());
        assert!(!agent.is_attached());
        assert!(matches!(
            agent.process_query(ResearchRequest::new("q")).await,
            Err(AgentError::ServiceUnavailable(_))
        ));
    }
}
