//! Read-only view over a record database and the learned state.

use crate::config::Config;
use crate::error::{CliError, Result};
use quarry_agent::AgentConfig;
use quarry_domain::{RecordQuery, RecordStore, ScoredRecord, SourcePriority};
use quarry_learning::{ConfidenceThresholdAdapter, SourcePerformanceTracker};
use quarry_metrics::{MetricsEngine, MetricsSnapshot};
use quarry_store::SqliteStore;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Threshold state as reported by `quarry threshold`.
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdView {
    pub threshold: f64,
    pub updates: u64,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub learning_rate: f64,
    pub checkpoint_path: Option<PathBuf>,
    pub restored: bool,
}

/// Rebuilds tracker and threshold state from disk without touching it.
///
/// Source priorities are replayed from the stored records; the threshold
/// comes from the agent's checkpoint file when one is configured.
pub struct Inspector {
    store: Arc<SqliteStore>,
    tracker: Arc<SourcePerformanceTracker>,
    threshold: Arc<ConfidenceThresholdAdapter>,
    metrics: MetricsEngine<SqliteStore>,
    checkpoint_path: Option<PathBuf>,
    restored: bool,
}

impl Inspector {
    /// Open the database named by `config`.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.database_path()?;
        Self::open_path(&path, &config.agent)
    }

    /// Open the database at `path`.
    pub fn open_path(path: &Path, agent: &AgentConfig) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::Config(format!(
                "No record database at {}",
                path.display()
            )));
        }
        let store = Arc::new(SqliteStore::new(path)?);
        Self::from_store(store, agent)
    }

    /// Build the view over an already opened store.
    pub fn from_store(store: Arc<SqliteStore>, agent: &AgentConfig) -> Result<Self> {
        let tracker = Arc::new(SourcePerformanceTracker::new(agent.tracker.clone()));
        for source in &agent.sources {
            let name = source.display_name.clone().unwrap_or_else(|| source.id.clone());
            tracker.register_source(&source.id, name)?;
        }

        let history = store.query_records(&RecordQuery::default())?;
        let replayed = tracker.replay(&history)?;
        tracing::debug!("Replayed {} records into the source tracker", replayed);

        let threshold = Arc::new(ConfidenceThresholdAdapter::new(agent.threshold.clone())?);
        let restored = match &agent.checkpoint_path {
            Some(path) => threshold.load_from(path)?,
            None => false,
        };

        let metrics = MetricsEngine::new(
            store.clone(),
            tracker.clone(),
            threshold.clone(),
            agent.metrics.clone(),
        );

        Ok(Self {
            store,
            tracker,
            threshold,
            metrics,
            checkpoint_path: agent.checkpoint_path.clone(),
            restored,
        })
    }

    /// Current metrics snapshot.
    pub fn metrics(&self) -> Result<MetricsSnapshot> {
        Ok(self.metrics.snapshot()?)
    }

    /// Records newest first, optionally filtered by relevance.
    pub fn history(
        &self,
        limit: usize,
        offset: usize,
        min_relevance: Option<f64>,
    ) -> Result<Vec<ScoredRecord>> {
        if let Some(min) = min_relevance {
            if !(0.0..=1.0).contains(&min) {
                return Err(CliError::InvalidInput(
                    "Relevance must be between 0.0 and 1.0".to_string(),
                ));
            }
        }

        let query = RecordQuery {
            limit: Some(limit),
            offset,
            min_relevance,
        };
        Ok(self.store.query_records(&query)?)
    }

    /// Sources by decayed priority, highest first.
    pub fn sources(&self, top: Option<usize>) -> Result<Vec<SourcePriority>> {
        let all = self.tracker.len()?;
        Ok(self.metrics.top_sources(top.unwrap_or(all))?)
    }

    /// Threshold state.
    pub fn threshold(&self) -> Result<ThresholdView> {
        let config = self.threshold.config();
        Ok(ThresholdView {
            threshold: self.threshold.current_threshold()?,
            updates: self.threshold.updates()?,
            min_threshold: config.min_threshold,
            max_threshold: config.max_threshold,
            learning_rate: config.learning_rate,
            checkpoint_path: self.checkpoint_path.clone(),
            restored: self.restored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_domain::SourceUsage;

    fn seeded_store() -> Arc<SqliteStore> {
        let store = SqliteStore::in_memory().unwrap();
        for (i, relevance) in [0.2, 0.9, 0.8].iter().enumerate() {
            store
                .append(ScoredRecord::new(
                    format!("query {}", i),
                    *relevance,
                    0.6,
                    vec![SourceUsage::new("docs", 100, *relevance >= 0.7)],
                    1_000 + i as u64,
                ))
                .unwrap();
        }
        Arc::new(store)
    }

    #[test]
    fn test_replays_sources_from_history() {
        let inspector = Inspector::from_store(seeded_store(), &AgentConfig::default()).unwrap();
        let sources = inspector.sources(None).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_id, "docs");
        assert_eq!(sources[0].total_uses, 3);
    }

    #[test]
    fn test_configured_sources_are_listed() {
        let agent = AgentConfig::default().with_source("docs").with_source("forum");
        let inspector = Inspector::from_store(seeded_store(), &agent).unwrap();
        assert_eq!(inspector.sources(None).unwrap().len(), 2);
        assert_eq!(inspector.sources(Some(1)).unwrap()[0].source_id, "docs");
    }

    #[test]
    fn test_history_filter() {
        let inspector = Inspector::from_store(seeded_store(), &AgentConfig::default()).unwrap();
        assert_eq!(inspector.history(10, 0, None).unwrap().len(), 3);
        assert_eq!(inspector.history(10, 0, Some(0.7)).unwrap().len(), 2);
        assert_eq!(inspector.history(1, 0, None).unwrap()[0].query_text, "query 2");
        assert!(matches!(
            inspector.history(10, 0, Some(1.5)),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_threshold_without_checkpoint() {
        let inspector = Inspector::from_store(seeded_store(), &AgentConfig::default()).unwrap();
        let view = inspector.threshold().unwrap();
        assert_eq!(view.threshold, 0.7);
        assert_eq!(view.updates, 0);
        assert!(!view.restored);
    }

    #[test]
    fn test_metrics_snapshot() {
        let inspector = Inspector::from_store(seeded_store(), &AgentConfig::default()).unwrap();
        let snapshot = inspector.metrics().unwrap();
        assert_eq!(snapshot.total_queries, 3);
        assert!((snapshot.avg_relevance - (0.2 + 0.9 + 0.8) / 3.0).abs() < 1e-9);
        assert!(snapshot.insufficient_data);
    }

    #[test]
    fn test_missing_database() {
        let result = Inspector::open_path(Path::new("/nonexistent/quarry.db"), &AgentConfig::default());
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
