//! Background worker for periodic checkpoints

use crate::{AgentError, ResearchAgent};
use quarry_domain::RecordStore;
use std::sync::Arc;
use tokio::time::{interval, Duration};

/// Periodically saves the threshold checkpoint and prunes expired alert
/// fingerprints
///
/// # Examples
///
/// ```no_run
/// use quarry_agent::{AgentConfig, CheckpointWorker, ResearchAgent};
/// use quarry_llm::{MockSynthesizer, MockToolProvider};
/// use quarry_store::SqliteStore;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut config = AgentConfig::default();
///     config.checkpoint_path = Some("threshold.json".into());
///     let agent: Arc<ResearchAgent<SqliteStore>> = Arc::new(ResearchAgent::with_system_clock(
///         config,
///         Arc::new(MockToolProvider::new()),
///         Arc::new(MockSynthesizer::default()),
///     )?);
///
///     // Run until Ctrl+C
///     CheckpointWorker::from_config(agent).run().await;
///     Ok(())
/// }
/// ```
pub struct CheckpointWorker<S: RecordStore> {
    agent: Arc<ResearchAgent<S>>,
    interval: Duration,
    cycles_completed: usize,
}

impl<S: RecordStore + 'static> CheckpointWorker<S> {
    /// Create a worker running every `interval`
    pub fn new(agent: Arc<ResearchAgent<S>>, interval: Duration) -> Self {
        Self {
            agent,
            interval,
            cycles_completed: 0,
        }
    }

    /// Create a worker using the agent's configured interval
    pub fn from_config(agent: Arc<ResearchAgent<S>>) -> Self {
        let interval = agent.config().checkpoint_interval();
        Self::new(agent, interval)
    }

    /// Completed cycles
    pub fn cycles_completed(&self) -> usize {
        self.cycles_completed
    }

    /// Run until Ctrl+C, then write a final checkpoint
    ///
    /// Cycle failures are logged and the worker keeps going.
    pub async fn run(&mut self) {
        let mut ticker = interval(self.interval);
        tracing::info!("Checkpoint worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.cycle() {
                        tracing::error!("Checkpoint cycle failed: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping checkpoint worker");
                    break;
                }
            }
        }

        if let Err(e) = self.agent.checkpoint() {
            tracing::error!("Final checkpoint failed: {}", e);
        }
        tracing::info!("Checkpoint worker stopped after {} cycles", self.cycles_completed);
    }

    /// Run a fixed number of cycles (useful for testing)
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<(), AgentError> {
        let mut ticker = interval(self.interval);

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Checkpoint cycle {}/{}", cycle + 1, cycles);
            self.cycle()?;
        }
        Ok(())
    }

    fn cycle(&mut self) -> Result<(), AgentError> {
        let saved = self.agent.checkpoint()?;
        let pruned = self.agent.prune_alerts()?;
        self.cycles_completed += 1;

        tracing::debug!(
            "Checkpoint cycle done: saved={}, pruned {} alert fingerprints",
            saved.is_some(),
            pruned
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentConfig, ResearchRequest};
    use quarry_domain::ManualClock;
    use quarry_learning::ThresholdCheckpoint;
    use quarry_llm::{MockSynthesizer, MockToolProvider, MockUrgencyClassifier};
    use quarry_store::MemoryStore;
    use tempfile::TempDir;

    fn agent(config: AgentConfig, clock: ManualClock) -> Arc<ResearchAgent<MemoryStore>> {
        let agent = ResearchAgent::new(
            config.with_source("web"),
            Arc::new(MockToolProvider::new().with_source("web", "incident report")),
            Arc::new(MockSynthesizer::new(0.9)),
            Arc::new(clock),
        )
        .unwrap()
        .with_classifier(Arc::new(MockUrgencyClassifier::new(true)));
        agent.attach_store(Arc::new(MemoryStore::new())).unwrap();
        Arc::new(agent)
    }

    #[tokio::test]
    async fn test_run_cycles_writes_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("threshold.json");
        let config = AgentConfig {
            checkpoint_path: Some(path.clone()),
            ..Default::default()
        };
        let agent = agent(config, ManualClock::new(0));
        agent.process_query(ResearchRequest::new("incident")).await.unwrap();

        let mut worker = CheckpointWorker::new(agent.clone(), Duration::from_millis(5));
        worker.run_cycles(2).await.unwrap();
        assert_eq!(worker.cycles_completed(), 2);

        let saved: ThresholdCheckpoint =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.updates, 1);
        assert!((saved.threshold - agent.threshold().current_threshold().unwrap()).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_cycle_prunes_expired_alerts() {
        let clock = ManualClock::new(0);
        let agent = agent(AgentConfig::default(), clock.clone());

        let first = agent.process_query(ResearchRequest::new("incident")).await.unwrap();
        assert!(first.alert_triggered);
        assert_eq!(agent.recent_alert_count(), 1);

        let mut worker = CheckpointWorker::new(agent.clone(), Duration::from_millis(5));
        worker.run_cycles(1).await.unwrap();
        assert_eq!(agent.recent_alert_count(), 1);

        clock.advance(std::time::Duration::from_secs(3_601));
        worker.run_cycles(1).await.unwrap();
        assert_eq!(agent.recent_alert_count(), 0);

        let again = agent.process_query(ResearchRequest::new("incident")).await.unwrap();
        assert!(again.alert_triggered);
    }

    #[test]
    fn test_from_config_interval() {
        let agent = agent(AgentConfig::default(), ManualClock::new(0));
        let worker = CheckpointWorker::from_config(agent);
        assert_eq!(worker.interval, Duration::from_secs(300));
    }
}
