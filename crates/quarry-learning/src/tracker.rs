//! Source performance tracking and ranking

use crate::{LearningError, TrackerConfig};
use quarry_domain::{Clock, ScoredRecord, SourcePriority, SystemClock};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Decaying per-source priority, used to order candidate sources
///
/// All entries sit behind one map-wide `RwLock`: updates are exclusive,
/// rankings and snapshots share the read side and never observe a
/// half-applied update.
///
/// # Examples
///
/// ```
/// use quarry_learning::{SourcePerformanceTracker, TrackerConfig};
///
/// let tracker = SourcePerformanceTracker::new(TrackerConfig::default());
/// tracker.record_outcome("web_search", 0.9, 120).unwrap();
/// tracker.record_outcome("news_api", 0.2, 300).unwrap();
///
/// let ranked = tracker.rank(&["news_api", "web_search"]).unwrap();
/// assert_eq!(ranked, vec!["web_search", "news_api"]);
/// ```
#[derive(Debug)]
pub struct SourcePerformanceTracker {
    config: TrackerConfig,
    clock: Arc<dyn Clock>,
    sources: RwLock<HashMap<String, SourcePriority>>,
}

impl SourcePerformanceTracker {
    /// Create a tracker reading the system clock
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a tracker with an injected clock
    pub fn with_clock(config: TrackerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            sources: RwLock::new(HashMap::new()),
        }
    }

    /// Get the tracker configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Register a source ahead of its first use, or rename it
    pub fn register_source(
        &self,
        source_id: &str,
        display_name: impl Into<String>,
    ) -> Result<(), LearningError> {
        let mut sources = self.write()?;
        let neutral = self.config.neutral_priority;
        sources
            .entry(source_id.to_string())
            .or_insert_with(|| SourcePriority::new(source_id, neutral))
            .display_name = display_name.into();
        Ok(())
    }

    /// Record one use of a source with the record's relevance
    ///
    /// Resets the source's failure streak. Returns the updated entry.
    pub fn record_outcome(
        &self,
        source_id: &str,
        relevance: f64,
        latency_ms: u64,
    ) -> Result<SourcePriority, LearningError> {
        self.record_outcome_at(source_id, relevance, latency_ms, self.clock.now_millis())
    }

    fn record_outcome_at(
        &self,
        source_id: &str,
        relevance: f64,
        latency_ms: u64,
        now_ms: u64,
    ) -> Result<SourcePriority, LearningError> {
        if !relevance.is_finite() || !(0.0..=1.0).contains(&relevance) {
            return Err(LearningError::InvalidInput(format!(
                "relevance must be within [0.0, 1.0], got {}",
                relevance
            )));
        }

        let mut sources = self.write()?;
        let entry = self.entry(&mut sources, source_id);
        entry.consecutive_failures = 0;
        self.apply_outcome(entry, relevance, latency_ms, now_ms);

        tracing::debug!(
            "Source {} updated: uses={}, successes={}, priority={:.3}",
            source_id,
            entry.total_uses,
            entry.success_count,
            entry.priority_score
        );
        Ok(entry.clone())
    }

    /// Record a failed tool call
    ///
    /// Up to `max_consecutive_failures` failures in a row leave the priority
    /// untouched. Each failure beyond that is recorded as a zero-relevance
    /// use that does not refresh the source's recency. Returns whether the
    /// source was penalized.
    pub fn record_failure(&self, source_id: &str, latency_ms: u64) -> Result<bool, LearningError> {
        let now_ms = self.clock.now_millis();
        let mut sources = self.write()?;
        let entry = self.entry(&mut sources, source_id);

        entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        entry.total_failures += 1;

        if entry.consecutive_failures <= self.config.max_consecutive_failures {
            tracing::debug!(
                "Source {} failed ({} in a row), not penalized",
                source_id,
                entry.consecutive_failures
            );
            return Ok(false);
        }

        self.fold_use(entry, 0.0, latency_ms);
        entry.priority_score = self.priority_at(entry, now_ms);
        tracing::warn!(
            "Source {} failed {} times in a row, priority now {:.3}",
            source_id,
            entry.consecutive_failures,
            entry.priority_score
        );
        Ok(true)
    }

    /// Sort candidates by descending priority
    ///
    /// Ties go to the source with fewer recorded uses, then to candidate
    /// order. Unknown sources rank at the neutral priority.
    pub fn rank<S: AsRef<str>>(&self, candidates: &[S]) -> Result<Vec<String>, LearningError> {
        let now_ms = self.clock.now_millis();
        let sources = self.read()?;

        let mut scored: Vec<(String, f64, u64)> = candidates
            .iter()
            .map(|candidate| {
                let id = candidate.as_ref();
                match sources.get(id) {
                    Some(entry) => (id.to_string(), self.priority_at(entry, now_ms), entry.total_uses),
                    None => (id.to_string(), self.config.neutral_priority, 0),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.2.cmp(&b.2))
        });

        Ok(scored.into_iter().map(|(id, _, _)| id).collect())
    }

    /// Current priority of a source, with recency decayed to now
    pub fn priority_of(&self, source_id: &str) -> Result<f64, LearningError> {
        let now_ms = self.clock.now_millis();
        let sources = self.read()?;
        Ok(sources
            .get(source_id)
            .map(|entry| self.priority_at(entry, now_ms))
            .unwrap_or(self.config.neutral_priority))
    }

    /// Copy of one source's entry
    pub fn get(&self, source_id: &str) -> Result<Option<SourcePriority>, LearningError> {
        Ok(self.read()?.get(source_id).cloned())
    }

    /// Top `k` sources by current priority
    ///
    /// Returned entries carry the decayed priority in `priority_score`.
    pub fn top(&self, k: usize) -> Result<Vec<SourcePriority>, LearningError> {
        let now_ms = self.clock.now_millis();
        let sources = self.read()?;

        let mut entries: Vec<SourcePriority> = sources
            .values()
            .map(|entry| {
                let mut entry = entry.clone();
                entry.priority_score = self.priority_at(&entry, now_ms);
                entry
            })
            .collect();

        entries.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.total_uses.cmp(&b.total_uses))
                .then_with(|| a.source_id.cmp(&b.source_id))
        });
        entries.truncate(k);
        Ok(entries)
    }

    /// Number of tracked sources
    pub fn len(&self) -> Result<usize, LearningError> {
        Ok(self.read()?.len())
    }

    /// Whether no source has been tracked yet
    pub fn is_empty(&self) -> Result<bool, LearningError> {
        Ok(self.read()?.is_empty())
    }

    /// Rebuild priorities from persisted records
    ///
    /// Records are applied oldest first using their own timestamps, so the
    /// recency factor reflects when each source was actually used.
    pub fn replay(&self, records: &[ScoredRecord]) -> Result<usize, LearningError> {
        let mut ordered: Vec<&ScoredRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.timestamp);

        let mut applied = 0;
        for record in ordered {
            for usage in &record.sources_used {
                self.record_outcome_at(
                    &usage.source_id,
                    record.relevance_score,
                    usage.latency_ms,
                    record.timestamp,
                )?;
                applied += 1;
            }
        }

        tracing::info!("Replayed {} source outcomes from {} records", applied, records.len());
        Ok(applied)
    }

    fn entry<'a>(
        &self,
        sources: &'a mut HashMap<String, SourcePriority>,
        source_id: &str,
    ) -> &'a mut SourcePriority {
        let neutral = self.config.neutral_priority;
        sources
            .entry(source_id.to_string())
            .or_insert_with(|| SourcePriority::new(source_id, neutral))
    }

    fn apply_outcome(&self, entry: &mut SourcePriority, relevance: f64, latency_ms: u64, now_ms: u64) {
        self.fold_use(entry, relevance, latency_ms);
        entry.last_used_ms = entry.last_used_ms.max(now_ms);
        entry.priority_score = self.priority_at(entry, now_ms);
    }

    // Counts and running means only; recency is left to the caller
    fn fold_use(&self, entry: &mut SourcePriority, relevance: f64, latency_ms: u64) {
        entry.total_uses += 1;
        if relevance >= self.config.success_threshold {
            entry.success_count += 1;
        }

        let n = entry.total_uses as f64;
        entry.avg_relevance += (relevance - entry.avg_relevance) / n;
        entry.avg_latency_ms += (latency_ms as f64 - entry.avg_latency_ms) / n;
    }

    fn priority_at(&self, entry: &SourcePriority, now_ms: u64) -> f64 {
        if entry.total_uses == 0 {
            return self.config.neutral_priority;
        }

        let idle_ms = now_ms.saturating_sub(entry.last_used_ms) as f64;
        let half_life_ms = self.config.recency_half_life().as_millis() as f64;
        let recency = 0.5f64.powf(idle_ms / half_life_ms);

        self.config
            .weights
            .blend(entry.success_rate(), entry.avg_relevance, recency)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, SourcePriority>>, LearningError> {
        self.sources.read().map_err(|_| LearningError::Poisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, SourcePriority>>, LearningError> {
        self.sources.write().map_err(|_| LearningError::Poisoned)
    }
}


#[cfg(test)]
mod proptests {
    use crate::PriorityWeights;
    use proptest::prelude::*;

    proptest! {
        /// Property: a higher success rate never lowers priority
        #[test]
        fn test_priority_monotonic_in_success_rate(
            low in 0.0f64..=1.0,
            delta in 0.0f64..=1.0,
            relevance in 0.0f64..=1.0,
            recency in 0.0f64..=1.0,
        ) {
            let high = (low + delta).min(1.0);
            let weights = PriorityWeights::default();
            prop_assert!(weights.blend(high, relevance, recency) >= weights.blend(low, relevance, recency));
        }

        /// Property: blended priority stays in [0, 1]
        #[test]
        fn test_priority_bounded(
            sr in 0.0f64..=1.0,
            relevance in 0.0f64..=1.0,
            recency in 0.0f64..=1.0,
        ) {
            let p = PriorityWeights::default().blend(sr, relevance, recency);
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
