//! Read-only aggregates over the store and the learning components

use crate::{ExpiringCache, MetricsConfig, MetricsError};
use quarry_domain::{Clock, RecordStore, SourcePriority, SystemClock};
use quarry_learning::{ConfidenceThresholdAdapter, SourcePerformanceTracker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const HOUR_MS: u64 = 3_600_000;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Relevance trend between two adjacent windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// `mean(recent) - mean(older)`, 0.0 when data is insufficient
    pub trend: f64,

    /// Records per window
    pub window_size: usize,

    /// Mean relevance of the most recent window
    pub recent_mean: f64,

    /// Mean relevance of the window before it
    pub older_mean: f64,

    /// Fewer than `2 * window_size` records exist
    pub insufficient_data: bool,
}

impl TrendReport {
    /// Flat trend flagged as insufficient
    pub fn insufficient(window_size: usize) -> Self {
        Self {
            trend: 0.0,
            window_size,
            recent_mean: 0.0,
            older_mean: 0.0,
            insufficient_data: true,
        }
    }
}

/// Record counts for the trailing hour and day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindowCounts {
    /// Records within the last hour
    pub last_hour: usize,

    /// Records within the last 24 hours
    pub last_day: usize,
}

/// Per-source figures for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Source identifier
    pub source_id: String,

    /// Human-readable name
    pub display_name: String,

    /// Priority decayed to the time of the snapshot
    pub priority_score: f64,

    /// Recorded uses
    pub total_uses: u64,

    /// `success_count / total_uses`
    pub success_rate: f64,

    /// Running mean relevance
    pub avg_relevance: f64,

    /// Running mean latency
    pub avg_latency_ms: f64,
}

impl From<&SourcePriority> for SourceSummary {
    fn from(source: &SourcePriority) -> Self {
        Self {
            source_id: source.source_id.clone(),
            display_name: source.display_name.clone(),
            priority_score: source.priority_score,
            total_uses: source.total_uses,
            success_rate: source.success_rate(),
            avg_relevance: source.avg_relevance,
            avg_latency_ms: source.avg_latency_ms,
        }
    }
}

/// Everything reported by `get_metrics`
///
/// `Default` is the empty-store snapshot: all zeros, no sources, and the
/// insufficient-data flag set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total records
    pub total_queries: usize,

    /// Full-history mean relevance
    pub avg_relevance: f64,

    /// Full-history mean confidence
    pub avg_confidence: f64,

    /// Relevance trend
    pub improvement_trend: f64,

    /// Trend could not be computed
    pub insufficient_data: bool,

    /// Highest-priority sources
    pub top_sources: Vec<SourceSummary>,

    /// Records in the trailing hour and day
    pub time_windows: TimeWindowCounts,

    /// Current adaptive confidence threshold
    pub confidence_threshold: f64,

    /// When the snapshot was taken, milliseconds since Unix epoch
    pub generated_at_ms: u64,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            total_queries: 0,
            avg_relevance: 0.0,
            avg_confidence: 0.0,
            improvement_trend: 0.0,
            insufficient_data: true,
            top_sources: Vec::new(),
            time_windows: TimeWindowCounts::default(),
            confidence_threshold: 0.0,
            generated_at_ms: 0,
        }
    }
}

/// Computes metrics on demand
///
/// Never writes. Source rankings are cached for `cache_ttl_secs`; callers
/// that record outcomes call [`MetricsEngine::invalidate_sources`].
pub struct MetricsEngine<S: RecordStore> {
    store: Arc<S>,
    tracker: Arc<SourcePerformanceTracker>,
    threshold: Arc<ConfidenceThresholdAdapter>,
    clock: Arc<dyn Clock>,
    config: MetricsConfig,
    sources_cache: ExpiringCache<Vec<SourcePriority>>,
}

impl<S: RecordStore> MetricsEngine<S> {
    /// Create an engine reading the system clock
    pub fn new(
        store: Arc<S>,
        tracker: Arc<SourcePerformanceTracker>,
        threshold: Arc<ConfidenceThresholdAdapter>,
        config: MetricsConfig,
    ) -> Self {
        Self::with_clock(store, tracker, threshold, config, Arc::new(SystemClock))
    }

    /// Create an engine with an injected clock
    pub fn with_clock(
        store: Arc<S>,
        tracker: Arc<SourcePerformanceTracker>,
        threshold: Arc<ConfidenceThresholdAdapter>,
        config: MetricsConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let sources_cache = ExpiringCache::new(config.cache_ttl(), clock.clone());
        Self {
            store,
            tracker,
            threshold,
            clock,
            config,
            sources_cache,
        }
    }

    /// Get the engine configuration
    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Total records in the store
    pub fn total_queries(&self) -> Result<usize, MetricsError> {
        self.store.count().map_err(store_error)
    }

    /// Full-history mean relevance, 0.0 when empty
    pub fn avg_relevance(&self) -> Result<f64, MetricsError> {
        Ok(self.store.stats().map_err(store_error)?.mean_relevance)
    }

    /// Full-history mean confidence, 0.0 when empty
    pub fn avg_confidence(&self) -> Result<f64, MetricsError> {
        Ok(self.store.stats().map_err(store_error)?.mean_confidence)
    }

    /// Compare mean relevance of the latest window with the one before it
    ///
    /// A heuristic direction signal, not a significance test.
    pub fn improvement_trend(&self, window_size: usize) -> Result<TrendReport, MetricsError> {
        let pair = self.store.read_window_pair(window_size).map_err(store_error)?;
        if !pair.sufficient {
            return Ok(TrendReport::insufficient(window_size));
        }

        let recent_mean = mean_relevance(&pair.recent);
        let older_mean = mean_relevance(&pair.older);
        Ok(TrendReport {
            trend: recent_mean - older_mean,
            window_size,
            recent_mean,
            older_mean,
            insufficient_data: false,
        })
    }

    /// Top `k` sources by current priority
    pub fn top_sources(&self, k: usize) -> Result<Vec<SourcePriority>, MetricsError> {
        let ranked = self
            .sources_cache
            .get_or_try_insert_with(|| self.tracker.top(usize::MAX).map_err(MetricsError::from))?;
        Ok(ranked.into_iter().take(k).collect())
    }

    /// Drop cached source figures after the tracker changes
    pub fn invalidate_sources(&self) -> Result<(), MetricsError> {
        self.sources_cache.invalidate()
    }

    /// Records in the hour and day ending at `now_ms`
    pub fn time_window_counts(&self, now_ms: u64) -> Result<TimeWindowCounts, MetricsError> {
        let last_hour = self
            .store
            .count_between(now_ms.saturating_sub(HOUR_MS), now_ms)
            .map_err(store_error)?;
        let last_day = self
            .store
            .count_between(now_ms.saturating_sub(DAY_MS), now_ms)
            .map_err(store_error)?;
        Ok(TimeWindowCounts { last_hour, last_day })
    }

    /// Assemble a full snapshot using the configured window and top-k
    pub fn snapshot(&self) -> Result<MetricsSnapshot, MetricsError> {
        let now_ms = self.clock.now_millis();
        let stats = self.store.stats().map_err(store_error)?;
        let trend = self.improvement_trend(self.config.trend_window)?;
        let top_sources = self
            .top_sources(self.config.top_k)?
            .iter()
            .map(SourceSummary::from)
            .collect();

        Ok(MetricsSnapshot {
            total_queries: stats.count,
            avg_relevance: stats.mean_relevance,
            avg_confidence: stats.mean_confidence,
            improvement_trend: trend.trend,
            insufficient_data: trend.insufficient_data,
            top_sources,
            time_windows: self.time_window_counts(now_ms)?,
            confidence_threshold: self.threshold.current_threshold()?,
            generated_at_ms: now_ms,
        })
    }
}

fn store_error<E: std::error::Error>(e: E) -> MetricsError {
    MetricsError::Store(e.to_string())
}

fn mean_relevance(records: &[quarry_domain::ScoredRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.relevance_score).sum::<f64>() / records.len() as f64
}
