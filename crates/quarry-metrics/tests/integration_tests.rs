//! Metrics over the SQLite store

use proptest::prelude::*;
use quarry_domain::{ManualClock, RecordStore, ScoredRecord, SourceUsage};
use quarry_learning::{
    ConfidenceThresholdAdapter, SourcePerformanceTracker, ThresholdConfig, TrackerConfig,
};
use quarry_metrics::{MetricsConfig, MetricsEngine};
use quarry_store::SqliteStore;
use std::sync::Arc;

fn engine(store: Arc<SqliteStore>) -> MetricsEngine<SqliteStore> {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let tracker = Arc::new(SourcePerformanceTracker::with_clock(
        TrackerConfig::default(),
        clock.clone(),
    ));
    let threshold = Arc::new(
        ConfidenceThresholdAdapter::with_clock(ThresholdConfig::default(), clock.clone()).unwrap(),
    );
    MetricsEngine::with_clock(store, tracker, threshold, MetricsConfig::default(), clock)
}

#[test]
fn test_sqlite_snapshot_after_appends() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    for i in 0..25u64 {
        let relevance = if i < 15 { 0.4 } else { 0.9 };
        store
            .append(ScoredRecord::new(
                format!("query {}", i),
                relevance,
                0.7,
                vec![SourceUsage::new("web", 50, relevance >= 0.7)],
                1_700_000_000_000 - 1_000 * (25 - i),
            ))
            .unwrap();
    }

    let snapshot = engine(store).snapshot().unwrap();
    assert_eq!(snapshot.total_queries, 25);
    assert!(!snapshot.insufficient_data);
    // Last 10 are all 0.9, the 10 before all 0.4
    assert!((snapshot.improvement_trend - 0.5).abs() < 1e-9);
    assert_eq!(snapshot.time_windows.last_hour, 25);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: the trend is always finite and flags short histories
    #[test]
    fn test_trend_is_finite(
        relevances in prop::collection::vec(0.0f64..=1.0, 0..40),
        window in 1usize..15,
    ) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        for (i, relevance) in relevances.iter().enumerate() {
            store
                .append(ScoredRecord::new("q", *relevance, 0.5, vec![], i as u64))
                .unwrap();
        }

        let report = engine(store).improvement_trend(window).unwrap();
        prop_assert!(report.trend.is_finite());
        prop_assert_eq!(report.insufficient_data, relevances.len() < 2 * window);
        prop_assert!((-1.0..=1.0).contains(&report.trend));
    }
}
