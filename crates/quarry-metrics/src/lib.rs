//! Quarry Metrics
//!
//! Read-only aggregates over the record store, the source tracker and the
//! confidence threshold: totals, means, a rolling-window relevance trend,
//! top sources and trailing time-window counts.
//!
//! # Trend
//!
//! ```text
//! trend = mean(relevance of last N) - mean(relevance of the N before)
//! ```
//!
//! With fewer than `2 * N` records the trend is 0.0 and
//! `insufficient_data` is set; nothing is ever divided by zero.
//!
//! # Caching
//!
//! Source rankings are held in an [`ExpiringCache`] for five minutes by
//! default. The orchestrator invalidates it whenever it records an outcome.

#![warn(missing_docs)]

mod cache;
mod config;
mod engine;
mod error;

pub use cache::ExpiringCache;
pub use config::MetricsConfig;
pub use engine::{MetricsEngine, MetricsSnapshot, SourceSummary, TimeWindowCounts, TrendReport};
pub use error::MetricsError;
