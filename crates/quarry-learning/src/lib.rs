//! Quarry Adaptive Learning
//!
//! The two feedback loops that turn scored outcomes into behavior:
//!
//! - [`SourcePerformanceTracker`]: a decaying priority per tool/source,
//!   used to rank candidate sources before each query
//! - [`ConfidenceThresholdAdapter`]: a single exponential-moving-average
//!   threshold deciding whether an answer is good enough or needs another
//!   retrieval round
//!
//! Both own their state outright. The orchestrator receives them at
//! construction; nothing here is global.
//!
//! # Priority formula
//!
//! ```text
//! priority = w_success * success_rate + w_relevance * avg_relevance + w_recency * recency
//! recency  = 0.5 ^ (idle_time / half_life)
//! ```
//!
//! # Threshold update
//!
//! ```text
//! threshold = clamp(threshold + lr * (confidence - threshold), min, max)
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [tracker]
//! success_threshold = 0.7
//! recency_half_life_hours = 168
//! neutral_priority = 0.5
//! max_consecutive_failures = 3
//!
//! [tracker.weights]
//! success_rate = 0.4
//! relevance = 0.4
//! recency = 0.2
//!
//! [threshold]
//! initial_threshold = 0.7
//! learning_rate = 0.05
//! min_threshold = 0.3
//! max_threshold = 0.9
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod threshold;
mod tracker;

pub use config::{PriorityWeights, ThresholdConfig, TrackerConfig};
pub use error::LearningError;
pub use threshold::{ConfidenceThresholdAdapter, ThresholdCheckpoint};
pub use tracker::SourcePerformanceTracker;
