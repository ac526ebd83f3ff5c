//! Quarry Research Agent
//!
//! The orchestrator that ties the record store, the adaptive learning
//! components, metrics and alerting into one query pipeline.
//!
//! # Pipeline
//!
//! ```text
//! rank sources -> call tools (parallel, timed) -> synthesize
//!     -> [confidence below threshold: next sources, synthesize again]
//!     -> score relevance -> validate -> append
//!     -> tracker outcomes, cache invalidation, threshold update
//!     -> alert evaluation -> optional report hand-off
//! ```
//!
//! Tool failures never fail a query. Synthesis, validation and append
//! failures fail only that query and leave learned state untouched.
//!
//! # Configuration
//!
//! ```toml
//! default_max_sources = 3
//! max_rounds = 2
//! tool_timeout_secs = 15
//! checkpoint_path = "/var/lib/quarry/threshold.json"
//!
//! [[sources]]
//! id = "web_search"
//! display_name = "Web Search"
//!
//! [tracker]
//! success_threshold = 0.7
//!
//! [threshold]
//! learning_rate = 0.05
//!
//! [alerts]
//! cooldown_secs = 3600
//! ```

#![warn(missing_docs)]

mod agent;
mod config;
mod error;
pub mod scoring;
mod worker;

pub use agent::{ResearchAgent, ResearchRequest, ResearchResult};
pub use config::{AgentConfig, ScoringConfig, SourceConfig};
pub use error::AgentError;
pub use worker::CheckpointWorker;
