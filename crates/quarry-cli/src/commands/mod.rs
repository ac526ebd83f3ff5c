//! Command implementations.

mod config;
mod history;
mod metrics;
mod sources;
mod threshold;

pub use config::execute_config;
pub use history::execute_history;
pub use metrics::execute_metrics;
pub use sources::execute_sources;
pub use threshold::execute_threshold;
