//! Configuration for the research agent

use crate::AgentError;
use quarry_alerts::AlertConfig;
use quarry_learning::{ThresholdConfig, TrackerConfig};
use quarry_metrics::MetricsConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A tool/source the agent may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Identifier passed to the tool provider
    pub id: String,

    /// Human-readable name; defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SourceConfig {
    /// Source with no display name
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }
}

/// Weights and cutoffs for lexical relevance scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of query coverage by the answer
    /// Default: 0.6
    pub answer_weight: f64,

    /// Weight of the best query coverage by any single source
    /// Default: 0.4
    pub source_weight: f64,

    /// Relevance at which contributing sources are flagged
    /// Default: 0.7
    pub high_relevance: f64,

    /// Query coverage a source needs to count as contributing
    /// Default: 0.3
    pub min_contribution: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            answer_weight: 0.6,
            source_weight: 0.4,
            high_relevance: 0.7,
            min_contribution: 0.3,
        }
    }
}

impl ScoringConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.answer_weight < 0.0 || self.source_weight < 0.0 {
            return Err("scoring weights must be non-negative".to_string());
        }
        if ((self.answer_weight + self.source_weight) - 1.0).abs() > 1e-6 {
            return Err("answer_weight and source_weight must sum to 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.high_relevance) || !(0.0..=1.0).contains(&self.min_contribution) {
            return Err("high_relevance and min_contribution must be within [0.0, 1.0]".to_string());
        }
        Ok(())
    }
}

/// Configuration for the research agent and every component it owns
///
/// Missing TOML sections fall back to their defaults.
///
/// # Examples
///
/// ```
/// use quarry_agent::AgentConfig;
///
/// let config = AgentConfig::from_toml(r#"
///     max_rounds = 3
///
///     [[sources]]
///     id = "web_search"
///     display_name = "Web Search"
///
///     [threshold]
///     learning_rate = 0.1
/// "#).unwrap();
///
/// assert_eq!(config.max_rounds, 3);
/// assert_eq!(config.sources[0].id, "web_search");
/// assert_eq!(config.threshold.learning_rate, 0.1);
/// assert_eq!(config.tracker.success_threshold, 0.7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Candidate sources, ranked by the tracker before each query
    pub sources: Vec<SourceConfig>,

    /// Sources called per round when the request does not say
    /// Default: 3
    pub default_max_sources: usize,

    /// Retrieval rounds per query, including the first
    /// Default: 2
    pub max_rounds: usize,

    /// Timeout for a single tool call (in seconds)
    /// Default: 15 seconds
    pub tool_timeout_secs: u64,

    /// Timeout for one synthesis call (in seconds)
    /// Default: 60 seconds
    pub synthesis_timeout_secs: u64,

    /// Timeout for the urgency classifier (in seconds)
    /// Default: 10 seconds
    pub classify_timeout_secs: u64,

    /// Timeout for the report hand-off (in seconds)
    /// Default: 30 seconds
    pub report_timeout_secs: u64,

    /// Where the threshold checkpoint is kept; none disables checkpoints
    pub checkpoint_path: Option<PathBuf>,

    /// How often the checkpoint worker runs (in minutes)
    /// Default: 5 minutes
    pub checkpoint_interval_minutes: u64,

    /// Source tracker settings
    pub tracker: TrackerConfig,

    /// Confidence threshold settings
    pub threshold: ThresholdConfig,

    /// Metrics engine settings
    pub metrics: MetricsConfig,

    /// Alert evaluator settings
    pub alerts: AlertConfig,

    /// Relevance scoring settings
    pub scoring: ScoringConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            default_max_sources: 3,
            max_rounds: 2,
            tool_timeout_secs: 15,
            synthesis_timeout_secs: 60,
            classify_timeout_secs: 10,
            report_timeout_secs: 30,
            checkpoint_path: None,
            checkpoint_interval_minutes: 5,
            tracker: TrackerConfig::default(),
            threshold: ThresholdConfig::default(),
            metrics: MetricsConfig::default(),
            alerts: AlertConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Add a candidate source
    pub fn with_source(mut self, id: impl Into<String>) -> Self {
        self.sources.push(SourceConfig::new(id));
        self
    }

    /// Source ids in configured order
    pub fn source_ids(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.id.clone()).collect()
    }

    /// Tool call timeout as a Duration
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Synthesis timeout as a Duration
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    /// Classifier timeout as a Duration
    pub fn classify_timeout(&self) -> Duration {
        Duration::from_secs(self.classify_timeout_secs)
    }

    /// Report hand-off timeout as a Duration
    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }

    /// Checkpoint worker interval as a Duration
    pub fn checkpoint_interval(&self) -> Duration {
        Duration::from_secs(self.checkpoint_interval_minutes * 60)
    }

    /// Validate this configuration and every component configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_max_sources == 0 {
            return Err("default_max_sources must be greater than 0".to_string());
        }
        if self.max_rounds == 0 {
            return Err("max_rounds must be greater than 0".to_string());
        }
        if self.tool_timeout_secs == 0
            || self.synthesis_timeout_secs == 0
            || self.classify_timeout_secs == 0
            || self.report_timeout_secs == 0
        {
            return Err("timeouts must be greater than 0".to_string());
        }
        if self.checkpoint_interval_minutes == 0 {
            return Err("checkpoint_interval_minutes must be greater than 0".to_string());
        }
        if let Some(source) = self.sources.iter().find(|s| s.id.trim().is_empty()) {
            return Err(format!("source id must not be empty (display name {:?})", source.display_name));
        }
        let mut seen = HashSet::new();
        if let Some(source) = self.sources.iter().find(|s| !seen.insert(s.id.as_str())) {
            return Err(format!("source id '{}' is configured more than once", source.id));
        }

        self.tracker.validate()?;
        self.threshold.validate()?;
        self.metrics.validate()?;
        self.alerts.validate()?;
        self.scoring.validate()?;
        Ok(())
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, AgentError> {
        toml::from_str(toml_str).map_err(|e| AgentError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, AgentError> {
        toml::to_string_pretty(self)
            .map_err(|e| AgentError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AgentError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&contents)?;
        config.validate().map_err(AgentError::Config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_rounds, 2);
        assert_eq!(config.checkpoint_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let config = AgentConfig {
            max_rounds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_source_id_rejected() {
        let config = AgentConfig::default().with_source(" ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_source_id_rejected() {
        let config = AgentConfig::default()
            .with_source("docs")
            .with_source("news")
            .with_source("docs");
        let err = config.validate().unwrap_err();
        assert!(err.contains("docs"));

        let toml = "[[sources]]\nid = \"web\"\n\n[[sources]]\nid = \"web\"\n";
        assert!(AgentConfig::from_toml(toml).unwrap().validate().is_err());
    }

    #[test]
    fn test_component_errors_surface() {
        let mut config = AgentConfig::default();
        config.threshold.min_threshold = 0.95;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AgentConfig::default().with_source("web").with_source("news");
        config.checkpoint_path = Some(PathBuf::from("/tmp/threshold.json"));

        let toml_str = config.to_toml().unwrap();
        let parsed = AgentConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AgentConfig::from_toml("max_rounds = \"two\""),
            Err(AgentError::Config(_))
        ));
    }

    #[test]
    fn test_from_file_validates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "default_max_sources = 0").unwrap();
        assert!(matches!(AgentConfig::from_file(&path), Err(AgentError::Config(_))));

        std::fs::write(&path, "default_max_sources = 4").unwrap();
        assert_eq!(AgentConfig::from_file(&path).unwrap().default_max_sources, 4);
    }

    #[test]
    fn test_missing_file() {
        assert!(AgentConfig::from_file("/nonexistent/quarry.toml").is_err());
    }
}
