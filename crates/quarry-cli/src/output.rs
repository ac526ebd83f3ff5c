//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::inspect::ThresholdView;
use colored::*;
use quarry_domain::{ScoredRecord, SourcePriority};
use quarry_metrics::{MetricsSnapshot, SourceSummary};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const QUERY_WIDTH: usize = 48;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a metrics snapshot.
    pub fn format_snapshot(&self, snapshot: &MetricsSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
            OutputFormat::Table => Ok(self.format_snapshot_table(snapshot)),
        }
    }

    /// Format stored records.
    pub fn format_records(&self, records: &[ScoredRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_records_json(records),
            OutputFormat::Table => Ok(self.format_records_table(records)),
        }
    }

    /// Format source priorities.
    pub fn format_sources(&self, sources: &[SourcePriority]) -> Result<String> {
        let summaries: Vec<SourceSummary> = sources.iter().map(SourceSummary::from).collect();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&summaries)?),
            OutputFormat::Table => Ok(self.format_sources_table(&summaries)),
        }
    }

    /// Format the threshold state.
    pub fn format_threshold(&self, view: &ThresholdView) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
            OutputFormat::Table => {
                let checkpoint = match (&view.checkpoint_path, view.restored) {
                    (Some(path), true) => path.display().to_string(),
                    (Some(path), false) => format!("{} (not written yet)", path.display()),
                    (None, _) => "not configured".to_string(),
                };
                Ok(key_value_table(vec![
                    ("Threshold", format!("{:.4}", view.threshold)),
                    ("Updates", view.updates.to_string()),
                    (
                        "Bounds",
                        format!("[{:.2}, {:.2}]", view.min_threshold, view.max_threshold),
                    ),
                    ("Learning rate", format!("{:.3}", view.learning_rate)),
                    ("Checkpoint", checkpoint),
                ]))
            }
        }
    }

    fn format_snapshot_table(&self, snapshot: &MetricsSnapshot) -> String {
        let trend = if snapshot.insufficient_data {
            self.colorize("insufficient data", "yellow")
        } else if snapshot.improvement_trend > 0.0 {
            self.colorize(&format!("+{:.3}", snapshot.improvement_trend), "green")
        } else if snapshot.improvement_trend < 0.0 {
            self.colorize(&format!("{:.3}", snapshot.improvement_trend), "red")
        } else {
            format!("{:.3}", snapshot.improvement_trend)
        };

        let mut out = key_value_table(vec![
            ("Total queries", snapshot.total_queries.to_string()),
            ("Avg relevance", format!("{:.3}", snapshot.avg_relevance)),
            ("Avg confidence", format!("{:.3}", snapshot.avg_confidence)),
            ("Improvement trend", trend),
            ("Last hour", snapshot.time_windows.last_hour.to_string()),
            ("Last day", snapshot.time_windows.last_day.to_string()),
            (
                "Confidence threshold",
                format!("{:.4}", snapshot.confidence_threshold),
            ),
        ]);

        if !snapshot.top_sources.is_empty() {
            out.push_str("\n\n");
            out.push_str(&self.format_sources_table(&snapshot.top_sources));
        }
        out
    }

    fn format_records_json(&self, records: &[ScoredRecord]) -> Result<String> {
        // Create a serializable representation
        let json_records: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                let sources: Vec<serde_json::Value> = r
                    .sources_used
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "source_id": s.source_id,
                            "latency_ms": s.latency_ms,
                            "contributed_to_high_relevance": s.contributed_to_high_relevance
                        })
                    })
                    .collect();
                serde_json::json!({
                    "id": r.id.to_string(),
                    "timestamp": r.timestamp,
                    "query_text": r.query_text,
                    "relevance_score": r.relevance_score,
                    "confidence_score": r.confidence_score,
                    "sources_used": sources,
                    "session_id": r.session_id
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_records)?)
    }

    fn format_records_table(&self, records: &[ScoredRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No records found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Timestamp", "Query", "Relevance", "Confidence", "Sources"]);

        for record in records {
            let id: String = record.id.to_string().chars().take(8).collect();
            let sources: Vec<&str> = record
                .sources_used
                .iter()
                .map(|s| s.source_id.as_str())
                .collect();
            builder.push_record([
                id,
                record.timestamp.to_string(),
                truncate(&record.query_text, QUERY_WIDTH),
                format!("{:.3}", record.relevance_score),
                format!("{:.3}", record.confidence_score),
                sources.join(", "),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn format_sources_table(&self, sources: &[SourceSummary]) -> String {
        if sources.is_empty() {
            return self.colorize("No sources tracked.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "Source",
            "Name",
            "Priority",
            "Uses",
            "Success",
            "Avg relevance",
            "Avg latency",
        ]);

        for source in sources {
            builder.push_record([
                source.source_id.clone(),
                source.display_name.clone(),
                format!("{:.3}", source.priority_score),
                source.total_uses.to_string(),
                format!("{:.0}%", source.success_rate * 100.0),
                format!("{:.3}", source.avg_relevance),
                format!("{:.0} ms", source.avg_latency_ms),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn key_value_table(rows: Vec<(&str, String)>) -> String {
    let mut builder = Builder::default();
    for (key, value) in rows {
        builder.push_record([key.to_string(), value]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let head: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", head)
}
