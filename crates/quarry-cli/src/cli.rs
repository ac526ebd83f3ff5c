//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quarry CLI - Inspect what a Quarry research agent has learned.
#[derive(Debug, Parser)]
#[command(name = "quarry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "QUARRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Record database path (overrides the configured one)
    #[arg(short, long, global = true, env = "QUARRY_DB")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the metrics snapshot
    Metrics,

    /// List processed queries, newest first
    History(HistoryArgs),

    /// Show learned source priorities
    Sources(SourcesArgs),

    /// Show the adaptive confidence threshold
    Threshold,

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Maximum number of records
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Records to skip
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Only records with at least this relevance (0.0-1.0)
    #[arg(short = 'r', long)]
    pub min_relevance: Option<f64>,
}

/// Arguments for the sources command.
#[derive(Debug, Parser)]
pub struct SourcesArgs {
    /// Show only the top N sources
    #[arg(short, long)]
    pub top: Option<usize>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
