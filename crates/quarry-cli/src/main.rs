//! Quarry CLI - inspect a research agent's records and learned state.

use clap::Parser;
use quarry_cli::commands;
use quarry_cli::{Cli, Command, Config, Formatter, Inspector};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> quarry_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    if let Some(database) = cli.database {
        config.database_path = Some(database);
    }

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    // Every command except `config` reads the record database
    match cli.command {
        Command::Config(args) => {
            commands::execute_config(args, &config, &config_path, &formatter)?;
        }
        Command::Metrics => {
            commands::execute_metrics(&Inspector::open(&config)?, &formatter)?;
        }
        Command::History(args) => {
            commands::execute_history(args, &Inspector::open(&config)?, &formatter)?;
        }
        Command::Sources(args) => {
            commands::execute_sources(args, &Inspector::open(&config)?, &formatter)?;
        }
        Command::Threshold => {
            commands::execute_threshold(&Inspector::open(&config)?, &formatter)?;
        }
    }

    Ok(())
}
