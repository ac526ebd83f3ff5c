//! Quarry CLI library.
//!
//! Configuration handling, a read-only inspector over the record database
//! and learned state, and output formatting for the `quarry` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod inspect;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use inspect::{Inspector, ThresholdView};
pub use output::Formatter;
