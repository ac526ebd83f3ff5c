//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// `path` is the file the other commands read, which may not exist yet.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                println!(
                    "{}",
                    formatter.warning(&format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    ))
                );
                return Ok(());
            }

            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => Config::home_dir()?,
            };
            Config::rooted_at(&dir).save_to(path)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
            println!(
                "{}",
                formatter.info("Add [[agent.sources]] entries for the tools the agent may call")
            );
        }
    }
    Ok(())
}
