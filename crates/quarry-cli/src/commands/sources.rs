//! Sources command implementation.

use crate::cli::SourcesArgs;
use crate::error::Result;
use crate::inspect::Inspector;
use crate::output::Formatter;

/// Execute the sources command.
pub fn execute_sources(args: SourcesArgs, inspector: &Inspector, formatter: &Formatter) -> Result<()> {
    let sources = inspector.sources(args.top)?;
    println!("{}", formatter.format_sources(&sources)?);
    Ok(())
}
