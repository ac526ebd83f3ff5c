//! History command implementation.

use crate::cli::HistoryArgs;
use crate::error::{CliError, Result};
use crate::inspect::Inspector;
use crate::output::Formatter;

/// Execute the history command.
pub fn execute_history(args: HistoryArgs, inspector: &Inspector, formatter: &Formatter) -> Result<()> {
    if args.limit == 0 {
        return Err(CliError::InvalidInput("Limit must be greater than 0".to_string()));
    }

    let records = inspector.history(args.limit, args.offset, args.min_relevance)?;
    println!("{}", formatter.format_records(&records)?);
    Ok(())
}
