//! Metrics command implementation.

use crate::error::Result;
use crate::inspect::Inspector;
use crate::output::Formatter;

/// Execute the metrics command.
pub fn execute_metrics(inspector: &Inspector, formatter: &Formatter) -> Result<()> {
    let snapshot = inspector.metrics()?;
    println!("{}", formatter.format_snapshot(&snapshot)?);
    Ok(())
}
