//! Threshold command implementation.

use crate::error::Result;
use crate::inspect::Inspector;
use crate::output::Formatter;

/// Execute the threshold command.
pub fn execute_threshold(inspector: &Inspector, formatter: &Formatter) -> Result<()> {
    let view = inspector.threshold()?;
    println!("{}", formatter.format_threshold(&view)?);
    Ok(())
}
