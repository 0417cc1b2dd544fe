//! `pwm show` — print one record's fields.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{PwmError, Result};

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str, reveal: bool) -> Result<()> {
    let vault = open_vault(cli)?;
    let record = vault
        .get(id)
        .ok_or_else(|| PwmError::RecordNotFound(id.to_string()))?;

    output::info(&format!("{} ({})", record.name(), record.id()));
    output::print_record(record, reveal);
    if !reveal {
        output::tip("Pass --reveal to print secret fields.");
    }

    Ok(())
}
