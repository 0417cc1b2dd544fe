//! `pwm set` — change fields on an existing record.

use crate::cli::output;
use crate::cli::{open_vault, parse_assignment, Cli};
use crate::errors::{PwmError, Result};

/// Execute the `set` command.
pub fn execute(cli: &Cli, id: &str, fields: &[String]) -> Result<()> {
    let assignments = fields
        .iter()
        .map(|f| parse_assignment(f))
        .collect::<Result<Vec<_>>>()?;

    let mut vault = open_vault(cli)?;
    let mut record = vault
        .get(id)
        .cloned()
        .ok_or_else(|| PwmError::RecordNotFound(id.to_string()))?;

    let count = assignments.len();
    for (key, value) in assignments {
        record.set(key, value);
    }
    vault.update(record)?;

    output::success(&format!("Updated {count} field(s) on {id}"));

    Ok(())
}
