//! `pwm add` — create a record from a kind template and persist it.

use crate::cli::output;
use crate::cli::{open_vault, parse_assignment, Cli};
use crate::errors::Result;
use crate::vault::RecordKind;

/// Execute the `add` command.
pub fn execute(cli: &Cli, kind: &str, fields: &[String]) -> Result<()> {
    let kind: RecordKind = kind.parse()?;
    let assignments = fields
        .iter()
        .map(|f| parse_assignment(f))
        .collect::<Result<Vec<_>>>()?;

    let mut vault = open_vault(cli)?;
    let record = vault.add_record(kind);
    for (key, value) in assignments {
        record.set(key, value);
    }
    let record = record.clone();
    let id = record.id().to_string();
    vault.update(record)?;

    output::success(&format!("Added {kind} record {id}"));
    output::tip(&format!("Run `pwm show {id}` to view it."));

    Ok(())
}
