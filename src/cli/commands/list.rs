//! `pwm list` — display all records in a table.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    let records: Vec<_> = vault.records().iter().collect();

    output::info(&format!(
        "{} — {} record(s)",
        vault.directory().display(),
        records.len()
    ));
    output::print_records_table(&records);

    Ok(())
}
