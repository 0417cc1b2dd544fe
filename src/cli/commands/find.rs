//! `pwm find` — search keys and values of every record.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `find` command.
pub fn execute(cli: &Cli, pattern: &str) -> Result<()> {
    let vault = open_vault(cli)?;
    let found = vault.find(pattern);

    output::info(&format!("{} record(s) match '{pattern}'", found.len()));
    output::print_records_table(&found);

    Ok(())
}
