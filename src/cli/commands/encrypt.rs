//! `pwm encrypt` — place an arbitrary file into the vault as a file record.

use std::path::Path;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `encrypt` command.
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    let mut vault = open_vault(cli)?;
    let id = vault.import_file(file)?;

    output::success(&format!("Stored {} as record {id}", file.display()));

    Ok(())
}
