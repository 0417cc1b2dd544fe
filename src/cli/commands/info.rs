//! `pwm info` — print the vault summary.

use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `info` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    println!("{}", vault.info());
    Ok(())
}
