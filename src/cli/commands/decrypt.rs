//! `pwm decrypt` — decrypt one record file and print its JSON.
//!
//! Works on any record file, inside a vault or not; nothing is written.

use std::path::Path;

use crate::cli::{cipher_id, load_settings, prompt_secret, Cli};
use crate::crypto;
use crate::errors::{PwmError, Result};
use crate::vault::Record;

/// Execute the `decrypt` command.
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    let settings = load_settings(cli)?;
    let cipher = cipher_id(cli, &settings);
    crypto::lookup(&cipher)?;

    let secret = prompt_secret(&cipher)?;
    let record = Record::read_file(file, &secret, &cipher)?;

    let json = serde_json::to_string_pretty(&record)
        .map_err(|e| PwmError::SerializationError(e.to_string()))?;
    println!("{json}");

    Ok(())
}
