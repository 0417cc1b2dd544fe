//! `pwm version` — display version and the registered ciphers.

use crate::crypto::CIPHER_IDS;
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!("pwm {}", env!("CARGO_PKG_VERSION"));
    println!("ciphers: {}", CIPHER_IDS.join(", "));
    Ok(())
}
