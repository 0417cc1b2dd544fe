//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::Settings;
use crate::crypto::{self, VaultSecret};
use crate::errors::{PwmError, Result};
use crate::vault::store::default_base_dir;
use crate::vault::Vault;

/// Environment variable consulted for the vault secret before prompting.
pub const SECRET_ENV: &str = "PWM_SECRET";

/// pwm: a directory of individually encrypted secret records.
#[derive(Parser)]
#[command(
    name = "pwm",
    about = "Encrypted file-per-record secrets vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault name (default: from config, otherwise Primary)
    #[arg(long, global = true)]
    pub vault: Option<String>,

    /// Base directory holding vaults (default: $HOME/.pwm)
    #[arg(long, global = true, env = "PWM_HOME")]
    pub dir: Option<PathBuf>,

    /// Cipher for record files: aes, xchacha, or "" for plaintext
    #[arg(long, global = true)]
    pub cipher: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Show vault location, size, mode and record count
    Info,

    /// List all records
    List,

    /// Find records whose keys or values match a pattern (regex)
    Find {
        /// Pattern to search for
        pattern: String,
    },

    /// Show one record's fields
    Show {
        /// Record id
        id: String,
        /// Print secret fields instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Add a new record (login, note, file)
    Add {
        /// Record kind
        #[arg(default_value = "login")]
        kind: String,
        /// Initial fields as KEY=VALUE
        fields: Vec<String>,
    },

    /// Set fields on an existing record
    Set {
        /// Record id
        id: String,
        /// Fields as KEY=VALUE
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Encrypt a file and place it into the vault
    Encrypt {
        /// Path to the file to import
        file: PathBuf,
    },

    /// Decrypt a single record file and print it
    Decrypt {
        /// Path to the record file
        file: PathBuf,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Base directory from `--dir`/`PWM_HOME`, or `$HOME/.pwm`.
pub fn base_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.dir {
        Some(dir) => Ok(dir.clone()),
        None => default_base_dir(),
    }
}

/// Settings from `<base>/config.toml`.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(&base_dir(cli)?)
}

/// Cipher id from `--cipher`, falling back to the configured one.
pub fn cipher_id(cli: &Cli, settings: &Settings) -> String {
    cli.cipher
        .clone()
        .unwrap_or_else(|| settings.cipher.clone())
}

/// Get the vault secret, trying in order:
/// 1. nothing at all for plaintext vaults
/// 2. `PWM_SECRET` env var (scripts/CI)
/// 3. Interactive prompt
pub fn prompt_secret(cipher_id: &str) -> Result<VaultSecret> {
    if cipher_id == crypto::PLAINTEXT {
        return Ok(VaultSecret::new(""));
    }

    if let Ok(secret) = std::env::var(SECRET_ENV) {
        if !secret.is_empty() {
            return Ok(VaultSecret::new(secret));
        }
    }

    let secret = dialoguer::Password::new()
        .with_prompt("Enter vault secret")
        .interact()
        .map_err(|e| PwmError::CommandFailed(format!("secret prompt: {e}")))?;
    Ok(VaultSecret::new(secret))
}

/// Create (if needed) and load the vault selected by the CLI arguments.
pub fn open_vault(cli: &Cli) -> Result<Vault> {
    let settings = load_settings(cli)?;
    let base = base_dir(cli)?;
    let cipher = cipher_id(cli, &settings);

    // Reject a bad cipher before asking for a secret.
    crypto::lookup(&cipher)?;
    let secret = prompt_secret(&cipher)?;

    let name = cli.vault.as_deref().unwrap_or(&settings.default_vault);
    let verbose = cli.verbose.max(settings.verbose);
    let mut vault = Vault::create(Some(name), Some(&base), &cipher, secret, verbose)?
        .with_workers(settings.workers);
    vault.read()?;
    Ok(vault)
}

/// Split a `KEY=VALUE` argument.
pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(PwmError::CommandFailed(format!(
            "expected KEY=VALUE, got '{arg}'"
        ))),
    }
}
