use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PwmError, Result};
use crate::vault::store::{DEFAULT_VAULT_NAME, DEFAULT_WORKERS};

/// Vault configuration, loaded from `<base>/config.toml`.
///
/// Every field has a sensible default so the vault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Which vault to open when none is specified.
    #[serde(default = "default_vault")]
    pub default_vault: String,

    /// Cipher id for record files (`aes`, `xchacha`, or empty for plaintext).
    #[serde(default = "default_cipher")]
    pub cipher: String,

    /// Threads used for bulk reads and flushes.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Log verbosity (0 = warnings only).
    #[serde(default)]
    pub verbose: u8,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault() -> String {
    DEFAULT_VAULT_NAME.to_string()
}

fn default_cipher() -> String {
    "aes".to_string()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_vault: default_vault(),
            cipher: default_cipher(),
            workers: default_workers(),
            verbose: 0,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the base directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<base_dir>/config.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let config_path = base_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let mut settings: Settings = toml::from_str(&contents).map_err(|e| {
            PwmError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;
        settings.workers = settings.workers.max(1);

        Ok(settings)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.default_vault, "Primary");
        assert_eq!(s.cipher, "aes");
        assert_eq!(s.workers, 4);
        assert_eq!(s.verbose, 0);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.default_vault, "Primary");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
default_vault = "Work"
cipher = "xchacha"
workers = 8
verbose = 2
"#;
        fs::write(tmp.path().join("config.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.default_vault, "Work");
        assert_eq!(settings.cipher, "xchacha");
        assert_eq!(settings.workers, 8);
        assert_eq!(settings.verbose, 2);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "cipher = \"\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.cipher, "");
        assert_eq!(settings.default_vault, "Primary");
        assert_eq!(settings.workers, 4);
    }

    #[test]
    fn load_clamps_zero_workers() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "workers = 0\n").unwrap();
        assert_eq!(Settings::load(tmp.path()).unwrap().workers, 1);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(PwmError::ConfigError(_))));
    }
}
