//! Human-readable vault summary built from cached metadata only.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Snapshot of what a vault last learned about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultInfo {
    pub directory: PathBuf,
    pub modified_at: Option<DateTime<Utc>>,
    pub size: u64,
    pub mode: String,
    pub records: usize,
    /// Empty when the vault stores plaintext.
    pub cipher: String,
    pub last_backup: Option<String>,
}

impl fmt::Display for VaultInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modified = self
            .modified_at
            .map_or_else(|| "unknown".to_string(), |t| t.to_rfc3339());
        let mode = if self.mode.is_empty() { "unknown" } else { &self.mode };
        let cipher = if self.cipher.is_empty() { "no" } else { &self.cipher };

        writeln!(f, "vault {}", self.directory.display())?;
        writeln!(f, "Last modified: {modified}")?;
        writeln!(f, "Size {}, mode {mode}", format_size(self.size))?;
        if let Some(backup) = &self.last_backup {
            writeln!(f, "Last backup: {backup}")?;
        }
        write!(f, "{} records, encrypted with {cipher} cipher", self.records)
    }
}

/// Format a byte count with binary units, e.g. `4.0 KB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_picks_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(4096), "4.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }

    #[test]
    fn display_lists_every_field() {
        let info = VaultInfo {
            directory: PathBuf::from("/home/u/.pwm/Primary"),
            modified_at: None,
            size: 4096,
            mode: "drwx------".into(),
            records: 3,
            cipher: "aes".into(),
            last_backup: Some("abc.aes-2024-01-01T00:00:00.000000000Z".into()),
        };
        let text = info.to_string();
        assert!(text.contains("vault /home/u/.pwm/Primary"));
        assert!(text.contains("Last modified: unknown"));
        assert!(text.contains("Size 4.0 KB, mode drwx------"));
        assert!(text.contains("Last backup: abc.aes-"));
        assert!(text.ends_with("3 records, encrypted with aes cipher"));
    }

    #[test]
    fn display_plaintext_vault() {
        let info = VaultInfo {
            directory: PathBuf::from("/v"),
            modified_at: None,
            size: 0,
            mode: String::new(),
            records: 0,
            cipher: String::new(),
            last_backup: None,
        };
        assert!(info.to_string().ends_with("0 records, encrypted with no cipher"));
    }
}
