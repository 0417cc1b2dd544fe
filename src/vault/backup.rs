//! Backup rotation.
//!
//! Before a record file is overwritten, its current bytes are copied to
//! `<vault>/backups/<file_name>-<RFC3339 timestamp>`.  Rotation is
//! best-effort: a failure is logged and the write goes ahead, because
//! losing a backup is less harmful than losing the new data.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

use super::files;

/// Name of the backups subdirectory inside a vault.
pub const BACKUP_DIR: &str = "backups";

/// Path of the backup of `file_name` taken at `at`.
///
/// Nanosecond precision keeps two writes within the same second apart.
pub fn backup_path(directory: &Path, file_name: &str, at: DateTime<Utc>) -> PathBuf {
    let stamp = at.to_rfc3339_opts(SecondsFormat::Nanos, true);
    directory
        .join(BACKUP_DIR)
        .join(format!("{file_name}-{stamp}"))
}

/// Copy the current `directory/file_name` into the backups area.
///
/// Returns the backup path, or `None` when there was nothing to back up or
/// the copy failed (already logged).
pub fn rotate(directory: &Path, file_name: &str) -> Option<PathBuf> {
    match try_rotate(directory, file_name) {
        Ok(Some(path)) => {
            debug!(backup = %path.display(), "record backed up");
            Some(path)
        }
        Ok(None) => None,
        Err(e) => {
            warn!(record = file_name, error = %e, "unable to back up record, writing anyway");
            None
        }
    }
}

fn try_rotate(directory: &Path, file_name: &str) -> io::Result<Option<PathBuf>> {
    let source = directory.join(file_name);
    match fs::metadata(&source) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Ok(None),
        // Deleted behind our back: nothing to preserve.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    }

    files::create_private_dir(&directory.join(BACKUP_DIR))?;
    let target = backup_path(directory, file_name, Utc::now());
    fs::copy(&source, &target)?;
    files::restrict_permissions(&target)?;
    Ok(Some(target))
}

/// All backups of `file_name`, oldest first.
pub fn backups_of(directory: &Path, file_name: &str) -> Vec<PathBuf> {
    let prefix = format!("{file_name}-");
    let Ok(entries) = fs::read_dir(directory.join(BACKUP_DIR)) else {
        return Vec::new();
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
        .map(|entry| entry.path())
        .collect();
    // Same prefix and fixed-width UTC stamps, so name order is time order.
    found.sort();
    found
}

/// File name of the most recently modified backup, if any.
pub fn latest(directory: &Path) -> Option<String> {
    let entries = fs::read_dir(directory.join(BACKUP_DIR)).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((modified, entry.file_name().to_string_lossy().into_owned()))
        })
        .max()
        .map(|(_, name)| name)
}
