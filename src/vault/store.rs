//! High-level vault operations used by the CLI and other collaborators.
//!
//! `Vault` owns one directory, one cipher id and one secret, plus the
//! records currently loaded from that directory.  It is passed explicitly
//! to whoever needs it; there is no process-wide "current vault".

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::backup::{self, BACKUP_DIR};
use super::files;
use super::info::VaultInfo;
use super::locks::{self, RecordLocks};
use super::pool;
use super::record::{file_name_for, is_storable_id, Record, RecordKind, WellKnownKey};
use super::search;
use crate::crypto::{self, VaultSecret, CIPHER_IDS};
use crate::errors::{PwmError, Result};

/// Vault name used when none is given.
pub const DEFAULT_VAULT_NAME: &str = "Primary";

/// Base directory under `$HOME` used when none is given.
pub const DEFAULT_BASE_DIR: &str = ".pwm";

/// Worker threads used for bulk reads and flushes unless configured.
pub const DEFAULT_WORKERS: usize = 4;

/// Field holding the base64 payload of an imported file.
pub const CONTENT_FIELD: &str = "Content";

/// The main vault handle.
pub struct Vault {
    /// Absolute path of the vault directory.
    directory: PathBuf,

    /// Active cipher id; empty means plaintext.
    cipher_id: String,

    /// Key material (zeroized on drop, never persisted).
    secret: VaultSecret,

    verbose: u8,

    workers: usize,

    /// Loaded records, in file-name order after `read`.
    records: Vec<Record>,

    locks: RecordLocks,

    // Last-known directory metadata, refreshed by `read`.
    modified_at: Option<DateTime<Utc>>,
    size: u64,
    mode: String,
    last_backup: Option<String>,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Build a vault handle over an existing `directory`.
    ///
    /// A relative `directory` is resolved against the working directory.
    ///
    /// The cipher id is resolved here, so an unknown id fails once at
    /// construction instead of on every record operation.
    pub fn new(
        directory: impl Into<PathBuf>,
        cipher_id: &str,
        secret: VaultSecret,
        verbose: u8,
    ) -> Result<Self> {
        crypto::lookup(cipher_id)?;

        let directory = directory.into();
        let directory = if directory.is_absolute() {
            directory
        } else {
            std::env::current_dir()?.join(directory)
        };

        Ok(Self {
            directory,
            cipher_id: cipher_id.to_string(),
            secret,
            verbose,
            workers: DEFAULT_WORKERS,
            records: Vec::new(),
            locks: RecordLocks::new(),
            modified_at: None,
            size: 0,
            mode: String::new(),
            last_backup: None,
        })
    }

    /// Bound the number of threads used for bulk I/O (at least one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Create (or reuse) the vault `name` under `base` and return its handle.
    ///
    /// `name` defaults to `Primary`, `base` to `$HOME/.pwm`.  Both
    /// directories are created when missing; calling this again with the
    /// same inputs is a no-op.  No record I/O happens here.
    pub fn create(
        name: Option<&str>,
        base: Option<&Path>,
        cipher_id: &str,
        secret: VaultSecret,
        verbose: u8,
    ) -> Result<Self> {
        let directory = resolve_directory(name, base)?;
        let vault = Self::new(directory, cipher_id, secret, verbose)?;

        files::create_private_dir(&vault.directory)
            .map_err(|e| PwmError::io_at(&vault.directory, e))?;
        if verbose > 0 {
            info!(directory = %vault.directory.display(), "vault ready");
        }
        Ok(vault)
    }

    // ------------------------------------------------------------------
    // Bulk load / flush
    // ------------------------------------------------------------------

    /// Load every record file in the vault directory.
    ///
    /// The scan is non-recursive and keeps only files belonging to the
    /// active cipher.  Loading is fail-fast: the first file that cannot be
    /// decrypted or decoded, or whose id does not match its file name,
    /// aborts the call with `CorruptRecord`, and the
    /// previously loaded records stay as they were.  On success the loaded
    /// set replaces the in-memory one.
    pub fn read(&mut self) -> Result<()> {
        let entries =
            fs::read_dir(&self.directory).map_err(|e| PwmError::io_at(&self.directory, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PwmError::io_at(&self.directory, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file && is_record_file(&entry.file_name().to_string_lossy(), &self.cipher_id) {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let secret = &self.secret;
        let cipher_id = self.cipher_id.as_str();
        let loaded = pool::run_bounded(&mut paths, self.workers, |path| {
            Record::read_file(path, secret, cipher_id)
                .and_then(|rec| check_file_name(path, &rec, cipher_id).map(|()| rec))
                .map_err(|e| match e {
                    e @ (PwmError::DecryptionFailed
                    | PwmError::SerializationError(_)
                    | PwmError::InvalidRecordId(_)) => PwmError::CorruptRecord {
                        path: path.clone(),
                        source: Box::new(e),
                    },
                    other => other,
                })
        });

        self.records = loaded.into_iter().collect::<Result<Vec<_>>>()?;
        self.refresh_metadata();

        if self.verbose > 0 {
            info!(
                directory = %self.directory.display(),
                records = self.records.len(),
                "vault loaded"
            );
        }
        Ok(())
    }

    /// Load the records again, e.g. after an external sync rewrote the
    /// directory.  On failure the current records are kept.
    pub fn reload(&mut self) -> Result<()> {
        self.read()
    }

    /// Persist every loaded record, spread over the worker pool.
    ///
    /// All records are attempted; the first error is returned.
    pub fn write_all(&mut self) -> Result<()> {
        let locks = &self.locks;
        let directory = self.directory.as_path();
        let secret = &self.secret;
        let cipher_id = self.cipher_id.as_str();
        let verbose = self.verbose;

        let results = pool::run_bounded(&mut self.records, self.workers, |rec| {
            write_locked(locks, directory, secret, cipher_id, verbose, rec)
        });
        results.into_iter().collect()
    }

    // ------------------------------------------------------------------
    // Single-record operations
    // ------------------------------------------------------------------

    /// Append a fresh, unsaved record of `kind` and return it for editing.
    pub fn add_record(&mut self, kind: RecordKind) -> &mut Record {
        self.records.push(Record::new(kind));
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    /// Insert or replace `rec` by id, then persist it.
    ///
    /// Any duplicate in-memory copies of the id are merged into one.
    pub fn update(&mut self, mut rec: Record) -> Result<()> {
        let index = match self.records.iter().position(|r| r.id() == rec.id()) {
            Some(index) => {
                if self.verbose > 0 {
                    info!(record = rec.id(), "update record");
                }
                rec.touch();
                self.records[index] = rec;
                self.dedupe_after(index);
                self.modified_at = Some(Utc::now());
                index
            }
            None => {
                self.records.push(rec);
                self.records.len() - 1
            }
        };

        write_locked(
            &self.locks,
            &self.directory,
            &self.secret,
            &self.cipher_id,
            self.verbose,
            &mut self.records[index],
        )
    }

    /// Persist one record with this vault's directory, secret and cipher.
    pub fn write_record(&self, rec: &mut Record) -> Result<()> {
        write_locked(
            &self.locks,
            &self.directory,
            &self.secret,
            &self.cipher_id,
            self.verbose,
            rec,
        )
    }

    /// Encrypt an arbitrary file into the vault as a `file` record.
    ///
    /// The bytes are kept base64-encoded in the `Content` field and the
    /// absolute source path is recorded as an attachment.  Returns the new
    /// record's id.
    pub fn import_file(&mut self, path: &Path) -> Result<String> {
        let data = fs::read(path).map_err(|e| PwmError::io_at(path, e))?;
        let source = fs::canonicalize(path).map_err(|e| PwmError::io_at(path, e))?;
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut rec = Record::new(RecordKind::File);
        rec.set(WellKnownKey::Name.as_str(), name);
        rec.set(WellKnownKey::File.as_str(), source.display().to_string());
        rec.set(CONTENT_FIELD, BASE64.encode(&data));
        rec.add_attachment(source.display().to_string());

        let id = rec.id().to_string();
        self.update(rec)?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Records matching `pattern` against keys or values, each at most once.
    pub fn find(&self, pattern: &str) -> Vec<&Record> {
        let found = search::find(&self.records, pattern);
        if self.verbose > 0 {
            info!(pattern, matches = found.len(), "search");
        }
        found
    }

    /// Summary of cached metadata; performs no I/O.
    pub fn info(&self) -> VaultInfo {
        VaultInfo {
            directory: self.directory.clone(),
            modified_at: self.modified_at,
            size: self.size,
            mode: self.mode.clone(),
            records: self.records.len(),
            cipher: self.cipher_id.clone(),
            last_backup: self.last_backup.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Sync collaborator
    // ------------------------------------------------------------------

    /// A copy of the current record set.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Replace the record set with `records` and persist all of them.
    ///
    /// When an id appears more than once, the last copy wins.
    pub fn replace_all(&mut self, records: Vec<Record>) -> Result<()> {
        let mut merged: Vec<Record> = Vec::with_capacity(records.len());
        for rec in records {
            match merged.iter_mut().find(|r| r.id() == rec.id()) {
                Some(existing) => *existing = rec,
                None => merged.push(rec),
            }
        }
        self.records = merged;
        self.modified_at = Some(Utc::now());
        self.write_all()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn cipher_id(&self) -> &str {
        &self.cipher_id
    }

    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Path of the file backing record `id`.
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.directory.join(file_name_for(id, &self.cipher_id))
    }

    /// Backups of record `id`, oldest first.
    pub fn backups_of(&self, id: &str) -> Vec<PathBuf> {
        backup::backups_of(&self.directory, &file_name_for(id, &self.cipher_id))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Remove later copies of the record stored at `index`.
    fn dedupe_after(&mut self, index: usize) {
        let id = self.records[index].id().to_string();
        let mut position = 0;
        self.records.retain(|r| {
            let keep = position <= index || r.id() != id;
            position += 1;
            keep
        });
    }

    fn refresh_metadata(&mut self) {
        match fs::metadata(&self.directory) {
            Ok(meta) => {
                self.size = meta.len();
                self.mode = files::mode_string(&meta);
                self.modified_at = meta.modified().ok().map(DateTime::<Utc>::from);
            }
            Err(e) => {
                warn!(directory = %self.directory.display(), error = %e, "unable to stat vault");
            }
        }
        self.last_backup = backup::latest(&self.directory);
    }
}

/// Write one record while holding its id's lock.
fn write_locked(
    locks: &RecordLocks,
    directory: &Path,
    secret: &VaultSecret,
    cipher_id: &str,
    verbose: u8,
    rec: &mut Record,
) -> Result<()> {
    let slot = locks.slot(rec.id());
    let _guard = locks::hold(&slot);

    if verbose > 1 {
        debug!(
            record = rec.id(),
            fields = ?rec.redacted_fields(),
            secret = %secret.redacted(),
            "write record"
        );
    } else if verbose > 0 {
        info!(record = rec.id(), cipher = cipher_id, "write record");
    }

    rec.write(directory, secret, cipher_id)
}

/// A loaded record must live in the file its id names; anything else would
/// be written back under a second name.
fn check_file_name(path: &Path, rec: &Record, cipher_id: &str) -> Result<()> {
    let expected = file_name_for(rec.id(), cipher_id);
    let matches = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy() == expected.as_str());
    if matches && is_storable_id(rec.id()) {
        Ok(())
    } else {
        Err(PwmError::InvalidRecordId(rec.id().to_string()))
    }
}

/// `true` when `name` is a record file for `cipher_id`.
///
/// Hidden files (temp files) never count.  In plaintext mode every file
/// counts except the ones owned by a registered cipher.
fn is_record_file(name: &str, cipher_id: &str) -> bool {
    if name.starts_with('.') || name == BACKUP_DIR {
        return false;
    }
    if cipher_id.is_empty() {
        return !CIPHER_IDS
            .iter()
            .any(|id| name.ends_with(&format!(".{id}")));
    }
    name.strip_suffix(cipher_id)
        .and_then(|stem| stem.strip_suffix('.'))
        .is_some_and(|stem| !stem.is_empty())
}

/// Resolve `<base>/<name>` as an absolute path without touching the disk.
pub fn resolve_directory(name: Option<&str>, base: Option<&Path>) -> Result<PathBuf> {
    let name = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_VAULT_NAME);

    if !files::is_single_component(name) {
        return Err(PwmError::InvalidDirectory(PathBuf::from(name)));
    }

    let base = match base {
        Some(base) => base.to_path_buf(),
        None => default_base_dir()?,
    };
    let base = if base.is_absolute() {
        base
    } else {
        std::env::current_dir()?.join(base)
    };

    Ok(base.join(name))
}

/// `$HOME/.pwm`.
pub fn default_base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_BASE_DIR))
        .ok_or_else(|| PwmError::ConfigError("cannot determine the home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_file_filter_with_cipher() {
        assert!(is_record_file("abc.aes", "aes"));
        assert!(!is_record_file("abc.xchacha", "aes"));
        assert!(!is_record_file("abcaes", "aes"));
        assert!(!is_record_file(".aes", "aes"));
        assert!(!is_record_file(".abc.aes.tmp", "aes"));
    }

    #[test]
    fn record_file_filter_plaintext() {
        assert!(is_record_file("abc", ""));
        assert!(!is_record_file("abc.aes", ""));
        assert!(!is_record_file(BACKUP_DIR, ""));
        assert!(!is_record_file(".abc.tmp", ""));
    }

    #[test]
    fn resolve_directory_defaults_name() {
        let dir = resolve_directory(None, Some(Path::new("/srv/pwm"))).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/pwm/Primary"));
        let dir = resolve_directory(Some(""), Some(Path::new("/srv/pwm"))).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/pwm/Primary"));
    }

    #[test]
    fn resolve_directory_rejects_escaping_names() {
        let base = Some(Path::new("/srv/pwm"));
        assert!(resolve_directory(Some(".."), base).is_err());
        assert!(resolve_directory(Some("a/b"), base).is_err());
        assert!(resolve_directory(Some("/etc"), base).is_err());
        assert!(resolve_directory(Some("Work"), base).is_ok());
    }

    #[test]
    fn resolve_directory_makes_relative_base_absolute() {
        let dir = resolve_directory(Some("Work"), Some(Path::new("rel"))).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("rel/Work"));
    }

    #[test]
    fn update_merges_stale_duplicates() {
        let base = tempfile::TempDir::new().unwrap();
        let mut vault = Vault::new(base.path(), "", VaultSecret::new(""), 0).unwrap();
        vault.records = vec![
            Record::with_id("a"),
            Record::with_id("dup"),
            Record::with_id("b"),
            Record::with_id("dup"),
        ];

        let mut rec = Record::with_id("dup");
        rec.set("Notes", "fresh");
        vault.update(rec).unwrap();

        let ids: Vec<&str> = vault.records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["a", "dup", "b"]);
        assert_eq!(vault.get("dup").unwrap().get("Notes"), Some("fresh"));
    }

    #[test]
    fn new_makes_directory_absolute() {
        let vault = Vault::new("rel/Work", "", VaultSecret::new(""), 0).unwrap();
        assert!(vault.directory().is_absolute());
        assert!(vault.directory().ends_with("rel/Work"));
    }

    #[test]
    fn file_name_must_match_record_id() {
        let rec = Record::with_id("a");
        assert!(check_file_name(Path::new("/v/a.aes"), &rec, "aes").is_ok());
        assert!(check_file_name(Path::new("/v/a"), &rec, "").is_ok());
        assert!(matches!(
            check_file_name(Path::new("/v/b.aes"), &rec, "aes"),
            Err(PwmError::InvalidRecordId(id)) if id == "a"
        ));
    }

    #[test]
    fn unknown_cipher_fails_at_construction() {
        let result = Vault::new("/tmp/none", "rot13", VaultSecret::new("s"), 0);
        assert!(matches!(result, Err(PwmError::UnknownCipher(_))));
    }
}
