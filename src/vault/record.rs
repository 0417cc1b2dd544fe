//! The record entity and its on-disk protocol.
//!
//! A record is an id, a free-form field map, a list of attachment
//! references and a modification time.  Each record lives in exactly one
//! file, `<id>.<cipher_id>` (or `<id>` in plaintext mode), holding the
//! optionally encrypted JSON encoding of the record.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{backup, files};
use crate::crypto::{self, VaultSecret};
use crate::errors::{PwmError, Result};

/// Placeholder shown instead of secret-like field values.
const MASK: &str = "***";

// ---------------------------------------------------------------------------
// Well-known field keys
// ---------------------------------------------------------------------------

/// Whether a field holds something that must be masked in logs and views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Plain,
    Secret,
}

/// Field names with a fixed display priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownKey {
    Name,
    Login,
    Password,
    Url,
    Tags,
    File,
    Notes,
}

impl WellKnownKey {
    /// Display order; every other key follows lexicographically.
    pub const ORDER: [WellKnownKey; 7] = [
        WellKnownKey::Name,
        WellKnownKey::Login,
        WellKnownKey::Password,
        WellKnownKey::Url,
        WellKnownKey::Tags,
        WellKnownKey::File,
        WellKnownKey::Notes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WellKnownKey::Name => "Name",
            WellKnownKey::Login => "Login",
            WellKnownKey::Password => "Password",
            WellKnownKey::Url => "URL",
            WellKnownKey::Tags => "Tags",
            WellKnownKey::File => "File",
            WellKnownKey::Notes => "Notes",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|k| k.as_str() == key)
    }

    pub fn field_kind(self) -> FieldKind {
        match self {
            WellKnownKey::Password => FieldKind::Secret,
            _ => FieldKind::Plain,
        }
    }
}

// ---------------------------------------------------------------------------
// Record kinds
// ---------------------------------------------------------------------------

/// The template a new record starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordKind {
    #[default]
    Login,
    Note,
    File,
}

impl RecordKind {
    /// Empty fields every new record of this kind starts with.
    pub fn template(self) -> &'static [WellKnownKey] {
        match self {
            RecordKind::Login => &[
                WellKnownKey::Name,
                WellKnownKey::Login,
                WellKnownKey::Password,
                WellKnownKey::Url,
                WellKnownKey::Tags,
            ],
            RecordKind::Note => &[WellKnownKey::Name, WellKnownKey::Notes, WellKnownKey::Tags],
            RecordKind::File => &[WellKnownKey::Name, WellKnownKey::File, WellKnownKey::Tags],
        }
    }
}

impl FromStr for RecordKind {
    type Err = PwmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "login" => Ok(RecordKind::Login),
            "note" => Ok(RecordKind::Note),
            "file" => Ok(RecordKind::File),
            other => Err(PwmError::ConfigError(format!(
                "unknown record kind '{other}' — supported: login, note, file"
            ))),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Login => "login",
            RecordKind::Note => "note",
            RecordKind::File => "file",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A single vault record.
///
/// Unknown keys in the encoded form are ignored on read so newer writers
/// can add metadata without breaking older readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque id, also the on-disk file stem.  Never changes once assigned.
    id: String,

    #[serde(default)]
    fields: BTreeMap<String, String>,

    /// File references associated with the record (informational only).
    #[serde(default)]
    attachments: Vec<String>,

    /// Refreshed on every successful persist.
    modified_at: DateTime<Utc>,
}

impl Record {
    /// A fresh record with a new id and the empty template fields of `kind`.
    pub fn new(kind: RecordKind) -> Self {
        let mut record = Self::with_id(uuid::Uuid::new_v4().to_string());
        for key in kind.template() {
            record.fields.insert(key.as_str().to_string(), String::new());
        }
        record
    }

    /// A record with a caller-chosen id and no fields.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            attachments: Vec::new(),
            modified_at: Utc::now(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Insert or overwrite a field, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn attachments(&self) -> &[String] {
        &self.attachments
    }

    pub fn add_attachment(&mut self, reference: impl Into<String>) {
        self.attachments.push(reference.into());
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Mark the record as changed now.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// The `Name` field, or the id when no name is set.
    pub fn name(&self) -> &str {
        match self.get(WellKnownKey::Name.as_str()) {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }

    pub fn field_kind(&self, key: &str) -> FieldKind {
        WellKnownKey::from_key(key).map_or(FieldKind::Plain, WellKnownKey::field_kind)
    }

    /// Keys in display order: the well-known keys present on this record in
    /// their fixed order, then every other key lexicographically.
    pub fn ordered_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = WellKnownKey::ORDER
            .iter()
            .map(|k| k.as_str())
            .filter(|k| self.fields.contains_key(*k))
            .collect();

        // BTreeMap iteration is already lexicographic.
        keys.extend(
            self.fields
                .keys()
                .map(String::as_str)
                .filter(|k| WellKnownKey::from_key(k).is_none()),
        );
        keys
    }

    /// Field pairs in display order with secret values masked.
    pub fn redacted_fields(&self) -> Vec<(&str, &str)> {
        self.ordered_keys()
            .into_iter()
            .map(|key| {
                let value = match self.field_kind(key) {
                    FieldKind::Secret => MASK,
                    FieldKind::Plain => self.get(key).unwrap_or_default(),
                };
                (key, value)
            })
            .collect()
    }

    /// Name of this record's file for the given cipher id.
    pub fn file_name(&self, cipher_id: &str) -> String {
        file_name_for(&self.id, cipher_id)
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    /// Deterministic JSON encoding (field map is ordered).
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| PwmError::SerializationError(format!("record {}: {e}", self.id)))
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| PwmError::SerializationError(format!("record JSON: {e}")))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist this record into `directory`.
    ///
    /// 1. Refuse outright if the id is empty or is not a plain file name
    ///    (nothing touches the disk).
    /// 2. Copy any existing file into `backups/` (best-effort, logged).
    /// 3. Serialize, encrypt unless `cipher_id` is empty.
    /// 4. Write via temp file + rename, with owner-only permissions.
    ///
    /// `modified_at` only moves forward when the write succeeds.
    pub fn write(&mut self, directory: &Path, secret: &VaultSecret, cipher_id: &str) -> Result<()> {
        if self.id.is_empty() {
            return Err(PwmError::MissingRecordId);
        }
        if !is_storable_id(&self.id) {
            return Err(PwmError::InvalidRecordId(self.id.clone()));
        }

        let file_name = self.file_name(cipher_id);
        backup::rotate(directory, &file_name);

        let previous = self.modified_at;
        self.modified_at = Utc::now();

        // Inherent encoder, not `serde::Serialize::serialize`.
        let result = Record::serialize(self).and_then(|data| {
            let payload = crypto::encrypt(&data, secret, cipher_id)?;
            files::write_atomic(&directory.join(&file_name), &payload)
        });

        if result.is_err() {
            self.modified_at = previous;
        }
        result
    }

    /// Load one record file, forcing owner-only permissions first.
    pub fn read_file(path: &Path, secret: &VaultSecret, cipher_id: &str) -> Result<Self> {
        if let Err(e) = files::restrict_permissions(path) {
            warn!(path = %path.display(), error = %e, "unable to restrict record permissions");
        }

        let data = fs::read(path).map_err(|e| PwmError::io_at(path, e))?;
        let plaintext = crypto::decrypt(&data, secret, cipher_id)?;
        Self::deserialize(&plaintext)
    }
}

/// `true` when `id` can name a file directly inside the vault directory
/// that a later scan will load again.
///
/// Hidden names are reserved for temp files and `backups` for the backup
/// area.
pub fn is_storable_id(id: &str) -> bool {
    files::is_single_component(id) && !id.starts_with('.') && id != backup::BACKUP_DIR
}

/// File name of the record `id` under `cipher_id`.
pub fn file_name_for(id: &str, cipher_id: &str) -> String {
    if cipher_id.is_empty() {
        id.to_string()
    } else {
        format!("{id}.{cipher_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Record {
        let mut rec = Record::with_id("rec-1");
        rec.set("Login", "alice");
        rec.set("Password", "hunter2");
        rec.set("Custom", "z");
        rec.add_attachment("/tmp/scan.pdf");
        rec
    }

    #[test]
    fn new_login_record_has_template_fields() {
        let rec = Record::new(RecordKind::Login);
        assert!(!rec.id().is_empty());
        assert_eq!(rec.ordered_keys(), vec!["Name", "Login", "Password", "URL", "Tags"]);
        assert!(rec.fields().values().all(String::is_empty));
    }

    #[test]
    fn new_records_get_distinct_ids() {
        let a = Record::new(RecordKind::Note);
        let b = Record::new(RecordKind::Note);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn note_and_file_templates() {
        assert_eq!(Record::new(RecordKind::Note).ordered_keys(), vec!["Name", "Tags", "Notes"]);
        assert_eq!(Record::new(RecordKind::File).ordered_keys(), vec!["Name", "Tags", "File"]);
    }

    #[test]
    fn ordered_keys_puts_well_known_first() {
        let mut rec = Record::with_id("k");
        rec.set("Tags", "x");
        rec.set("Login", "a");
        rec.set("Custom", "z");
        rec.set("Password", "p");
        assert_eq!(rec.ordered_keys(), vec!["Login", "Password", "Tags", "Custom"]);
    }

    #[test]
    fn ordered_keys_sorts_custom_keys_lexicographically() {
        let mut rec = Record::with_id("k");
        rec.set("zeta", "");
        rec.set("Alpha", "");
        rec.set("Name", "n");
        rec.set("beta", "");
        assert_eq!(rec.ordered_keys(), vec!["Name", "Alpha", "beta", "zeta"]);
    }

    #[test]
    fn serialize_round_trips_exactly() {
        let rec = sample();
        let bytes = rec.serialize().unwrap();
        assert_eq!(Record::deserialize(&bytes).unwrap(), rec);
    }

    #[test]
    fn serialize_is_deterministic() {
        let rec = sample();
        assert_eq!(rec.serialize().unwrap(), rec.serialize().unwrap());
    }

    #[test]
    fn deserialize_ignores_unknown_keys() {
        let json = br#"{"id":"x","fields":{"Name":"n"},"attachments":[],
            "modified_at":"2024-01-02T03:04:05Z","color":"blue"}"#;
        let rec = Record::deserialize(json).unwrap();
        assert_eq!(rec.id(), "x");
        assert_eq!(rec.get("Name"), Some("n"));
    }

    #[test]
    fn deserialize_defaults_missing_collections() {
        let json = br#"{"id":"x","modified_at":"2024-01-02T03:04:05Z"}"#;
        let rec = Record::deserialize(json).unwrap();
        assert!(rec.fields().is_empty());
        assert!(rec.attachments().is_empty());
    }

    #[test]
    fn deserialize_rejects_garbage() {
        assert!(matches!(
            Record::deserialize(b"not json"),
            Err(PwmError::SerializationError(_))
        ));
    }

    #[test]
    fn password_is_masked_in_redacted_fields() {
        let rec = sample();
        let redacted = rec.redacted_fields();
        assert!(redacted.contains(&("Password", "***")));
        assert!(redacted.contains(&("Login", "alice")));
        assert_eq!(rec.field_kind("Password"), FieldKind::Secret);
        assert_eq!(rec.field_kind("password"), FieldKind::Plain);
    }

    #[test]
    fn name_falls_back_to_id() {
        let mut rec = Record::new(RecordKind::Login);
        assert_eq!(rec.name(), rec.id().to_string());
        rec.set("Name", "GitHub");
        assert_eq!(rec.name(), "GitHub");
    }

    #[test]
    fn file_name_depends_on_cipher() {
        let rec = Record::with_id("abc");
        assert_eq!(rec.file_name("aes"), "abc.aes");
        assert_eq!(rec.file_name(""), "abc");
    }

    #[test]
    fn record_kind_parses_case_insensitively() {
        assert_eq!("LOGIN".parse::<RecordKind>().unwrap(), RecordKind::Login);
        assert_eq!("note".parse::<RecordKind>().unwrap(), RecordKind::Note);
        assert!("card".parse::<RecordKind>().is_err());
    }

    #[test]
    fn write_without_id_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let mut rec = Record::with_id("");
        let secret = VaultSecret::new("s");

        let err = rec.write(dir.path(), &secret, "aes").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn write_rejects_ids_that_leave_the_directory() {
        let base = TempDir::new().unwrap();
        let dir = base.path().join("vault");
        fs::create_dir(&dir).unwrap();
        let secret = VaultSecret::new("s");

        for id in ["../escaped", "a/b", "/abs", "..", ".hidden", "backups"] {
            let mut rec = Record::with_id(id);
            let err = rec.write(&dir, &secret, "aes").unwrap_err();
            assert!(matches!(err, PwmError::InvalidRecordId(_)), "{id}");
            assert!(!err.is_fatal());
        }

        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        let siblings: Vec<_> = fs::read_dir(base.path()).unwrap().collect();
        assert_eq!(siblings.len(), 1);
    }

    #[test]
    fn storable_ids() {
        assert!(is_storable_id("3f2c7e2a-1b4d-4c41-9a57-1d2f0e9b1c11"));
        assert!(is_storable_id("rec-1"));
        assert!(!is_storable_id(""));
        assert!(!is_storable_id("../x"));
        assert!(!is_storable_id(".x"));
    }

    #[test]
    fn failed_write_keeps_old_timestamp() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        let mut rec = sample();
        let before = rec.modified_at();

        assert!(rec.write(&missing, &VaultSecret::new("s"), "aes").is_err());
        assert_eq!(rec.modified_at(), before);
    }

    #[test]
    fn write_then_read_file() {
        let dir = TempDir::new().unwrap();
        let secret = VaultSecret::new("file-secret");
        let mut rec = sample();
        rec.write(dir.path(), &secret, "xchacha").unwrap();

        let path = dir.path().join("rec-1.xchacha");
        let loaded = Record::read_file(&path, &secret, "xchacha").unwrap();
        assert_eq!(loaded, rec);
    }
}
