use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in the vault engine.
#[derive(Debug, Error)]
pub enum PwmError {
    // --- Config errors ---
    #[error("Unknown cipher '{0}' — supported: aes, xchacha (or empty for plaintext)")]
    UnknownCipher(String),

    #[error("Invalid vault directory: {0}")]
    InvalidDirectory(PathBuf),

    #[error("Config error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {path}: {source}")]
    RecordIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong secret, wrong cipher or corrupted data")]
    DecryptionFailed,

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Record errors ---
    #[error("Refusing to write a record without an id")]
    MissingRecordId,

    #[error("Invalid record id '{0}': must be a plain file name")]
    InvalidRecordId(String),

    #[error("Record '{0}' not found")]
    RecordNotFound(String),

    #[error("Unable to load record {path}: {source}")]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: Box<PwmError>,
    },

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl PwmError {
    /// Programmer-error class failures that must abort instead of being
    /// handled like environmental errors.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PwmError::MissingRecordId)
    }

    /// Attach a path to a raw IO error.
    pub(crate) fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PwmError::RecordIo {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for vault results.
pub type Result<T> = std::result::Result<T, PwmError>;
