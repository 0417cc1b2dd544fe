//! Key material handed to the vault by whoever collected it.
//!
//! The vault never prompts for or derives its secret; it only holds the
//! value for its own lifetime.  The wrapped string is zeroized on drop and
//! is never printed in full, not even through `Debug`.

use std::fmt;

use zeroize::Zeroizing;

/// Number of leading characters kept by [`VaultSecret::redacted`].
const VISIBLE_PREFIX: usize = 2;

/// Secrets shorter than this are redacted with no visible prefix at all.
const MIN_LEN_FOR_PREFIX: usize = 8;

/// The vault secret, zeroized when dropped.
#[derive(Clone)]
pub struct VaultSecret(Zeroizing<String>);

impl VaultSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Raw bytes, used as HKDF input keying material.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A partial reference that is safe to put in log output.
    pub fn redacted(&self) -> String {
        let len = self.0.chars().count();
        if len < MIN_LEN_FOR_PREFIX {
            return format!("…({len} chars)");
        }
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX).collect();
        format!("{prefix}…({len} chars)")
    }
}

impl fmt::Debug for VaultSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VaultSecret").field(&self.redacted()).finish()
    }
}

impl From<String> for VaultSecret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for VaultSecret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
