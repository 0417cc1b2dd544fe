//! The cipher capability.
//!
//! This module provides:
//! - the `Cipher` trait implemented by every algorithm
//! - a string id → implementation lookup (`lookup`)
//! - AES-256-GCM (`"aes"`) and XChaCha20-Poly1305 (`"xchacha"`) adapters
//! - `encrypt`/`decrypt` free functions that treat the empty id as plaintext
//! - the `VaultSecret` key holder (`secret`) and HKDF key derivation (`keys`)

mod envelope;
pub mod keys;
pub mod secret;

use aes_gcm::Aes256Gcm;
use chacha20poly1305::XChaCha20Poly1305;

use crate::errors::{PwmError, Result};

pub use secret::VaultSecret;

/// Cipher id meaning "no encryption".
pub const PLAINTEXT: &str = "";

/// A symmetric, authenticated encryption algorithm selected by id.
pub trait Cipher: Send + Sync {
    /// The id used in record file suffixes, e.g. `"aes"`.
    fn id(&self) -> &'static str;

    fn encrypt(&self, plaintext: &[u8], secret: &VaultSecret) -> Result<Vec<u8>>;

    /// Fails with `DecryptionFailed` on malformed input or a tag mismatch.
    fn decrypt(&self, ciphertext: &[u8], secret: &VaultSecret) -> Result<Vec<u8>>;
}

/// AES-256-GCM, 12-byte random nonce.
#[derive(Debug, Clone, Copy)]
pub struct AesGcmCipher;

impl Cipher for AesGcmCipher {
    fn id(&self) -> &'static str {
        "aes"
    }

    fn encrypt(&self, plaintext: &[u8], secret: &VaultSecret) -> Result<Vec<u8>> {
        envelope::seal::<Aes256Gcm>(self.id(), plaintext, secret)
    }

    fn decrypt(&self, ciphertext: &[u8], secret: &VaultSecret) -> Result<Vec<u8>> {
        envelope::open::<Aes256Gcm>(self.id(), ciphertext, secret)
    }
}

/// XChaCha20-Poly1305, 24-byte random nonce.
#[derive(Debug, Clone, Copy)]
pub struct XChaChaCipher;

impl Cipher for XChaChaCipher {
    fn id(&self) -> &'static str {
        "xchacha"
    }

    fn encrypt(&self, plaintext: &[u8], secret: &VaultSecret) -> Result<Vec<u8>> {
        envelope::seal::<XChaCha20Poly1305>(self.id(), plaintext, secret)
    }

    fn decrypt(&self, ciphertext: &[u8], secret: &VaultSecret) -> Result<Vec<u8>> {
        envelope::open::<XChaCha20Poly1305>(self.id(), ciphertext, secret)
    }
}

static AES: &dyn Cipher = &AesGcmCipher;
static XCHACHA: &dyn Cipher = &XChaChaCipher;

/// Every registered cipher id, for help output.
pub const CIPHER_IDS: &[&str] = &["aes", "xchacha"];

/// Resolve a cipher id.
///
/// The empty id resolves to `None` (plaintext passthrough); an unknown id is
/// a configuration error.
pub fn lookup(cipher_id: &str) -> Result<Option<&'static dyn Cipher>> {
    match cipher_id {
        PLAINTEXT => Ok(None),
        "aes" => Ok(Some(AES)),
        "xchacha" => Ok(Some(XCHACHA)),
        other => Err(PwmError::UnknownCipher(other.to_string())),
    }
}

/// Encrypt `plaintext` with the cipher named `cipher_id`.
pub fn encrypt(plaintext: &[u8], secret: &VaultSecret, cipher_id: &str) -> Result<Vec<u8>> {
    match lookup(cipher_id)? {
        Some(cipher) => cipher.encrypt(plaintext, secret),
        None => Ok(plaintext.to_vec()),
    }
}

/// Decrypt `ciphertext` with the cipher named `cipher_id`.
pub fn decrypt(ciphertext: &[u8], secret: &VaultSecret, cipher_id: &str) -> Result<Vec<u8>> {
    match lookup(cipher_id)? {
        Some(cipher) => cipher.decrypt(ciphertext, secret),
        None => Ok(ciphertext.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_ids() {
        assert_eq!(lookup("aes").unwrap().unwrap().id(), "aes");
        assert_eq!(lookup("xchacha").unwrap().unwrap().id(), "xchacha");
        assert!(lookup("").unwrap().is_none());
    }

    #[test]
    fn lookup_unknown_id_is_config_error() {
        assert!(matches!(lookup("rot13"), Err(PwmError::UnknownCipher(id)) if id == "rot13"));
        // Ids are case-sensitive because they are file suffixes.
        assert!(lookup("AES").is_err());
    }

    #[test]
    fn plaintext_mode_is_passthrough() {
        let secret = VaultSecret::new("ignored");
        let data = br#"{"id":"x"}"#;
        assert_eq!(encrypt(data, &secret, PLAINTEXT).unwrap(), data);
        assert_eq!(decrypt(data, &secret, PLAINTEXT).unwrap(), data);
    }

    #[test]
    fn every_registered_id_round_trips() {
        let secret = VaultSecret::new("round-trip-secret");
        for id in CIPHER_IDS {
            let ct = encrypt(b"payload", &secret, id).unwrap();
            assert_ne!(ct, b"payload");
            assert_eq!(decrypt(&ct, &secret, id).unwrap(), b"payload");
        }
    }
}
