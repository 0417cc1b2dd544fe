//! Record key derivation using HKDF-SHA256.
//!
//! Every encrypted record file carries its own random salt.  The 32-byte
//! cipher key is derived from the vault secret, that salt, and the cipher
//! id, so the same secret used under another cipher produces a different
//! key and fails authentication instead of yielding garbage.

use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::secret::VaultSecret;
use crate::errors::{PwmError, Result};

/// Length of the per-file salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of derived cipher keys (256 bits).
pub const KEY_LEN: usize = 32;

/// Derive the cipher key for one record file.
///
/// `info` is `"pwm-record:<cipher_id>"`, binding the key to the algorithm.
pub fn derive_record_key(
    secret: &VaultSecret,
    salt: &[u8],
    cipher_id: &str,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let info = format!("pwm-record:{cipher_id}");
    let hk = Hkdf::<Sha256>::new(Some(salt), secret.as_bytes());

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info.as_bytes(), &mut okm[..])
        .map_err(|e| PwmError::EncryptionFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// Generate a random salt for a new record envelope.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
