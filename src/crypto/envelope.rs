//! AEAD envelope shared by every concrete cipher.
//!
//! Each call to `seal` generates a fresh random salt and nonce and
//! prepends them to the ciphertext.  `open` splits them back out, derives
//! the same key and verifies the auth tag before returning anything.
//!
//! Layout of the returned byte buffer:
//!   [ 16-byte salt | nonce | ciphertext + auth tag ]

use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Nonce, OsRng};

use super::keys::{derive_record_key, generate_salt, SALT_LEN};
use super::secret::VaultSecret;
use crate::errors::{PwmError, Result};

/// Encrypt `plaintext` with algorithm `C`, keyed from `secret` and `cipher_id`.
pub(crate) fn seal<C>(cipher_id: &str, plaintext: &[u8], secret: &VaultSecret) -> Result<Vec<u8>>
where
    C: Aead + AeadCore + KeyInit,
{
    let salt = generate_salt();
    let key = derive_record_key(secret, &salt, cipher_id)?;

    let cipher = C::new_from_slice(&key[..])
        .map_err(|e| PwmError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = C::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| PwmError::EncryptionFailed(format!("{cipher_id}: {e}")))?;

    let mut output = Vec::with_capacity(SALT_LEN + nonce.len() + ciphertext.len());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `seal` with the same `C` and `cipher_id`.
pub(crate) fn open<C>(cipher_id: &str, envelope: &[u8], secret: &VaultSecret) -> Result<Vec<u8>>
where
    C: Aead + AeadCore + KeyInit,
{
    let nonce_len = <C as AeadCore>::NonceSize::USIZE;
    let tag_len = <C as AeadCore>::TagSize::USIZE;

    // Anything shorter cannot even hold an empty authenticated message.
    if envelope.len() < SALT_LEN + nonce_len + tag_len {
        return Err(PwmError::DecryptionFailed);
    }

    let (salt, rest) = envelope.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(nonce_len);
    let nonce = Nonce::<C>::from_slice(nonce_bytes);

    let key = derive_record_key(secret, salt, cipher_id)?;
    let cipher = C::new_from_slice(&key[..]).map_err(|_| PwmError::DecryptionFailed)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| PwmError::DecryptionFailed)
}
