//! Password-derived cipher.
//!
//! A fresh salt is drawn for every encryption, the key is derived with
//! Argon2id, and the payload is sealed with AES-256-GCM:
//!
//! ```text
//! [ 8-byte salt | 12-byte nonce | ciphertext + 16-byte tag ]
//! ```
//!
//! A wrong password derives a different key, so decryption fails the
//! GCM tag check instead of producing garbage.

use super::encryption;
use super::kdf::{derive_key, generate_salt, KdfParams, SALT_LEN};
use crate::errors::{VaultLockError, Result};

/// Encrypts and decrypts with a key derived from a password.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordCipher {
    params: KdfParams,
}

impl PasswordCipher {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Encrypt `plaintext` under `password`, embedding a random salt.
    pub fn encrypt(&self, password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let salt = generate_salt();
        let key = derive_key(password, &salt, &self.params)?;
        let sealed = encryption::encrypt(key.as_slice(), plaintext)?;

        let mut output = Vec::with_capacity(SALT_LEN + sealed.len());
        output.extend_from_slice(&salt);
        output.extend_from_slice(&sealed);
        Ok(output)
    }

    /// Re-derive the key from the embedded salt and decrypt.
    pub fn decrypt(&self, password: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < SALT_LEN {
            return Err(VaultLockError::DecryptionFailed);
        }
        let (salt, sealed) = data.split_at(SALT_LEN);
        let key = derive_key(password, salt, &self.params)?;
        encryption::decrypt(key.as_slice(), sealed)
    }
}
