//! Hybrid (asymmetric + symmetric) encryption for payloads of any size.
//!
//! A fresh AES-256 key encrypts the payload, and that key is sealed to
//! the recipient's X25519 public key:
//!
//! ```text
//! [ property(sealed symmetric key) | symmetric ciphertext (rest) ]
//! ```
//!
//! Opening the sealed key is the only step that needs the private key,
//! so it can be delegated to a gated decrypt step (see `decrypt_with`).

use zeroize::Zeroizing;

use super::asymmetric::{self, PUBLIC_KEY_LEN};
use super::encryption::{self, KEY_LEN};
use crate::codec::{Decoder, Encoder};
use crate::errors::{VaultLockError, Result};

/// A parsed hybrid ciphertext.
#[derive(Debug, Clone, Copy)]
pub struct HybridCiphertext<'a> {
    /// Symmetric key sealed to the recipient's public key.
    pub sealed_key: &'a [u8],
    /// Payload encrypted under the symmetric key.
    pub payload: &'a [u8],
}

impl<'a> HybridCiphertext<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        let sealed_key = decoder.read_property()?;
        let payload = decoder.read_final();
        Ok(Self {
            sealed_key,
            payload,
        })
    }

    /// Decrypt the payload with an already unsealed symmetric key.
    pub fn open_with_key(&self, symmetric_key: &[u8]) -> Result<Vec<u8>> {
        if symmetric_key.len() != KEY_LEN {
            return Err(VaultLockError::DecryptionFailed);
        }
        encryption::decrypt(symmetric_key, self.payload)
    }
}

/// Encrypt `plaintext` for the holder of `public_key`'s private half.
pub fn encrypt(public_key: &[u8; PUBLIC_KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let key = encryption::generate_key();
    let payload = encryption::encrypt(key.as_slice(), plaintext)?;
    let sealed_key = asymmetric::encrypt(public_key, key.as_slice())?;

    Ok(Encoder::new()
        .property(&sealed_key)
        .value(&payload)
        .finish())
}

/// Decrypt with the private key held in memory.
pub fn decrypt(private_key: &[u8], bytes: &[u8]) -> Result<Vec<u8>> {
    decrypt_with(bytes, |sealed_key| asymmetric::decrypt(private_key, sealed_key))
}

/// Decrypt, delegating the asymmetric step to `unseal`.
pub fn decrypt_with<F>(bytes: &[u8], unseal: F) -> Result<Vec<u8>>
where
    F: FnOnce(&[u8]) -> Result<Vec<u8>>,
{
    let parsed = HybridCiphertext::parse(bytes)?;
    let key = Zeroizing::new(unseal(parsed.sealed_key)?);
    parsed.open_with_key(&key)
}
