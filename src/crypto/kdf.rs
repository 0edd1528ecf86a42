//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Parameters are configurable via `KdfParams`
//! (loaded from `vaultlock.toml` or sensible defaults).

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use super::encryption::KEY_LEN;
use super::secret::SecretKey;
use crate::errors::{VaultLockError, Result};

/// Length of the salt in bytes.  Argon2 accepts nothing shorter.
pub const SALT_LEN: usize = 8;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// The parameters are not stored next to the ciphertext, so the same
/// values must be used to encrypt and to decrypt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// The cheapest parameters `derive_key` accepts.  Meant for tests.
    pub const fn minimum() -> Self {
        Self {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    /// Reject parameters too weak to be worth deriving with.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(VaultLockError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(VaultLockError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(VaultLockError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from a password and salt with Argon2id.
///
/// The same password + salt + params always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8], kdf_params: &KdfParams) -> Result<SecretKey> {
    kdf_params.validate()?;

    let params = Params::new(
        kdf_params.memory_kib,
        kdf_params.iterations,
        kdf_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultLockError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = SecretKey::default();
    argon2
        .hash_password_into(password, salt, key.as_mut_slice())
        .map_err(|e| VaultLockError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_memory_is_rejected() {
        let params = KdfParams {
            memory_kib: 1_024,
            ..KdfParams::minimum()
        };
        assert!(derive_key(b"pw", &generate_salt(), &params).is_err());
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let params = KdfParams {
            iterations: 0,
            ..KdfParams::minimum()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn same_inputs_same_key() {
        let salt = [0x42u8; SALT_LEN];
        let k1 = derive_key(b"pw", &salt, &KdfParams::minimum()).unwrap();
        let k2 = derive_key(b"pw", &salt, &KdfParams::minimum()).unwrap();
        assert_eq!(*k1, *k2);
    }
}
