//! The transient, unlocked form of a vault.

use std::fmt;
use std::future::Future;

use zeroize::Zeroizing;

use super::value::EncryptedValue;
use super::Vault;
use crate::crypto::{asymmetric, SecretBytes};
use crate::errors::{VaultLockError, Result};

/// A vault together with its private key.
///
/// Produced by `Vault::create` or a successful `Vault::open`.  It is
/// never persisted; the private key is wiped by `close` or on drop.
pub struct OpenVault {
    vault: Vault,
    private_key: SecretBytes,
}

impl OpenVault {
    pub(super) fn new(vault: Vault, private_key: SecretBytes) -> Self {
        Self { vault, private_key }
    }

    /// The sealed vault this handle was opened from.
    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// `true` once `close` has wiped the private key.
    pub fn is_closed(&self) -> bool {
        self.private_key.is_empty()
    }

    /// Decrypt a value encrypted under this vault's public key.
    pub fn decrypt(&self, encrypted: &EncryptedValue) -> Result<Vec<u8>> {
        let private_key = self.private_key()?;
        let (method, ciphertext) = encrypted
            .parts()
            .map_err(|e| VaultLockError::vault("malformed encrypted value", e))?;
        if !method.is_empty() {
            return Err(VaultLockError::vault_state(format!(
                "unsupported encryption method '{method}'"
            )));
        }

        asymmetric::decrypt(private_key, ciphertext.sealed_key)
            .and_then(|key| ciphertext.open_with_key(&Zeroizing::new(key)))
            .map_err(|e| VaultLockError::vault("failed to decrypt value", e))
    }

    /// Hand the raw private key to `locker` so it can be encrypted under
    /// a lock's guard.  `locker` must not persist the bytes it receives.
    pub fn register_lock<T, F>(&self, locker: F) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let private_key = self.private_key()?;
        locker(private_key)
    }

    /// Async form of `register_lock`.  The future receives its own
    /// zeroizing copy of the key, wiped when the future completes.
    pub async fn register_lock_async<T, F, Fut>(&self, locker: F) -> Result<T>
    where
        F: FnOnce(SecretBytes) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let private_key = SecretBytes::from_slice(self.private_key()?);
        locker(private_key).await
    }

    /// Wipe the private key.  Safe to call more than once.
    pub fn close(&mut self) {
        if !self.private_key.is_empty() {
            tracing::debug!("closing open vault");
        }
        self.private_key.wipe();
    }

    fn private_key(&self) -> Result<&[u8]> {
        if self.is_closed() {
            return Err(VaultLockError::vault_state("vault is closed"));
        }
        Ok(self.private_key.as_bytes())
    }
}

impl fmt::Debug for OpenVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenVault")
            .field("vault", &self.vault)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}
