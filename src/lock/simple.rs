//! Lock guarded only by a key-store symmetric key.

use super::{key_alias, LockProtected, LockRegister, Registration, Token, Unlocker};
use crate::authenticator::Authenticator;
use crate::crypto::SecretBytes;
use crate::errors::{VaultLockError, Result};
use crate::keystore::{KeyOptions, KeyStore};
use crate::vault::OpenVault;

/// Encrypts the secret under a symmetric key that never leaves the key
/// store.  Whoever can use the key store can unlock.
#[derive(Clone, Copy)]
pub struct SimpleLock<'k> {
    key_store: &'k dyn KeyStore,
    options: KeyOptions,
}

impl<'k> SimpleLock<'k> {
    pub fn new(key_store: &'k dyn KeyStore) -> Self {
        Self {
            key_store,
            options: KeyOptions::default(),
        }
    }

    pub fn strong_box(mut self, strong_box: bool) -> Self {
        self.options.strong_box = strong_box;
        self
    }

    /// Generate a fresh key under `alias` and encrypt `secret` with it.
    pub fn lock(&self, alias: &str, secret: &[u8]) -> Result<Token> {
        let key = self
            .key_store
            .generate_secret_key(alias, self.options)
            .map_err(|e| VaultLockError::lock("failed to create simple lock key", e))?;
        let encrypted = key
            .encrypt(secret)
            .map_err(|e| VaultLockError::lock("failed to encrypt with simple lock key", e))?;
        Ok(Token::new(alias, None, encrypted))
    }

    pub fn unlock(&self, token: &Token) -> Result<SecretBytes> {
        token
            .ensure_default_method()
            .and_then(|()| self.key_store.secret_key(token.alias()))
            .and_then(|key| key.decrypt(token.encrypted_secret()))
            .map(SecretBytes::new)
            .map_err(|e| VaultLockError::lock("failed to unlock simple lock", e))
    }
}

impl Registration for &SimpleLock<'_> {
    fn register(
        self,
        authenticator: &Authenticator,
        lock_id: &str,
        register: LockRegister<'_>,
    ) -> Result<Token> {
        let alias = key_alias(authenticator.id(), lock_id);
        register.register(|secret| self.lock(&alias, secret))
    }
}

impl Unlocker for &SimpleLock<'_> {
    fn unlock(
        self,
        _authenticator: &Authenticator,
        _lock_id: &str,
        token: Token,
        protected: LockProtected<'_>,
    ) -> Result<OpenVault> {
        protected.open(|| SimpleLock::unlock(self, &token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::MemoryKeyStore;

    #[test]
    fn lock_then_unlock_returns_secret() {
        let store = MemoryKeyStore::new();
        let lock = SimpleLock::new(&store);
        let token = lock.lock("simple", b"private key").unwrap();
        assert_eq!(lock.unlock(&token).unwrap().as_bytes(), b"private key");
    }

    #[test]
    fn missing_key_is_a_lock_error() {
        let store = MemoryKeyStore::new();
        let lock = SimpleLock::new(&store);
        let token = lock.lock("simple", b"secret").unwrap();
        store.delete_entry("simple").unwrap();
        assert!(matches!(lock.unlock(&token), Err(VaultLockError::Lock { .. })));
    }
}
