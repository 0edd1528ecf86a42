//! Password and PIN locks.
//!
//! The secret is first sealed with the password-derived cipher and the
//! result is sealed again under a key-store symmetric key, so unlocking
//! needs both the password and access to the key store.
//!
//! Every unlock failure is reported as `WrongPassword` (or `WrongPin`):
//! a bad password and a damaged or missing key-store entry look the same
//! to the caller.

use zeroize::Zeroizing;

use super::{key_alias, LockProtected, LockRegister, Registration, Token, Unlocker};
use crate::authenticator::Authenticator;
use crate::crypto::{KdfParams, PasswordCipher, SecretBytes};
use crate::errors::{VaultLockError, Result};
use crate::keystore::{KeyOptions, KeyStore};
use crate::vault::OpenVault;

/// Which kind of knowledge factor guards the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordKind {
    Password,
    Pin,
}

impl PasswordKind {
    fn wrong_guard(self) -> VaultLockError {
        match self {
            Self::Password => VaultLockError::WrongPassword,
            Self::Pin => VaultLockError::WrongPin,
        }
    }
}

/// A lock guarded by something the user knows.
#[derive(Clone, Copy)]
pub struct PasswordLock<'k> {
    key_store: &'k dyn KeyStore,
    kind: PasswordKind,
    cipher: PasswordCipher,
    options: KeyOptions,
}

impl<'k> PasswordLock<'k> {
    pub fn password(key_store: &'k dyn KeyStore) -> Self {
        Self::new(key_store, PasswordKind::Password)
    }

    pub fn pin(key_store: &'k dyn KeyStore) -> Self {
        Self::new(key_store, PasswordKind::Pin)
    }

    fn new(key_store: &'k dyn KeyStore, kind: PasswordKind) -> Self {
        Self {
            key_store,
            kind,
            cipher: PasswordCipher::default(),
            options: KeyOptions::default(),
        }
    }

    /// Argon2id parameters.  Lock and unlock must agree on them.
    pub fn kdf_params(mut self, params: KdfParams) -> Self {
        self.cipher = PasswordCipher::new(params);
        self
    }

    pub fn strong_box(mut self, strong_box: bool) -> Self {
        self.options.strong_box = strong_box;
        self
    }

    pub fn kind(&self) -> PasswordKind {
        self.kind
    }

    /// Bind a password so the lock can be used as a `Registration` or
    /// `Unlocker`.
    pub fn with_password<'p>(&'p self, password: &'p str) -> PasswordGuard<'p, 'k> {
        PasswordGuard {
            lock: self,
            password,
        }
    }

    pub fn lock(&self, alias: &str, secret: &[u8], password: &str) -> Result<Token> {
        if password.is_empty() {
            return Err(VaultLockError::lock(
                "cannot lock with an empty password",
                self.kind.wrong_guard(),
            ));
        }

        let inner = Zeroizing::new(
            self.cipher
                .encrypt(password.as_bytes(), secret)
                .map_err(|e| VaultLockError::lock("password encryption failed", e))?,
        );
        let key = self
            .key_store
            .generate_secret_key(alias, self.options)
            .map_err(|e| VaultLockError::lock("failed to create password lock key", e))?;
        let outer = key
            .encrypt(&inner)
            .map_err(|e| VaultLockError::lock("failed to encrypt with password lock key", e))?;

        Ok(Token::new(alias, None, outer))
    }

    pub fn unlock(&self, token: &Token, password: &str) -> Result<SecretBytes> {
        self.try_unlock(token, password).map_err(|e| {
            tracing::debug!(alias = token.alias(), error = %e, "password unlock failed");
            self.kind.wrong_guard()
        })
    }

    fn try_unlock(&self, token: &Token, password: &str) -> Result<SecretBytes> {
        token.ensure_default_method()?;
        let key = self.key_store.secret_key(token.alias())?;
        let inner = Zeroizing::new(key.decrypt(token.encrypted_secret())?);
        let secret = self.cipher.decrypt(password.as_bytes(), &inner)?;
        Ok(SecretBytes::new(secret))
    }
}

/// A `PasswordLock` with its password, ready to register or unlock.
#[derive(Clone, Copy)]
pub struct PasswordGuard<'p, 'k> {
    lock: &'p PasswordLock<'k>,
    password: &'p str,
}

impl Registration for PasswordGuard<'_, '_> {
    fn register(
        self,
        authenticator: &Authenticator,
        lock_id: &str,
        register: LockRegister<'_>,
    ) -> Result<Token> {
        let alias = key_alias(authenticator.id(), lock_id);
        register.register(|secret| self.lock.lock(&alias, secret, self.password))
    }
}

impl Unlocker for PasswordGuard<'_, '_> {
    fn unlock(
        self,
        _authenticator: &Authenticator,
        _lock_id: &str,
        token: Token,
        protected: LockProtected<'_>,
    ) -> Result<OpenVault> {
        let kind = self.lock.kind;
        protected
            .open(|| self.lock.unlock(&token, self.password))
            .map_err(|e| match e {
                // The unlocked bytes did not fit the vault.
                VaultLockError::Vault { .. } => kind.wrong_guard(),
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::MemoryKeyStore;

    fn fast(lock: PasswordLock<'_>) -> PasswordLock<'_> {
        lock.kdf_params(KdfParams::minimum())
    }

    #[test]
    fn round_trip_with_correct_password() {
        let store = MemoryKeyStore::new();
        let lock = fast(PasswordLock::password(&store));
        let token = lock.lock("pw", b"private key", "11111").unwrap();
        assert_eq!(lock.unlock(&token, "11111").unwrap().as_bytes(), b"private key");
    }

    #[test]
    fn wrong_password_is_reported_as_such() {
        let store = MemoryKeyStore::new();
        let lock = fast(PasswordLock::password(&store));
        let token = lock.lock("pw", b"private key", "11111").unwrap();
        assert!(matches!(
            lock.unlock(&token, "wrong"),
            Err(VaultLockError::WrongPassword)
        ));
    }

    #[test]
    fn pin_lock_reports_wrong_pin() {
        let store = MemoryKeyStore::new();
        let lock = fast(PasswordLock::pin(&store));
        let token = lock.lock("pin", b"private key", "1234").unwrap();
        assert!(matches!(
            lock.unlock(&token, "4321"),
            Err(VaultLockError::WrongPin)
        ));
    }

    #[test]
    fn missing_key_store_entry_looks_like_a_wrong_password() {
        let store = MemoryKeyStore::new();
        let lock = fast(PasswordLock::password(&store));
        let token = lock.lock("pw", b"private key", "11111").unwrap();
        store.delete_entry("pw").unwrap();
        assert!(matches!(
            lock.unlock(&token, "11111"),
            Err(VaultLockError::WrongPassword)
        ));
    }

    #[test]
    fn empty_password_cannot_lock() {
        let store = MemoryKeyStore::new();
        let lock = fast(PasswordLock::password(&store));
        assert!(matches!(
            lock.lock("pw", b"secret", ""),
            Err(VaultLockError::Lock { .. })
        ));
        assert!(!store.contains_alias("pw").unwrap());
    }
}
