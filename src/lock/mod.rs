//! Locks guard the vault private key.
//!
//! Each lock kind re-encrypts the same private-key bytes under its own
//! guard and stores the result as a `Token`:
//!
//! - `SimpleLock`: a key-store symmetric key, no user input
//! - `PasswordLock`: a password or PIN, wrapped again by a key-store key
//! - `BiometricLock`: a presence-gated key-store keypair, unlocked
//!   through an external prompt
//!
//! Lock objects carry no state of their own beyond the key store they
//! use; everything needed to unlock is in the token.  They plug into an
//! `Authenticator` through the bridge traits defined here, so adding a
//! lock kind needs no change to the authenticator.

pub mod biometric;
pub mod password;
pub mod simple;
pub mod token;

use std::future::Future;

use async_trait::async_trait;

pub use biometric::{BiometricGuard, BiometricLock, BiometricPrompt, PromptConfig};
pub use password::{PasswordGuard, PasswordKind, PasswordLock};
pub use simple::SimpleLock;
pub use token::{Token, TOKEN_FORMAT_VERSION};

use crate::authenticator::Authenticator;
use crate::crypto::SecretBytes;
use crate::errors::Result;
use crate::keystore::KeyStore;
use crate::vault::{OpenVault, Vault};

/// Longest readable part (id or lock id) kept in an alias.
const ALIAS_PART_MAX: usize = 48;

/// Fresh key-store alias for one registration of lock `lock_id` on
/// authenticator `authenticator_id`.
///
/// The readable prefix `vaultlock.{id}.{lock_id}` has characters outside
/// `[A-Za-z0-9_-]` replaced with `_` and is capped in length, so it can
/// collide.  A random 128-bit suffix makes every alias unique: two
/// authenticators never share a key, and re-registering a lock writes a
/// new key while the replaced token's key stays usable until it is
/// removed with [`remove_key`].
pub fn key_alias(authenticator_id: &str, lock_id: &str) -> String {
    let clean = |part: &str| -> String {
        part.chars()
            .take(ALIAS_PART_MAX)
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };
    let suffix: String = rand::random::<[u8; 16]>()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    format!(
        "vaultlock.{}.{}.{suffix}",
        clean(authenticator_id),
        clean(lock_id)
    )
}

/// Delete the key-store entry a token depends on.
///
/// Call after `Authenticator::unregister_lock` to drop the guard key as
/// well as the token.
pub fn remove_key(key_store: &dyn KeyStore, token: &Token) -> Result<()> {
    tracing::debug!(alias = token.alias(), "removing lock key");
    key_store.delete_entry(token.alias())
}

// ---------------------------------------------------------------------------
// Capabilities handed to locks
// ---------------------------------------------------------------------------

/// Lets a registration see the vault private key long enough to lock it.
#[derive(Debug, Clone, Copy)]
pub struct LockRegister<'a> {
    vault: &'a OpenVault,
}

impl<'a> LockRegister<'a> {
    pub(crate) fn new(vault: &'a OpenVault) -> Self {
        Self { vault }
    }

    /// Run `locker` with the raw private key.
    pub fn register<T, F>(&self, locker: F) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        self.vault.register_lock(locker)
    }

    /// Async form of `register`.
    pub async fn register_async<T, F, Fut>(&self, locker: F) -> Result<T>
    where
        F: FnOnce(SecretBytes) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.vault.register_lock_async(locker).await
    }
}

/// Lets an unlocker open the vault with the private key it recovers.
#[derive(Debug, Clone, Copy)]
pub struct LockProtected<'a> {
    vault: &'a Vault,
}

impl<'a> LockProtected<'a> {
    pub(crate) fn new(vault: &'a Vault) -> Self {
        Self { vault }
    }

    pub fn open<F>(&self, unlocker: F) -> Result<OpenVault>
    where
        F: FnOnce() -> Result<SecretBytes>,
    {
        self.vault.open(unlocker)
    }

    pub async fn open_async<F, Fut>(&self, unlocker: F) -> Result<OpenVault>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SecretBytes>>,
    {
        self.vault.open_async(unlocker).await
    }
}

// ---------------------------------------------------------------------------
// Bridge traits
// ---------------------------------------------------------------------------

/// Registers a lock on an open vault and returns its token.
pub trait Registration {
    fn register(
        self,
        authenticator: &Authenticator,
        lock_id: &str,
        register: LockRegister<'_>,
    ) -> Result<Token>;
}

/// Async form of `Registration`.
#[async_trait]
pub trait AsyncRegistration: Send {
    async fn register(
        self,
        authenticator: &Authenticator,
        lock_id: &str,
        register: LockRegister<'_>,
    ) -> Result<Token>;
}

/// Turns stored token bytes back into an open vault.
pub trait Unlocker {
    fn decode(&self, bytes: &[u8]) -> Result<Token> {
        Token::restore(bytes)
    }

    fn unlock(
        self,
        authenticator: &Authenticator,
        lock_id: &str,
        token: Token,
        protected: LockProtected<'_>,
    ) -> Result<OpenVault>;
}

/// Async form of `Unlocker`, required by locks that wait on the user.
#[async_trait]
pub trait AsyncUnlocker: Send {
    fn decode(&self, bytes: &[u8]) -> Result<Token> {
        Token::restore(bytes)
    }

    async fn unlock(
        self,
        authenticator: &Authenticator,
        lock_id: &str,
        token: Token,
        protected: LockProtected<'_>,
    ) -> Result<OpenVault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(alias: &str) -> &str {
        alias.rsplit_once('.').map(|(head, _)| head).unwrap()
    }

    #[test]
    fn key_alias_replaces_unsafe_characters() {
        assert_eq!(
            prefix(&key_alias("default", "password")),
            "vaultlock.default.password"
        );
        assert_eq!(prefix(&key_alias("my app", "../pin")), "vaultlock.my_app.___pin");
    }

    #[test]
    fn key_alias_is_unique_per_call() {
        let first = key_alias("default", "password");
        let second = key_alias("default", "password");
        assert_ne!(first, second);

        let suffix = first.rsplit_once('.').unwrap().1;
        assert_eq!(suffix.len(), 32);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn key_alias_differs_for_ids_with_the_same_readable_form() {
        let dotted = key_alias("a.b", "password");
        let underscored = key_alias("a_b", "password");
        assert_eq!(prefix(&dotted), prefix(&underscored));
        assert_ne!(dotted, underscored);
    }

    #[test]
    fn key_alias_stays_within_file_name_limits() {
        let long = "x".repeat(500);
        let alias = key_alias(&long, &long);
        assert!(alias.len() <= 200, "alias is {} bytes", alias.len());
    }
}
