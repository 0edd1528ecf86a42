//! Lock unlocked by a biometric (user-presence) prompt.
//!
//! Locking hybrid-encrypts the secret under the public half of a
//! presence-gated key-store keypair and needs no user interaction.
//! Unlocking asks the key store for a decrypt cipher, which stays locked
//! until the `BiometricPrompt` collaborator authorizes it, then opens the
//! sealed symmetric key with that cipher.

use async_trait::async_trait;

use super::{
    key_alias, AsyncRegistration, AsyncUnlocker, LockProtected, LockRegister, Registration,
    Token,
};
use crate::authenticator::Authenticator;
use crate::crypto::{hybrid, SecretBytes};
use crate::errors::{BiometricFailure, VaultLockError, Result};
use crate::keystore::{CipherHandle, KeyOptions, KeyStore};
use crate::vault::OpenVault;

/// Text shown by the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    pub title: String,
    pub cancel_text: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            title: "Unlock".to_string(),
            cancel_text: "Cancel".to_string(),
        }
    }
}

/// External prompt that proves the user is present.
///
/// Implementations show the platform prompt and, once the user
/// approves, call `authorize` on the cipher and hand it back.  Dropping
/// the returned future must dismiss the prompt.
#[async_trait]
pub trait BiometricPrompt: Send + Sync {
    /// `Ok(Some(cipher))` when approved, `Ok(None)` when the user
    /// cancelled, `Err` when the prompt or hardware failed.
    async fn show(
        &self,
        cipher: CipherHandle,
        config: &PromptConfig,
    ) -> Result<Option<CipherHandle>>;
}

/// A lock whose key-store keypair requires user presence.
#[derive(Clone, Copy)]
pub struct BiometricLock<'k> {
    key_store: &'k dyn KeyStore,
    options: KeyOptions,
}

impl<'k> BiometricLock<'k> {
    pub fn new(key_store: &'k dyn KeyStore) -> Self {
        Self {
            key_store,
            options: KeyOptions {
                strong_box: false,
                require_user_presence: true,
            },
        }
    }

    pub fn strong_box(mut self, strong_box: bool) -> Self {
        self.options.strong_box = strong_box;
        self
    }

    /// Bind a prompt so the lock can be used as a registration or
    /// unlocker.
    pub fn with_prompt<'p, P: BiometricPrompt>(
        &'p self,
        prompt: &'p P,
        config: PromptConfig,
    ) -> BiometricGuard<'p, 'k, P> {
        BiometricGuard {
            lock: self,
            prompt,
            config,
        }
    }

    pub fn lock(&self, alias: &str, secret: &[u8]) -> Result<Token> {
        let pair = self
            .key_store
            .generate_key_pair(alias, self.options)
            .map_err(|e| VaultLockError::lock("failed to create biometric key pair", e))?;
        let encrypted = pair
            .encrypt(secret)
            .map_err(|e| VaultLockError::lock("failed to encrypt with biometric key", e))?;
        Ok(Token::new(alias, None, encrypted))
    }

    pub async fn unlock<P>(&self, token: &Token, prompt: &P, config: &PromptConfig) -> Result<SecretBytes>
    where
        P: BiometricPrompt + ?Sized,
    {
        token
            .ensure_default_method()
            .map_err(|e| VaultLockError::lock("unsupported biometric token", e))?;

        let cipher = self
            .key_store
            .key_pair(token.alias())
            .and_then(|pair| pair.decrypt_cipher())
            .map_err(|e| VaultLockError::lock("biometric key is unavailable", e))?;

        let cipher = match prompt.show(cipher, config).await {
            Ok(Some(cipher)) => cipher,
            Ok(None) => {
                return Err(VaultLockError::Biometric {
                    reason: BiometricFailure::Cancellation,
                    message: "user cancelled the biometric prompt".to_string(),
                })
            }
            Err(e) => {
                return Err(VaultLockError::Biometric {
                    reason: BiometricFailure::Error,
                    message: e.to_string(),
                })
            }
        };

        hybrid::decrypt_with(token.encrypted_secret(), |sealed| cipher.do_final(sealed))
            .map(SecretBytes::new)
            .map_err(|e| match e {
                VaultLockError::UserPresenceRequired => VaultLockError::Biometric {
                    reason: BiometricFailure::Error,
                    message: "prompt returned an unauthorized cipher".to_string(),
                },
                other => VaultLockError::lock("failed to decrypt biometric token", other),
            })
    }
}

/// A `BiometricLock` with its prompt, ready to register or unlock.
pub struct BiometricGuard<'p, 'k, P> {
    lock: &'p BiometricLock<'k>,
    prompt: &'p P,
    config: PromptConfig,
}

impl<P: BiometricPrompt> Registration for BiometricGuard<'_, '_, P> {
    fn register(
        self,
        authenticator: &Authenticator,
        lock_id: &str,
        register: LockRegister<'_>,
    ) -> Result<Token> {
        let alias = key_alias(authenticator.id(), lock_id);
        register.register(|secret| self.lock.lock(&alias, secret))
    }
}

#[async_trait]
impl<'p, 'k, P: BiometricPrompt> AsyncRegistration for BiometricGuard<'p, 'k, P> {
    async fn register(
        self,
        authenticator: &Authenticator,
        lock_id: &str,
        register: LockRegister<'_>,
    ) -> Result<Token> {
        let alias = key_alias(authenticator.id(), lock_id);
        let lock = self.lock;
        register
            .register_async(|secret| async move { lock.lock(&alias, secret.as_bytes()) })
            .await
    }
}

#[async_trait]
impl<'p, 'k, P: BiometricPrompt> AsyncUnlocker for BiometricGuard<'p, 'k, P> {
    async fn unlock(
        self,
        _authenticator: &Authenticator,
        _lock_id: &str,
        token: Token,
        protected: LockProtected<'_>,
    ) -> Result<OpenVault> {
        let Self {
            lock,
            prompt,
            config,
        } = self;
        protected
            .open_async(|| async move { lock.unlock(&token, prompt, &config).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::MemoryKeyStore;

    struct Approve;

    #[async_trait]
    impl BiometricPrompt for Approve {
        async fn show(
            &self,
            mut cipher: CipherHandle,
            _config: &PromptConfig,
        ) -> Result<Option<CipherHandle>> {
            cipher.authorize();
            Ok(Some(cipher))
        }
    }

    struct Decline;

    #[async_trait]
    impl BiometricPrompt for Decline {
        async fn show(
            &self,
            _cipher: CipherHandle,
            _config: &PromptConfig,
        ) -> Result<Option<CipherHandle>> {
            Ok(None)
        }
    }

    struct Broken;

    #[async_trait]
    impl BiometricPrompt for Broken {
        async fn show(
            &self,
            _cipher: CipherHandle,
            _config: &PromptConfig,
        ) -> Result<Option<CipherHandle>> {
            Err(VaultLockError::KeyStore("sensor unavailable".into()))
        }
    }

    /// Hands the cipher back without authorizing it.
    struct Forgetful;

    #[async_trait]
    impl BiometricPrompt for Forgetful {
        async fn show(
            &self,
            cipher: CipherHandle,
            _config: &PromptConfig,
        ) -> Result<Option<CipherHandle>> {
            Ok(Some(cipher))
        }
    }

    fn locked(store: &MemoryKeyStore) -> Token {
        BiometricLock::new(store)
            .lock("bio", &[7u8; 32])
            .unwrap()
    }

    #[tokio::test]
    async fn approved_prompt_unlocks() {
        let store = MemoryKeyStore::new();
        let token = locked(&store);
        let secret = BiometricLock::new(&store)
            .unlock(&token, &Approve, &PromptConfig::default())
            .await
            .unwrap();
        assert_eq!(secret.as_bytes(), &[7u8; 32]);
    }

    #[tokio::test]
    async fn declined_prompt_is_a_cancellation() {
        let store = MemoryKeyStore::new();
        let token = locked(&store);
        let err = BiometricLock::new(&store)
            .unlock(&token, &Decline, &PromptConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_cancellation());
    }

    #[tokio::test]
    async fn prompt_failure_is_a_biometric_error() {
        let store = MemoryKeyStore::new();
        let token = locked(&store);
        let err = BiometricLock::new(&store)
            .unlock(&token, &Broken, &PromptConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VaultLockError::Biometric {
                reason: BiometricFailure::Error,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unauthorized_cipher_cannot_decrypt() {
        let store = MemoryKeyStore::new();
        let token = locked(&store);
        let err = BiometricLock::new(&store)
            .unlock(&token, &Forgetful, &PromptConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VaultLockError::Biometric { .. }));
        assert!(!err.is_cancellation());
    }
}
