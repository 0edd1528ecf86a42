//! Vault module: a public/private keypair that never persists its
//! private half.
//!
//! This module provides:
//! - `Property` and `EncryptedValue` value types (`value`)
//! - `Vault`, the sealed, persistable public half
//! - `OpenVault`, the transient unlocked form holding the private key (`open`)
//!
//! Encoded vault layout:
//!
//! ```text
//! [version: 1 byte][property(key type)][public key bytes (rest)]
//! ```

pub mod open;
pub mod value;

use std::future::Future;

pub use open::OpenVault;
pub use value::{EncryptedValue, Property};

use crate::codec::{Decoder, Encoder};
use crate::crypto::asymmetric::{self, KeyPair, KEY_TYPE, PUBLIC_KEY_LEN};
use crate::crypto::{hybrid, SecretBytes};
use crate::errors::{VaultLockError, Result};

/// Current vault encoding version.
pub const VAULT_FORMAT_VERSION: u8 = 1;

/// The public half of a vault keypair.
///
/// Anyone holding a `Vault` can encrypt; decrypting needs an
/// `OpenVault`, obtained through `open` with the private-key bytes a
/// lock releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    public_key: [u8; PUBLIC_KEY_LEN],
    key_type: Option<String>,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Generate a fresh keypair and return it open.
    pub fn create() -> Result<OpenVault> {
        let KeyPair {
            public_key,
            private_key,
        } = KeyPair::generate();
        let vault = Self {
            public_key,
            key_type: Some(KEY_TYPE.to_string()),
        };
        tracing::debug!(key_type = KEY_TYPE, "created vault keypair");
        Ok(OpenVault::new(vault, private_key))
    }

    /// Create a vault, let `config` use the open form (typically to
    /// register locks), then close it and return only the public half.
    pub fn create_with<F>(config: F) -> Result<Self>
    where
        F: FnOnce(&OpenVault) -> Result<()>,
    {
        let mut open = Self::create()?;
        let result = config(&open);
        let vault = open.vault().clone();
        open.close();
        result.map(|()| vault)
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    /// Encode the public key and key-type tag.
    pub fn encode(&self) -> Vec<u8> {
        Encoder::with_prefix(&[VAULT_FORMAT_VERSION])
            .optional_property(self.key_type.as_deref().map(str::as_bytes))
            .value(&self.public_key)
            .finish()
    }

    /// Restore a vault from `encode` output.
    pub fn restore(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        if !decoder.check_value_equals(&[VAULT_FORMAT_VERSION])? {
            return Err(VaultLockError::Coding(format!(
                "unsupported vault version, expected {VAULT_FORMAT_VERSION}"
            )));
        }

        let key_type = decoder.read_string()?;
        if !key_type.is_empty() && key_type != KEY_TYPE {
            return Err(VaultLockError::Coding(format!(
                "unsupported vault key type '{key_type}'"
            )));
        }

        let public_key: [u8; PUBLIC_KEY_LEN] =
            decoder.read_final().try_into().map_err(|_| {
                VaultLockError::Coding(format!(
                    "vault public key must be {PUBLIC_KEY_LEN} bytes"
                ))
            })?;

        Ok(Self {
            public_key,
            key_type: (!key_type.is_empty()).then(|| key_type.to_string()),
        })
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    pub fn key_type(&self) -> Option<&str> {
        self.key_type.as_deref()
    }

    /// Hybrid-encrypt `value` under the public key.
    ///
    /// `method` is reserved for future algorithms; only the default
    /// (`None` or empty) is accepted today.
    pub fn encrypt(&self, value: &[u8], method: Option<&str>) -> Result<EncryptedValue> {
        let method = method.unwrap_or_default();
        if !method.is_empty() {
            return Err(VaultLockError::vault_state(format!(
                "unsupported encryption method '{method}'"
            )));
        }

        let ciphertext = hybrid::encrypt(&self.public_key, value)
            .map_err(|e| VaultLockError::vault("failed to encrypt value", e))?;

        Ok(EncryptedValue::new(
            Encoder::new().property(b"").value(&ciphertext).finish(),
        ))
    }

    /// Open the vault with private-key bytes released by `unlocker`.
    ///
    /// Errors from `unlocker` (a wrong password, a cancelled prompt)
    /// are returned unchanged; bytes that are not this vault's private
    /// key fail with `VaultLockError::Vault`.
    pub fn open<F>(&self, unlocker: F) -> Result<OpenVault>
    where
        F: FnOnce() -> Result<SecretBytes>,
    {
        let private_key = unlocker()?;
        self.bind(private_key)
    }

    /// Async form of `open`, for unlockers that wait on the user.
    pub async fn open_async<F, Fut>(&self, unlocker: F) -> Result<OpenVault>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SecretBytes>>,
    {
        let private_key = unlocker().await?;
        self.bind(private_key)
    }

    fn bind(&self, private_key: SecretBytes) -> Result<OpenVault> {
        let derived = asymmetric::public_key_of(private_key.as_bytes())
            .map_err(|e| VaultLockError::vault("unlocked bytes are not a valid private key", e))?;

        if derived != self.public_key {
            return Err(VaultLockError::vault_state(
                "unlocked private key does not belong to this vault",
            ));
        }

        Ok(OpenVault::new(self.clone(), private_key))
    }
}
