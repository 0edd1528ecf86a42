//! OS keyring key store.
//!
//! Key entries are kept in the operating system's credential store
//! (Keychain, Credential Manager, Secret Service), base64-encoded since
//! the keyring API stores strings.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroizing;

use crate::crypto::SecretBytes;
use crate::errors::{VaultLockError, Result};

use super::software::{EntryBackend, SoftwareKeyStore};

/// Service name used in the OS keyring.
pub const SERVICE_NAME: &str = "vaultlock";

/// Key entries stored in the OS keyring under one service name.
#[derive(Debug, Clone)]
pub struct KeyringEntries {
    service: String,
}

impl KeyringEntries {
    fn entry(&self, alias: &str) -> Result<::keyring::Entry> {
        ::keyring::Entry::new(&self.service, &entry_key(alias)).map_err(|e| {
            VaultLockError::KeyStore(format!("failed to create keyring entry: {e}"))
        })
    }
}

fn entry_key(alias: &str) -> String {
    format!("key:{alias}")
}

impl EntryBackend for KeyringEntries {
    fn load(&self, alias: &str) -> Result<Option<SecretBytes>> {
        match self.entry(alias)?.get_password() {
            Ok(encoded) => {
                let encoded = Zeroizing::new(encoded);
                let bytes = BASE64.decode(encoded.as_bytes()).map_err(|e| {
                    VaultLockError::KeyStore(format!("keyring entry is not valid base64: {e}"))
                })?;
                Ok(Some(SecretBytes::new(bytes)))
            }
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(VaultLockError::KeyStore(format!(
                "failed to read from keyring: {e}"
            ))),
        }
    }

    fn store(&self, alias: &str, entry: &[u8]) -> Result<()> {
        let encoded = Zeroizing::new(BASE64.encode(entry));
        self.entry(alias)?.set_password(&encoded).map_err(|e| {
            VaultLockError::KeyStore(format!("failed to store key in keyring: {e}"))
        })
    }

    fn delete(&self, alias: &str) -> Result<()> {
        match self.entry(alias)?.delete_credential() {
            Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(VaultLockError::KeyStore(format!(
                "failed to delete from keyring: {e}"
            ))),
        }
    }
}

/// A key store backed by the OS credential manager.
pub type KeyringKeyStore = SoftwareKeyStore<KeyringEntries>;

impl KeyringKeyStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a custom service name, e.g. to isolate test runs.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self::with_backend(KeyringEntries {
            service: service.into(),
        })
    }
}
