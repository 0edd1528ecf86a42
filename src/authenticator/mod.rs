//! Authenticator: a vault, its locks and the secret values they protect.
//!
//! This module provides:
//! - `Authenticator`, the persistable object (`encode` / `restore`)
//! - `Editor`, returned by `initialize` and `Session::edit`, for changing
//!   locks and properties while the vault is open (`editor`)
//! - `Session`, returned by `authenticate`, for reading secrets (`session`)
//!
//! Encoded layout:
//!
//! ```text
//! [version: 1 byte][property(id)][property(vault)][property(secret)]
//! [map(secret properties)][map(public properties)][map(locks)]
//! ```
//!
//! Absent optional fields are written as empty properties.  Maps are
//! written in key order.

pub mod editor;
pub mod session;

use std::collections::BTreeMap;

pub use editor::Editor;
pub use session::Session;

use crate::codec::{Decoder, Encoder};
use crate::errors::{VaultLockError, Result};
use crate::lock::{AsyncUnlocker, LockProtected, Token, Unlocker};
use crate::store::DataStore;
use crate::vault::{EncryptedValue, Property, Vault};

/// Current authenticator encoding version.
pub const AUTHENTICATOR_FORMAT_VERSION: u8 = 1;

/// Id given to authenticators created without one.
pub const DEFAULT_ID: &str = "default";

/// Vault, locks and secret/public properties as one durable object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticator {
    id: String,
    vault: Option<Vault>,
    secret: Option<EncryptedValue>,
    secret_properties: BTreeMap<String, EncryptedValue>,
    public_properties: BTreeMap<String, Property>,
    locks: BTreeMap<String, Vec<u8>>,
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::create()
    }
}

impl Authenticator {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// An empty authenticator with the default id.
    pub fn create() -> Self {
        Self::with_id(DEFAULT_ID)
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vault: None,
            secret: None,
            secret_properties: BTreeMap::new(),
            public_properties: BTreeMap::new(),
            locks: BTreeMap::new(),
        }
    }

    /// Replace everything with a fresh vault holding the given values.
    ///
    /// Existing locks, secrets and public properties are discarded.  The
    /// returned `Editor` holds the new vault open; register at least one
    /// lock through it or the secret can never be read back.
    pub fn initialize(
        &mut self,
        secret: Option<&[u8]>,
        secret_properties: &[(&str, &[u8])],
        public_properties: &[(&str, Property)],
    ) -> Result<Editor<'_>> {
        let open = Vault::create()?;
        self.reset(true);
        self.vault = Some(open.vault().clone());

        if let Some(secret) = secret {
            self.update_secret(secret)?;
        }
        for (id, value) in secret_properties {
            self.update_secret_property(id, value)?;
        }
        for (id, value) in public_properties {
            self.update_public_property(id, value.clone());
        }

        tracing::debug!(id = %self.id, "initialized authenticator");
        Ok(Editor::owned(self, open))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vault(&self) -> Option<&Vault> {
        self.vault.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.vault.is_some()
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn secret_property_ids(&self) -> impl Iterator<Item = &str> {
        self.secret_properties.keys().map(String::as_str)
    }

    pub fn public_properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.public_properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn lock_ids(&self) -> impl Iterator<Item = &str> {
        self.locks.keys().map(String::as_str)
    }

    fn initialized_vault(&self) -> Result<&Vault> {
        self.vault
            .as_ref()
            .ok_or_else(|| VaultLockError::Authenticator("authenticator is not initialized".into()))
    }

    // ------------------------------------------------------------------
    // Secret values
    // ------------------------------------------------------------------

    /// Encrypt `value` under the vault without storing it.
    pub fn encrypt(&self, value: &[u8]) -> Result<EncryptedValue> {
        self.initialized_vault()?.encrypt(value, None)
    }

    pub fn update_secret(&mut self, value: &[u8]) -> Result<()> {
        self.secret = Some(self.encrypt(value)?);
        Ok(())
    }

    pub fn remove_secret(&mut self) {
        self.secret = None;
    }

    pub fn update_secret_property(&mut self, id: &str, value: &[u8]) -> Result<()> {
        let encrypted = self.encrypt(value)?;
        self.secret_properties.insert(id.to_string(), encrypted);
        Ok(())
    }

    pub fn remove_secret_property(&mut self, id: &str) {
        self.secret_properties.remove(id);
    }

    // ------------------------------------------------------------------
    // Public values
    // ------------------------------------------------------------------

    pub fn public_property(&self, id: &str) -> Option<&Property> {
        self.public_properties.get(id)
    }

    pub fn update_public_property(&mut self, id: &str, value: impl Into<Property>) {
        self.public_properties.insert(id.to_string(), value.into());
    }

    pub fn remove_public_property(&mut self, id: &str) {
        self.public_properties.remove(id);
    }

    // ------------------------------------------------------------------
    // Locks
    // ------------------------------------------------------------------

    pub fn lock_enabled(&self, lock_id: &str) -> bool {
        self.locks.contains_key(lock_id)
    }

    /// Decoded token of a registered lock.
    pub fn lock_token(&self, lock_id: &str) -> Result<Token> {
        let bytes = self.lock_bytes(lock_id)?;
        Token::restore(bytes)
            .map_err(|e| VaultLockError::Authenticator(format!("failed to decode lock token: {e}")))
    }

    /// Remove a lock and return its encoded token, if it was registered.
    pub fn unregister_lock(&mut self, lock_id: &str) -> Option<Vec<u8>> {
        let removed = self.locks.remove(lock_id);
        if removed.is_some() {
            tracing::debug!(lock_id, "unregistered lock");
        }
        removed
    }

    fn lock_bytes(&self, lock_id: &str) -> Result<&[u8]> {
        self.locks
            .get(lock_id)
            .map(Vec::as_slice)
            .ok_or_else(|| VaultLockError::Authenticator(format!("no lock with id '{lock_id}'")))
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Unlock the vault through the lock `lock_id`.
    pub fn authenticate<U: Unlocker>(&mut self, lock_id: &str, unlocker: U) -> Result<Session<'_>> {
        let open = {
            let this = &*self;
            let bytes = this.lock_bytes(lock_id)?;
            let vault = this.initialized_vault()?;
            let token = unlocker.decode(bytes).map_err(|e| {
                VaultLockError::Authenticator(format!("failed to decode lock token: {e}"))
            })?;
            tracing::debug!(lock_id, alias = token.alias(), "decoded lock token");

            unlocker
                .unlock(this, lock_id, token, LockProtected::new(vault))
                .inspect_err(|e| tracing::warn!(lock_id, error = %e, "unlock attempt failed"))?
        };
        Ok(Session::new(self, open))
    }

    /// Async form of `authenticate`, required by locks that prompt the user.
    pub async fn authenticate_async<U: AsyncUnlocker>(
        &mut self,
        lock_id: &str,
        unlocker: U,
    ) -> Result<Session<'_>> {
        let open = {
            let this = &*self;
            let bytes = this.lock_bytes(lock_id)?;
            let vault = this.initialized_vault()?;
            let token = unlocker.decode(bytes).map_err(|e| {
                VaultLockError::Authenticator(format!("failed to decode lock token: {e}"))
            })?;
            tracing::debug!(lock_id, alias = token.alias(), "decoded lock token");

            unlocker
                .unlock(this, lock_id, token, LockProtected::new(vault))
                .await
                .inspect_err(|e| tracing::warn!(lock_id, error = %e, "unlock attempt failed"))?
        };
        Ok(Session::new(self, open))
    }

    /// Authenticate, run `block` with the session, then close it.
    pub fn authenticated<U, T, F>(&mut self, lock_id: &str, unlocker: U, block: F) -> Result<T>
    where
        U: Unlocker,
        F: FnOnce(&mut Session<'_>) -> Result<T>,
    {
        let mut session = self.authenticate(lock_id, unlocker)?;
        block(&mut session)
    }

    /// Authenticate and decrypt the main secret.
    pub fn authenticated_secret<U: Unlocker>(&mut self, lock_id: &str, unlocker: U) -> Result<Property> {
        self.authenticated(lock_id, unlocker, |session| session.secret())
    }

    // ------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------

    /// Forget the secret, all properties and all locks.  With
    /// `reset_vault` the vault itself is dropped too.
    pub fn reset(&mut self, reset_vault: bool) {
        self.secret = None;
        self.secret_properties.clear();
        self.public_properties.clear();
        self.locks.clear();
        if reset_vault {
            self.vault = None;
        }
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    pub fn encode(&self) -> Vec<u8> {
        let vault = self.vault.as_ref().map(Vault::encode);
        Encoder::with_prefix(&[AUTHENTICATOR_FORMAT_VERSION])
            .property(self.id.as_bytes())
            .optional_property(vault.as_deref())
            .optional_property(self.secret.as_ref().map(EncryptedValue::as_bytes))
            .property_map(
                self.secret_properties
                    .iter()
                    .map(|(k, v)| (k.as_bytes(), v.as_bytes())),
            )
            .property_map(
                self.public_properties
                    .iter()
                    .map(|(k, v)| (k.as_bytes(), v.as_bytes())),
            )
            .property_map(self.locks.iter().map(|(k, v)| (k.as_bytes(), v.as_slice())))
            .finish()
    }

    pub fn restore(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        if !decoder.check_value_equals(&[AUTHENTICATOR_FORMAT_VERSION])? {
            return Err(VaultLockError::Coding(format!(
                "unsupported authenticator version, expected {AUTHENTICATOR_FORMAT_VERSION}"
            )));
        }

        let id = decoder.read_string()?;
        if id.is_empty() {
            return Err(VaultLockError::Coding("authenticator has no id".into()));
        }
        let vault = decoder
            .read_optional_property()?
            .ok_or_else(|| VaultLockError::Coding("authenticator has no vault".into()))?;
        let vault = Vault::restore(vault)?;
        let secret = decoder
            .read_optional_property()?
            .map(|bytes| EncryptedValue::new(bytes.to_vec()));

        let secret_properties = read_map(&mut decoder, |v| EncryptedValue::new(v.to_vec()))?;
        let public_properties = read_map(&mut decoder, |v| Property::new(v.to_vec()))?;
        let locks = read_map(&mut decoder, <[u8]>::to_vec)?;

        if decoder.remaining() != 0 {
            return Err(VaultLockError::Coding(format!(
                "{} trailing bytes after authenticator",
                decoder.remaining()
            )));
        }

        Ok(Self {
            id: id.to_string(),
            vault: Some(vault),
            secret,
            secret_properties,
            public_properties,
            locks,
        })
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encode and write to `store` under `key`.
    ///
    /// Refuses to save an uninitialized authenticator, or one with no
    /// locks, since its secret could never be read back.
    pub fn save(&self, store: &dyn DataStore, key: &str) -> Result<()> {
        self.initialized_vault()?;
        if self.locks.is_empty() {
            return Err(VaultLockError::Authenticator(
                "refusing to save an authenticator with no locks".into(),
            ));
        }
        store.set(key, Some(&self.encode()))
    }

    /// Read back what `save` wrote, or `None` if `key` is absent.
    pub fn load(store: &dyn DataStore, key: &str) -> Result<Option<Self>> {
        store.get(key)?.map(|bytes| Self::restore(&bytes)).transpose()
    }
}

fn read_map<V>(decoder: &mut Decoder<'_>, value: impl Fn(&[u8]) -> V) -> Result<BTreeMap<String, V>> {
    decoder
        .read_property_map()?
        .into_iter()
        .map(|(k, v)| {
            let key = std::str::from_utf8(k)
                .map_err(|e| VaultLockError::Coding(format!("map key is not valid UTF-8: {e}")))?;
            Ok((key.to_string(), value(v)))
        })
        .collect()
}
