//! Reading secrets after a successful unlock.

use super::{Authenticator, Editor};
use crate::errors::{VaultLockError, Result};
use crate::vault::{EncryptedValue, OpenVault, Property};

/// An authenticated session.  Holds the vault open until dropped or
/// closed.
pub struct Session<'a> {
    authenticator: &'a mut Authenticator,
    vault: OpenVault,
}

impl<'a> Session<'a> {
    pub(super) fn new(authenticator: &'a mut Authenticator, vault: OpenVault) -> Self {
        Self {
            authenticator,
            vault,
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &*self.authenticator
    }

    /// Decrypt the main secret.
    pub fn secret(&self) -> Result<Property> {
        let encrypted = self
            .authenticator
            .secret
            .as_ref()
            .ok_or_else(|| VaultLockError::Authenticator("secret not registered".into()))?;
        self.decrypt(encrypted).map(Property::new)
    }

    pub fn secret_property(&self, id: &str) -> Result<Property> {
        let encrypted = self
            .authenticator
            .secret_properties
            .get(id)
            .ok_or_else(|| VaultLockError::Authenticator(format!("no property for id '{id}'")))?;
        self.decrypt(encrypted).map(Property::new)
    }

    /// Decrypt any value encrypted under this authenticator's vault.
    pub fn decrypt(&self, encrypted: &EncryptedValue) -> Result<Vec<u8>> {
        self.vault.decrypt(encrypted)
    }

    /// Edit locks and properties without unlocking again.
    pub fn edit(&mut self) -> Editor<'_> {
        Editor::borrowed(self.authenticator, &self.vault)
    }

    /// Run `block` with an editor.
    pub fn edit_with<T, F>(&mut self, block: F) -> Result<T>
    where
        F: FnOnce(&mut Editor<'_>) -> Result<T>,
    {
        block(&mut self.edit())
    }

    /// Wipe the private key now.
    pub fn close(mut self) {
        self.vault.close();
    }
}
