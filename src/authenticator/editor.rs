//! Changing locks and properties while the vault is open.

use super::Authenticator;
use crate::errors::Result;
use crate::lock::{AsyncRegistration, LockRegister, Registration, Token};
use crate::vault::{OpenVault, Property};

enum EditorVault<'a> {
    /// Fresh from `initialize`; closed when the editor is dropped.
    Owned(OpenVault),
    /// Held by a session.
    Borrowed(&'a OpenVault),
}

impl EditorVault<'_> {
    fn get(&self) -> &OpenVault {
        match self {
            Self::Owned(vault) => vault,
            Self::Borrowed(vault) => vault,
        }
    }
}

/// Mutable access to an authenticator whose vault is open.
///
/// Obtained from `Authenticator::initialize` or `Session::edit`.  Lock
/// registration is only possible here, because it needs the private key.
pub struct Editor<'a> {
    authenticator: &'a mut Authenticator,
    vault: EditorVault<'a>,
}

impl<'a> Editor<'a> {
    pub(super) fn owned(authenticator: &'a mut Authenticator, vault: OpenVault) -> Self {
        Self {
            authenticator,
            vault: EditorVault::Owned(vault),
        }
    }

    pub(super) fn borrowed(authenticator: &'a mut Authenticator, vault: &'a OpenVault) -> Self {
        Self {
            authenticator,
            vault: EditorVault::Borrowed(vault),
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &*self.authenticator
    }

    pub fn open_vault(&self) -> &OpenVault {
        self.vault.get()
    }

    // ------------------------------------------------------------------
    // Locks
    // ------------------------------------------------------------------

    /// Register (or replace) the lock `lock_id`.
    ///
    /// Built-in locks write a new key-store key on every registration.  A
    /// replaced token's key is left in place so saved copies keep opening;
    /// drop it with `lock::remove_key` once the new state is saved.
    pub fn register_lock<R: Registration>(&mut self, lock_id: &str, registration: R) -> Result<()> {
        self.register_lock_with(lock_id, Token::encode, |authenticator, register| {
            registration.register(authenticator, lock_id, register)
        })
    }

    /// Register a lock whose token type is not `Token`.
    ///
    /// `registration` locks the private key through `LockRegister`;
    /// `encoder` turns its result into the bytes kept in the lock map.
    pub fn register_lock_with<T, E, F>(&mut self, lock_id: &str, encoder: E, registration: F) -> Result<()>
    where
        E: FnOnce(&T) -> Vec<u8>,
        F: FnOnce(&Authenticator, LockRegister<'_>) -> Result<T>,
    {
        let token = registration(&*self.authenticator, LockRegister::new(self.vault.get()))?;
        self.authenticator
            .locks
            .insert(lock_id.to_string(), encoder(&token));
        tracing::debug!(lock_id, "registered lock");
        Ok(())
    }

    /// Async form of `register_lock`.
    pub async fn register_lock_async<R: AsyncRegistration>(
        &mut self,
        lock_id: &str,
        registration: R,
    ) -> Result<()> {
        let token = registration
            .register(&*self.authenticator, lock_id, LockRegister::new(self.vault.get()))
            .await?;
        self.authenticator
            .locks
            .insert(lock_id.to_string(), token.encode());
        tracing::debug!(lock_id, "registered lock");
        Ok(())
    }

    pub fn unregister_lock(&mut self, lock_id: &str) -> Option<Vec<u8>> {
        self.authenticator.unregister_lock(lock_id)
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    pub fn update_secret(&mut self, value: &[u8]) -> Result<()> {
        self.authenticator.update_secret(value)
    }

    pub fn remove_secret(&mut self) {
        self.authenticator.remove_secret();
    }

    pub fn update_secret_property(&mut self, id: &str, value: &[u8]) -> Result<()> {
        self.authenticator.update_secret_property(id, value)
    }

    pub fn remove_secret_property(&mut self, id: &str) {
        self.authenticator.remove_secret_property(id);
    }

    pub fn update_public_property(&mut self, id: &str, value: impl Into<Property>) {
        self.authenticator.update_public_property(id, value);
    }

    pub fn remove_public_property(&mut self, id: &str) {
        self.authenticator.remove_public_property(id);
    }
}
