//! In-memory key store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::crypto::SecretBytes;
use crate::errors::{VaultLockError, Result};

use super::software::{EntryBackend, SoftwareKeyStore};

/// Key entries held in process memory.  Everything is lost on drop.
#[derive(Debug, Default)]
pub struct MemoryEntries {
    entries: Mutex<HashMap<String, SecretBytes>>,
}

impl MemoryEntries {
    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, SecretBytes>>> {
        self.entries
            .lock()
            .map_err(|_| VaultLockError::KeyStore("memory key store is poisoned".into()))
    }

    /// Number of stored aliases.
    pub fn len(&self) -> usize {
        self.entries().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntryBackend for MemoryEntries {
    fn load(&self, alias: &str) -> Result<Option<SecretBytes>> {
        Ok(self.entries()?.get(alias).cloned())
    }

    fn store(&self, alias: &str, entry: &[u8]) -> Result<()> {
        self.entries()?
            .insert(alias.to_string(), SecretBytes::from_slice(entry));
        Ok(())
    }

    fn delete(&self, alias: &str) -> Result<()> {
        self.entries()?.remove(alias);
        Ok(())
    }
}

/// A key store that lives only as long as the process.
pub type MemoryKeyStore = SoftwareKeyStore<MemoryEntries>;

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}
