//! In-memory data store.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::{VaultLockError, Result};

use super::DataStore;

/// A `DataStore` kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryDataStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> VaultLockError {
    VaultLockError::DataStore("memory data store is poisoned".into())
}

impl DataStore for MemoryDataStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Option<&[u8]>) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        match value {
            Some(bytes) => {
                entries.insert(key.to_string(), bytes.to_vec());
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.contains_key(key))
    }
}
