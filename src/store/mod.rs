//! Byte-blob key-value persistence.
//!
//! The authenticator persists itself through a `DataStore` as one opaque
//! blob per key.  No schema lives here:
//!
//! - `MemoryDataStore`: an in-process map
//! - `FileDataStore`: one file per key, written atomically

pub mod file;
pub mod memory;

pub use file::FileDataStore;
pub use memory::MemoryDataStore;

use crate::errors::Result;

/// A key-value store of byte blobs.
pub trait DataStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`; `None` removes the key.
    fn set(&self, key: &str, value: Option<&[u8]>) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove `key`.  Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()> {
        self.set(key, None)
    }
}
