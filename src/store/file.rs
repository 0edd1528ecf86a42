//! File-backed data store.
//!
//! Each key is stored as `<dir>/<key>.bin`.  Writes go to a temporary
//! file in the same directory and are renamed into place, so a crash
//! never leaves a half-written blob behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{VaultLockError, Result};

use super::DataStore;

/// Extension used for stored blobs.
const BLOB_EXT: &str = "bin";

/// A `DataStore` with one file per key.
#[derive(Debug, Clone)]
pub struct FileDataStore {
    dir: PathBuf,
}

impl FileDataStore {
    /// Use `dir` for blobs.  The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{BLOB_EXT}")))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let tmp_path = self.dir.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        fs::write(&tmp_path, bytes)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

impl DataStore for FileDataStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultLockError::DataStore(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: Option<&[u8]>) -> Result<()> {
        let path = self.path_for(key)?;
        match value {
            Some(bytes) => {
                self.write_atomic(&path, bytes)?;
                tracing::debug!(key, bytes = bytes.len(), "wrote blob");
                Ok(())
            }
            None => match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(VaultLockError::DataStore(format!(
                    "failed to remove {}: {e}",
                    path.display()
                ))),
            },
        }
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.path_for(key)?.exists())
    }
}

/// Allowed: ASCII letters, digits, underscores, hyphens, periods.  Must
/// be non-empty, at most 256 characters and not start with a period.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(VaultLockError::DataStore("key cannot be empty".into()));
    }
    if key.len() > 256 {
        return Err(VaultLockError::DataStore(
            "key cannot exceed 256 characters".into(),
        ));
    }
    if key.starts_with('.')
        || !key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(VaultLockError::DataStore(format!(
            "key '{key}' contains invalid characters; only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}
