//! File-backed key store.
//!
//! Each alias is stored as `<dir>/<alias>.key`, written with owner-only
//! permissions on Unix.  Aliases are restricted to ASCII letters,
//! digits, `_`, `-` and `.` so they map directly onto file names.

use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto::SecretBytes;
use crate::errors::{VaultLockError, Result};

use super::software::{EntryBackend, SoftwareKeyStore};

/// Extension used for key entry files.
const KEY_FILE_EXT: &str = "key";

/// Maximum alias length accepted by the file backend.
const MAX_ALIAS_LEN: usize = 200;

/// Key entries stored as individual files in a directory.
#[derive(Debug, Clone)]
pub struct FileEntries {
    dir: PathBuf,
}

impl FileEntries {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, alias: &str) -> Result<PathBuf> {
        validate_alias(alias)?;
        Ok(self.dir.join(format!("{alias}.{KEY_FILE_EXT}")))
    }
}

impl EntryBackend for FileEntries {
    fn load(&self, alias: &str) -> Result<Option<SecretBytes>> {
        let path = self.entry_path(alias)?;
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(&path).map_err(|e| {
            VaultLockError::KeyStore(format!("failed to read key file {}: {e}", path.display()))
        })?;
        Ok(Some(SecretBytes::new(data)))
    }

    fn store(&self, alias: &str, entry: &[u8]) -> Result<()> {
        let path = self.entry_path(alias)?;

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                VaultLockError::KeyStore(format!("cannot create key directory: {e}"))
            })?;
        }

        fs::write(&path, entry)
            .map_err(|e| VaultLockError::KeyStore(format!("failed to write key file: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).map_err(|e| {
                VaultLockError::KeyStore(format!("failed to set key file permissions: {e}"))
            })?;
        }

        Ok(())
    }

    fn delete(&self, alias: &str) -> Result<()> {
        let path = self.entry_path(alias)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultLockError::KeyStore(format!(
                "failed to delete key file {}: {e}",
                path.display()
            ))),
        }
    }
}

/// A key store that keeps one file per alias.
pub type FileKeyStore = SoftwareKeyStore<FileEntries>;

impl FileKeyStore {
    /// Use `dir` for key files.  The directory is created on first write.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::with_backend(FileEntries { dir: dir.into() })
    }
}

fn validate_alias(alias: &str) -> Result<()> {
    if alias.is_empty() || alias.len() > MAX_ALIAS_LEN {
        return Err(VaultLockError::KeyStore(format!(
            "key alias must be 1-{MAX_ALIAS_LEN} characters"
        )));
    }
    if alias.starts_with('.')
        || !alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(VaultLockError::KeyStore(format!(
            "invalid key alias '{alias}'"
        )));
    }
    Ok(())
}
