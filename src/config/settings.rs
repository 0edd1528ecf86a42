use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::authenticator::DEFAULT_ID;
use crate::crypto::KdfParams;
use crate::errors::{VaultLockError, Result};

/// Project-level configuration, loaded from `vaultlock.toml`.
///
/// Every field has a default, so no config file is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Authenticator used when `--id` is not given.
    #[serde(default = "default_authenticator_id")]
    pub authenticator_id: String,

    /// Directory (relative to the project root) holding the encoded
    /// authenticators and key files.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Ask the key store for a secure element when generating keys.
    #[serde(default)]
    pub use_strong_box: bool,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_kdf_memory_kib")]
    pub kdf_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_authenticator_id() -> String {
    DEFAULT_ID.to_string()
}

fn default_store_dir() -> String {
    ".vaultlock".to_string()
}

fn default_kdf_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            authenticator_id: default_authenticator_id(),
            store_dir: default_store_dir(),
            use_strong_box: false,
            kdf_memory_kib: default_kdf_memory_kib(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = "vaultlock.toml";

    /// Load settings from `<project_dir>/vaultlock.toml`.
    ///
    /// A missing file yields the defaults; an unparsable file or invalid
    /// KDF parameters are an error.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultLockError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.kdf_params().validate().map_err(|e| {
            VaultLockError::ConfigError(format!("{}: {e}", config_path.display()))
        })?;

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Full path of the store directory.
    ///
    /// Example: `project_dir/.vaultlock`
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.store_dir)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.kdf_memory_kib,
            iterations: self.kdf_iterations,
            parallelism: self.kdf_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
