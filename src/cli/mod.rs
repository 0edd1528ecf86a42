//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use zeroize::Zeroizing;

use crate::authenticator::{Authenticator, Session};
use crate::config::Settings;
use crate::errors::{VaultLockError, Result};
use crate::keystore::KeyStore;
use crate::lock::PasswordLock;
use crate::store::{DataStore, FileDataStore};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Minimum PIN length.
const MIN_PIN_LEN: usize = 4;

/// Lock id of the password lock.
pub const PASSWORD_LOCK_ID: &str = "password";

/// Lock id of the PIN lock.
pub const PIN_LOCK_ID: &str = "pin";

/// VaultLock CLI: a secret guarded by interchangeable locks.
#[derive(Parser)]
#[command(
    name = "vaultlock",
    about = "Keep a secret behind password and PIN locks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store directory (default: from vaultlock.toml, else .vaultlock)
    #[arg(long, global = true)]
    pub store_dir: Option<String>,

    /// Authenticator id (default: from vaultlock.toml, else "default")
    #[arg(long, global = true)]
    pub id: Option<String>,

    /// Lock used to unlock
    #[arg(long, value_enum, default_value_t = LockKind::Password, global = true)]
    pub lock: LockKind,
}

/// Knowledge-factor locks the CLI can unlock with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LockKind {
    Password,
    Pin,
}

impl LockKind {
    pub fn lock_id(self) -> &'static str {
        match self {
            Self::Password => PASSWORD_LOCK_ID,
            Self::Pin => PIN_LOCK_ID,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Pin => "PIN",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Self::Password => "VAULTLOCK_PASSWORD",
            Self::Pin => "VAULTLOCK_PIN",
        }
    }

    pub fn new_env_var(self) -> &'static str {
        match self {
            Self::Password => "VAULTLOCK_NEW_PASSWORD",
            Self::Pin => "VAULTLOCK_NEW_PIN",
        }
    }
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create an authenticator protected by a password
    Init {
        /// Replace an existing authenticator
        #[arg(short, long)]
        force: bool,
    },

    /// Print the main secret, or replace it when a value is given
    Secret {
        /// New secret value
        value: Option<String>,
        /// Read the new value from an interactive prompt
        #[arg(long, conflicts_with = "value")]
        prompt: bool,
    },

    /// Set a secret property (no unlock needed)
    Set {
        /// Property name
        key: String,
        /// Property value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Get a secret property's value
    Get {
        /// Property name
        key: String,
    },

    /// Delete a secret property
    Delete {
        /// Property name
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Manage public (unencrypted) properties
    Public {
        #[command(subcommand)]
        action: PublicAction,
    },

    /// List properties and locks
    List,

    /// Change the password (or, with --lock pin, the PIN)
    Passwd,

    /// Manage the PIN lock
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },

    /// Delete the authenticator and its lock keys
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },

    /// Show version information
    Version,
}

/// Public property subcommands.
#[derive(clap::Subcommand)]
pub enum PublicAction {
    /// Set a public property
    Set { key: String, value: String },
    /// Print a public property
    Get { key: String },
    /// Delete a public property
    Delete { key: String },
}

/// PIN lock subcommands.
#[derive(clap::Subcommand)]
pub enum PinAction {
    /// Add (or replace) the PIN lock; unlocks with the password
    Add,
    /// Remove the PIN lock
    Remove,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Everything a command needs: settings, stores and the selected ids.
pub struct Context {
    pub settings: Settings,
    pub authenticator_id: String,
    pub store_dir: PathBuf,
    pub data_store: FileDataStore,
    pub key_store: Box<dyn KeyStore>,
}

impl Context {
    /// Resolve settings from `vaultlock.toml` in the current directory,
    /// with CLI flags taking precedence.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let settings = Settings::load(&cwd)?;

        let store_dir = match &cli.store_dir {
            Some(dir) => cwd.join(dir),
            None => settings.store_path(&cwd),
        };
        let authenticator_id = cli
            .id
            .clone()
            .unwrap_or_else(|| settings.authenticator_id.clone());

        let data_store = FileDataStore::new(&store_dir);
        // Fail early on ids that cannot be stored.
        data_store.path_for(&authenticator_id)?;

        Ok(Self {
            key_store: key_store(&store_dir),
            settings,
            authenticator_id,
            store_dir,
            data_store,
        })
    }

    /// Load the authenticator, failing with a hint if none exists yet.
    pub fn load_authenticator(&self) -> Result<Authenticator> {
        Authenticator::load(&self.data_store, &self.authenticator_id)?.ok_or_else(|| {
            VaultLockError::CommandFailed(format!(
                "no authenticator '{}' in {} (run `vaultlock init` first)",
                self.authenticator_id,
                self.store_dir.display()
            ))
        })
    }

    pub fn save_authenticator(&self, authenticator: &Authenticator) -> Result<()> {
        authenticator.save(&self.data_store, &self.authenticator_id)
    }

    pub fn authenticator_exists(&self) -> Result<bool> {
        self.data_store.contains(&self.authenticator_id)
    }

    /// A password or PIN lock configured from settings.
    pub fn password_lock(&self, kind: LockKind) -> PasswordLock<'_> {
        let lock = match kind {
            LockKind::Password => PasswordLock::password(self.key_store.as_ref()),
            LockKind::Pin => PasswordLock::pin(self.key_store.as_ref()),
        };
        lock.kdf_params(self.settings.kdf_params())
            .strong_box(self.settings.use_strong_box)
    }

    /// Prompt for the `kind` guard and run `block` in an authenticated
    /// session.
    pub fn unlock<T, F>(&self, authenticator: &mut Authenticator, kind: LockKind, block: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'_>) -> Result<T>,
    {
        if !authenticator.lock_enabled(kind.lock_id()) {
            return Err(VaultLockError::CommandFailed(format!(
                "no {} lock is registered",
                kind.label()
            )));
        }
        let guard = prompt_guard(kind)?;
        let lock = self.password_lock(kind);
        authenticator.authenticated(kind.lock_id(), lock.with_password(&guard), block)
    }
}

#[cfg(feature = "keyring-store")]
fn key_store(_store_dir: &std::path::Path) -> Box<dyn KeyStore> {
    Box::new(crate::keystore::KeyringKeyStore::new())
}

#[cfg(not(feature = "keyring-store"))]
fn key_store(store_dir: &std::path::Path) -> Box<dyn KeyStore> {
    Box::new(crate::keystore::FileKeyStore::open(store_dir.join("keys")))
}

/// Get the current password or PIN, trying in order:
/// 1. `VAULTLOCK_PASSWORD` / `VAULTLOCK_PIN` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the value is wiped from memory on drop.
pub fn prompt_guard(kind: LockKind) -> Result<Zeroizing<String>> {
    if let Some(value) = env_guard(kind.env_var()) {
        return Ok(value);
    }

    let value = dialoguer::Password::new()
        .with_prompt(format!("Enter {}", kind.label()))
        .interact()
        .map_err(|e| VaultLockError::CommandFailed(format!("{} prompt: {e}", kind.label())))?;
    Ok(Zeroizing::new(value))
}

/// Prompt for a new password or PIN with confirmation.
///
/// `env_var` overrides the prompt for scripted use.  Enforces the
/// minimum length (and digits-only for PINs).
pub fn prompt_new_guard(kind: LockKind, env_var: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(value) = env_var.and_then(env_guard) {
        validate_new_guard(kind, &value)?;
        return Ok(value);
    }

    loop {
        let value = dialoguer::Password::new()
            .with_prompt(format!("Choose {}", kind.label()))
            .with_confirmation(
                format!("Confirm {}", kind.label()),
                format!("{}s do not match, try again", kind.label()),
            )
            .interact()
            .map_err(|e| VaultLockError::CommandFailed(format!("{} prompt: {e}", kind.label())))?;
        let value = Zeroizing::new(value);

        match validate_new_guard(kind, &value) {
            Ok(()) => return Ok(value),
            Err(e) => output::warning(&format!("{e}. Try again.")),
        }
    }
}

fn env_guard(name: &str) -> Option<Zeroizing<String>> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(Zeroizing::new)
}

/// Check a new password or PIN against the minimum requirements.
pub fn validate_new_guard(kind: LockKind, value: &str) -> Result<()> {
    match kind {
        LockKind::Password if value.len() < MIN_PASSWORD_LEN => Err(VaultLockError::CommandFailed(
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        )),
        LockKind::Pin if value.len() < MIN_PIN_LEN || !value.bytes().all(|b| b.is_ascii_digit()) => {
            Err(VaultLockError::CommandFailed(format!(
                "PIN must be at least {MIN_PIN_LEN} digits"
            )))
        }
        _ => Ok(()),
    }
}

/// Read a value from the argument or, if absent, a hidden prompt.
pub fn value_or_prompt(value: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    match value {
        Some(v) => Ok(Zeroizing::new(v.to_string())),
        None => dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| VaultLockError::CommandFailed(format!("value prompt: {e}"))),
    }
}

/// Ask for confirmation unless `force` is set.
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| VaultLockError::CommandFailed(format!("confirm prompt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_needs_minimum_length() {
        assert!(validate_new_guard(LockKind::Password, "short").is_err());
        assert!(validate_new_guard(LockKind::Password, "long-enough").is_ok());
    }

    #[test]
    fn pin_must_be_digits() {
        assert!(validate_new_guard(LockKind::Pin, "123").is_err());
        assert!(validate_new_guard(LockKind::Pin, "12a4").is_err());
        assert!(validate_new_guard(LockKind::Pin, "1234").is_ok());
    }

    #[test]
    fn lock_ids_are_stable() {
        assert_eq!(LockKind::Password.lock_id(), "password");
        assert_eq!(LockKind::Pin.lock_id(), "pin");
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
