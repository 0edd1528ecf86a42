use std::fmt;

use thiserror::Error;

/// Why a biometric unlock did not produce the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricFailure {
    /// The user dismissed or cancelled the prompt.
    Cancellation,
    /// The prompt or the underlying hardware reported an error.
    Error,
}

impl fmt::Display for BiometricFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancellation => f.write_str("cancelled"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// All errors that can occur in VaultLock.
#[derive(Debug, Error)]
pub enum VaultLockError {
    // --- Coding errors ---
    #[error("Malformed encoded data: {0}")]
    Coding(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Plaintext of {size} bytes exceeds the asymmetric limit of {max} bytes")]
    PlaintextTooLarge { size: usize, max: usize },

    // --- Guard outcomes ---
    #[error("Wrong password")]
    WrongPassword,

    #[error("Wrong PIN")]
    WrongPin,

    #[error("Biometric unlock failed ({reason}): {message}")]
    Biometric {
        reason: BiometricFailure,
        message: String,
    },

    // --- Lock errors ---
    #[error("Lock error: {message}")]
    Lock {
        message: String,
        #[source]
        source: Option<Box<VaultLockError>>,
    },

    // --- Key store errors ---
    #[error("Key store error: {0}")]
    KeyStore(String),

    #[error("No key store entry for alias '{0}'")]
    KeyNotFound(String),

    #[error("Key requires user presence before it can be used")]
    UserPresenceRequired,

    // --- Vault / authenticator errors ---
    #[error("Vault error: {message}")]
    Vault {
        message: String,
        #[source]
        source: Option<Box<VaultLockError>>,
    },

    #[error("Authenticator error: {0}")]
    Authenticator(String),

    // --- Persistence errors ---
    #[error("Data store error: {0}")]
    DataStore(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl VaultLockError {
    /// Wrap `cause` as a lock-layer failure.
    pub fn lock(message: impl Into<String>, cause: VaultLockError) -> Self {
        Self::Lock {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Wrap `cause` as a vault-layer failure.
    pub fn vault(message: impl Into<String>, cause: VaultLockError) -> Self {
        Self::Vault {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// A vault precondition failure with no underlying cause.
    pub fn vault_state(message: impl Into<String>) -> Self {
        Self::Vault {
            message: message.into(),
            source: None,
        }
    }

    /// `true` for a password or PIN mismatch.
    pub fn is_wrong_guard(&self) -> bool {
        matches!(self, Self::WrongPassword | Self::WrongPin)
    }

    /// `true` when the user cancelled a biometric prompt.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Biometric {
                reason: BiometricFailure::Cancellation,
                ..
            }
        )
    }
}

/// Convenience type alias for VaultLock results.
pub type Result<T> = std::result::Result<T, VaultLockError>;
