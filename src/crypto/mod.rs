//! Cryptographic primitives for VaultLock.
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`) and the
//!   password-derived cipher built on it (`password`)
//! - X25519 sealed-box asymmetric encryption (`asymmetric`)
//! - Hybrid asymmetric + symmetric encryption (`hybrid`)
//! - Self-wiping buffers for key material (`secret`)

pub mod asymmetric;
pub mod encryption;
pub mod hybrid;
pub mod kdf;
pub mod password;
pub mod secret;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, SecretBytes, ...};
pub use encryption::{decrypt, encrypt, generate_key};
pub use kdf::{derive_key, generate_salt, KdfParams};
pub use password::PasswordCipher;
pub use secret::{SecretBytes, SecretKey};
