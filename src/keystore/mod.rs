//! Key-store capability consumed by locks.
//!
//! A key store holds symmetric keys and X25519 keypairs under string
//! aliases and performs operations with them without handing out the
//! raw key material.  Platform stores (a secure element, the OS
//! credential manager) plug in behind the `KeyStore` trait; this crate
//! ships software implementations:
//!
//! - `MemoryKeyStore`: process memory, for tests and ephemeral use
//! - `FileKeyStore`: one owner-only file per alias
//! - `KeyringKeyStore`: the OS keyring (feature `keyring-store`)
//!
//! Keypairs generated with `require_user_presence` produce decrypt
//! ciphers that refuse to run until a presence check (the biometric
//! prompt) has authorized them.

pub mod file;
pub mod memory;
pub mod software;

#[cfg(feature = "keyring-store")]
pub mod keyring;

use std::fmt;

use crate::crypto::asymmetric::PUBLIC_KEY_LEN;
use crate::crypto::hybrid;
use crate::errors::Result;

pub use file::FileKeyStore;
pub use memory::MemoryKeyStore;
pub use software::{EntryBackend, SoftwareKeyStore};

#[cfg(feature = "keyring-store")]
pub use self::keyring::KeyringKeyStore;

/// Options applied when a key is generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOptions {
    /// Ask for a dedicated secure element when the platform has one.
    pub strong_box: bool,
    /// Gate the private half behind a user-presence proof.
    pub require_user_presence: bool,
}

/// A symmetric key held by the store.
pub trait SecretKeyHandle: Send + Sync {
    fn alias(&self) -> &str;

    /// Authenticated encryption under the stored key.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Reverse `encrypt`.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// An asymmetric keypair held by the store.
pub trait KeyPairHandle: Send + Sync {
    fn alias(&self) -> &str;

    fn public_key(&self) -> [u8; PUBLIC_KEY_LEN];

    /// Hybrid-encrypt under the public half.  Never needs user presence.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        hybrid::encrypt(&self.public_key(), plaintext)
    }

    /// A decrypt-mode cipher over the private half.  For presence-gated
    /// keys it stays locked until `authorize` is called.
    fn decrypt_cipher(&self) -> Result<CipherHandle>;
}

/// A decrypt-mode cipher object, possibly still awaiting authorization.
pub trait DecryptCipher: Send + Sync {
    /// `true` if `do_final` needs a prior `authorize`.
    fn requires_user_presence(&self) -> bool;

    /// Record that the user proved presence.  Called by the prompt
    /// collaborator once the user approves.
    fn authorize(&mut self);

    /// Open one sealed box produced under the matching public key.
    fn do_final(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// An owned decrypt cipher.
pub type CipherHandle = Box<dyn DecryptCipher>;

impl fmt::Debug for dyn DecryptCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptCipher")
            .field("requires_user_presence", &self.requires_user_presence())
            .finish_non_exhaustive()
    }
}

/// Stores keys by alias and performs operations with them.
pub trait KeyStore: Send + Sync {
    /// Generate (or replace) a symmetric key under `alias`.
    fn generate_secret_key(
        &self,
        alias: &str,
        options: KeyOptions,
    ) -> Result<Box<dyn SecretKeyHandle>>;

    /// Look up an existing symmetric key.
    fn secret_key(&self, alias: &str) -> Result<Box<dyn SecretKeyHandle>>;

    /// Generate (or replace) a keypair under `alias`.
    fn generate_key_pair(&self, alias: &str, options: KeyOptions)
        -> Result<Box<dyn KeyPairHandle>>;

    /// Look up an existing keypair.
    fn key_pair(&self, alias: &str) -> Result<Box<dyn KeyPairHandle>>;

    /// Remove `alias`.  Removing a missing alias is not an error.
    fn delete_entry(&self, alias: &str) -> Result<()>;

    fn contains_alias(&self, alias: &str) -> Result<bool>;
}
