//! Software key store shared by the memory, file and keyring backends.
//!
//! Key material is generated in process and persisted through an
//! `EntryBackend` as a small encoded record:
//!
//! ```text
//! [version: 1 byte][kind: 1 byte][flags: 1 byte][key bytes (rest)]
//! ```
//!
//! For keypairs only the private key is stored; the public half is
//! derived on load.

use crate::codec::{Decoder, Encoder};
use crate::crypto::asymmetric::{self, KeyPair, PUBLIC_KEY_LEN};
use crate::crypto::encryption::{self, KEY_LEN};
use crate::crypto::SecretBytes;
use crate::errors::{VaultLockError, Result};

use super::{
    CipherHandle, DecryptCipher, KeyOptions, KeyPairHandle, KeyStore, SecretKeyHandle,
};

/// Current entry record version.
const ENTRY_VERSION: u8 = 1;

const KIND_SECRET_KEY: u8 = 1;
const KIND_KEY_PAIR: u8 = 2;

const FLAG_STRONG_BOX: u8 = 0b01;
const FLAG_USER_PRESENCE: u8 = 0b10;

/// Raw persistence for encoded key entries.
pub trait EntryBackend: Send + Sync {
    fn load(&self, alias: &str) -> Result<Option<SecretBytes>>;
    fn store(&self, alias: &str, entry: &[u8]) -> Result<()>;
    fn delete(&self, alias: &str) -> Result<()>;
}

/// A `KeyStore` that keeps keys in software on top of an `EntryBackend`.
#[derive(Debug, Default)]
pub struct SoftwareKeyStore<B> {
    backend: B,
}

impl<B: EntryBackend> SoftwareKeyStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn load(&self, alias: &str) -> Result<Entry> {
        let raw = self
            .backend
            .load(alias)?
            .ok_or_else(|| VaultLockError::KeyNotFound(alias.to_string()))?;
        Entry::decode(raw.as_bytes())
    }

    fn save(&self, alias: &str, entry: &Entry) -> Result<()> {
        let encoded = SecretBytes::new(entry.encode());
        self.backend.store(alias, encoded.as_bytes())
    }
}

impl<B: EntryBackend> KeyStore for SoftwareKeyStore<B> {
    fn generate_secret_key(
        &self,
        alias: &str,
        options: KeyOptions,
    ) -> Result<Box<dyn SecretKeyHandle>> {
        note_unsupported(alias, options);
        let key = encryption::generate_key();
        let entry = Entry {
            kind: KIND_SECRET_KEY,
            options,
            material: SecretBytes::from_slice(key.as_slice()),
        };
        self.save(alias, &entry)?;
        tracing::debug!(alias, "generated secret key");
        Ok(Box::new(SoftwareSecretKey {
            alias: alias.to_string(),
            key: entry.material,
        }))
    }

    fn secret_key(&self, alias: &str) -> Result<Box<dyn SecretKeyHandle>> {
        let entry = self.load(alias)?;
        if entry.kind != KIND_SECRET_KEY {
            return Err(VaultLockError::KeyStore(format!(
                "alias '{alias}' does not hold a secret key"
            )));
        }
        Ok(Box::new(SoftwareSecretKey {
            alias: alias.to_string(),
            key: entry.material,
        }))
    }

    fn generate_key_pair(
        &self,
        alias: &str,
        options: KeyOptions,
    ) -> Result<Box<dyn KeyPairHandle>> {
        note_unsupported(alias, options);
        let pair = KeyPair::generate();
        let entry = Entry {
            kind: KIND_KEY_PAIR,
            options,
            material: pair.private_key,
        };
        self.save(alias, &entry)?;
        tracing::debug!(
            alias,
            user_presence = options.require_user_presence,
            "generated key pair"
        );
        Ok(Box::new(SoftwareKeyPair {
            alias: alias.to_string(),
            public_key: pair.public_key,
            entry,
        }))
    }

    fn key_pair(&self, alias: &str) -> Result<Box<dyn KeyPairHandle>> {
        let entry = self.load(alias)?;
        if entry.kind != KIND_KEY_PAIR {
            return Err(VaultLockError::KeyStore(format!(
                "alias '{alias}' does not hold a key pair"
            )));
        }
        let public_key = asymmetric::public_key_of(entry.material.as_bytes())?;
        Ok(Box::new(SoftwareKeyPair {
            alias: alias.to_string(),
            public_key,
            entry,
        }))
    }

    fn delete_entry(&self, alias: &str) -> Result<()> {
        self.backend.delete(alias)
    }

    fn contains_alias(&self, alias: &str) -> Result<bool> {
        Ok(self.backend.load(alias)?.is_some())
    }
}

/// Software keys cannot honour a secure-element request.
fn note_unsupported(alias: &str, options: KeyOptions) {
    if options.strong_box {
        tracing::debug!(alias, "strong box requested; using a software key instead");
    }
}

// ---------------------------------------------------------------------------
// Entry record
// ---------------------------------------------------------------------------

struct Entry {
    kind: u8,
    options: KeyOptions,
    material: SecretBytes,
}

impl Entry {
    fn encode(&self) -> Vec<u8> {
        let mut flags = 0;
        if self.options.strong_box {
            flags |= FLAG_STRONG_BOX;
        }
        if self.options.require_user_presence {
            flags |= FLAG_USER_PRESENCE;
        }
        Encoder::with_prefix(&[ENTRY_VERSION, self.kind, flags])
            .value(self.material.as_bytes())
            .finish()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(bytes);
        if !decoder.check_value_equals(&[ENTRY_VERSION])? {
            return Err(VaultLockError::KeyStore(
                "unsupported key entry version".into(),
            ));
        }
        let header = decoder.read_value(2)?;
        let (kind, flags) = (header[0], header[1]);
        let material = decoder.read_final();

        let expected_len = match kind {
            KIND_SECRET_KEY => KEY_LEN,
            KIND_KEY_PAIR => asymmetric::PRIVATE_KEY_LEN,
            other => {
                return Err(VaultLockError::KeyStore(format!(
                    "unknown key entry kind {other}"
                )))
            }
        };
        if material.len() != expected_len {
            return Err(VaultLockError::KeyStore(format!(
                "key entry holds {} bytes, expected {expected_len}",
                material.len()
            )));
        }

        Ok(Self {
            kind,
            options: KeyOptions {
                strong_box: flags & FLAG_STRONG_BOX != 0,
                require_user_presence: flags & FLAG_USER_PRESENCE != 0,
            },
            material: SecretBytes::from_slice(material),
        })
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

struct SoftwareSecretKey {
    alias: String,
    key: SecretBytes,
}

impl SecretKeyHandle for SoftwareSecretKey {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        encryption::encrypt(self.key.as_bytes(), plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        encryption::decrypt(self.key.as_bytes(), ciphertext)
    }
}

struct SoftwareKeyPair {
    alias: String,
    public_key: [u8; PUBLIC_KEY_LEN],
    entry: Entry,
}

impl KeyPairHandle for SoftwareKeyPair {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.public_key
    }

    fn decrypt_cipher(&self) -> Result<CipherHandle> {
        Ok(Box::new(SoftwareDecryptCipher {
            private_key: self.entry.material.clone(),
            requires_user_presence: self.entry.options.require_user_presence,
            authorized: false,
        }))
    }
}

struct SoftwareDecryptCipher {
    private_key: SecretBytes,
    requires_user_presence: bool,
    authorized: bool,
}

impl DecryptCipher for SoftwareDecryptCipher {
    fn requires_user_presence(&self) -> bool {
        self.requires_user_presence
    }

    fn authorize(&mut self) {
        self.authorized = true;
    }

    fn do_final(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if self.requires_user_presence && !self.authorized {
            return Err(VaultLockError::UserPresenceRequired);
        }
        asymmetric::decrypt(self.private_key.as_bytes(), ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::MemoryKeyStore;

    #[test]
    fn secret_key_survives_reload() {
        let store = MemoryKeyStore::new();
        let generated = store
            .generate_secret_key("simple", KeyOptions::default())
            .unwrap();
        let ciphertext = generated.encrypt(b"payload").unwrap();

        let reloaded = store.secret_key("simple").unwrap();
        assert_eq!(reloaded.decrypt(&ciphertext).unwrap(), b"payload");
    }

    #[test]
    fn presence_gated_cipher_needs_authorization() {
        let store = MemoryKeyStore::new();
        let options = KeyOptions {
            require_user_presence: true,
            ..KeyOptions::default()
        };
        let pair = store.generate_key_pair("bio", options).unwrap();
        let sealed = asymmetric::encrypt(&pair.public_key(), b"key").unwrap();

        let mut cipher = store.key_pair("bio").unwrap().decrypt_cipher().unwrap();
        assert!(cipher.requires_user_presence());
        assert!(matches!(
            cipher.do_final(&sealed),
            Err(VaultLockError::UserPresenceRequired)
        ));

        cipher.authorize();
        assert_eq!(cipher.do_final(&sealed).unwrap(), b"key");
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let store = MemoryKeyStore::new();
        store
            .generate_secret_key("alias", KeyOptions::default())
            .unwrap();
        assert!(store.key_pair("alias").is_err());
    }

    #[test]
    fn missing_alias_is_key_not_found() {
        let store = MemoryKeyStore::new();
        assert!(matches!(
            store.secret_key("nope"),
            Err(VaultLockError::KeyNotFound(_))
        ));
    }

    #[test]
    fn delete_entry_is_idempotent() {
        let store = MemoryKeyStore::new();
        store
            .generate_secret_key("alias", KeyOptions::default())
            .unwrap();
        store.delete_entry("alias").unwrap();
        store.delete_entry("alias").unwrap();
        assert!(!store.contains_alias("alias").unwrap());
    }
}
