//! Integration tests for the VaultLock vault module.

use vaultlock::crypto::SecretBytes;
use vaultlock::errors::VaultLockError;
use vaultlock::keystore::MemoryKeyStore;
use vaultlock::lock::SimpleLock;
use vaultlock::vault::{EncryptedValue, Vault};

// ---------------------------------------------------------------------------
// Encrypt with the public half, decrypt with the open vault
// ---------------------------------------------------------------------------

#[test]
fn sealed_vault_encrypts_and_open_vault_decrypts() {
    let open = Vault::create().expect("create vault");
    let sealed = open.vault().clone();

    let encrypted = sealed.encrypt(b"postgres://localhost/db", None).unwrap();
    assert_eq!(open.decrypt(&encrypted).unwrap(), b"postgres://localhost/db");
}

#[test]
fn closed_vault_cannot_decrypt() {
    let mut open = Vault::create().unwrap();
    let encrypted = open.vault().encrypt(b"value", None).unwrap();

    open.close();
    assert!(open.is_closed());
    assert!(matches!(
        open.decrypt(&encrypted),
        Err(VaultLockError::Vault { .. })
    ));
}

#[test]
fn value_from_another_vault_does_not_decrypt() {
    let first = Vault::create().unwrap();
    let second = Vault::create().unwrap();
    let encrypted = first.vault().encrypt(b"value", None).unwrap();
    assert!(second.decrypt(&encrypted).is_err());
}

#[test]
fn encrypted_value_survives_byte_copy() {
    let open = Vault::create().unwrap();
    let encrypted = open.vault().encrypt(b"value", None).unwrap();

    let copied = EncryptedValue::new(encrypted.as_bytes().to_vec());
    assert_eq!(copied, encrypted);
    assert_eq!(copied.method().unwrap(), None);
    assert_eq!(open.decrypt(&copied).unwrap(), b"value");
}

// ---------------------------------------------------------------------------
// Reopening through a lock
// ---------------------------------------------------------------------------

#[test]
fn vault_reopens_through_a_lock() {
    let keys = MemoryKeyStore::new();
    let lock = SimpleLock::new(&keys);

    let mut token = None;
    let vault = Vault::create_with(|open| {
        token = Some(open.register_lock(|private_key| lock.lock("vault-test", private_key))?);
        Ok(())
    })
    .unwrap();
    let token = token.unwrap();

    // Only the public half remains after `create_with`.
    let restored = Vault::restore(&vault.encode()).unwrap();
    assert_eq!(restored, vault);

    let encrypted = restored.encrypt(b"after restore", None).unwrap();
    let open = restored.open(|| lock.unlock(&token)).unwrap();
    assert_eq!(open.decrypt(&encrypted).unwrap(), b"after restore");
}

#[test]
fn opening_with_unrelated_key_fails() {
    let vault = Vault::create().unwrap().vault().clone();
    let err = vault
        .open(|| Ok(SecretBytes::new(vec![9u8; 32])))
        .unwrap_err();
    assert!(matches!(err, VaultLockError::Vault { .. }));
}
