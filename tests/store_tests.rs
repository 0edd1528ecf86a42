//! Integration tests for the data stores, driven through the trait.

use tempfile::TempDir;
use vaultlock::store::{DataStore, FileDataStore, MemoryDataStore};

/// Behaviour every `DataStore` shares.
fn exercise(store: &dyn DataStore) {
    assert_eq!(store.get("alpha").unwrap(), None);
    assert!(!store.contains("alpha").unwrap());

    store.set("alpha", Some(b"one".as_slice())).unwrap();
    store.set("beta", Some(b"".as_slice())).unwrap();
    assert_eq!(store.get("alpha").unwrap().as_deref(), Some(b"one".as_slice()));
    assert_eq!(store.get("beta").unwrap().as_deref(), Some(b"".as_slice()));

    store.set("alpha", Some(b"two".as_slice())).unwrap();
    assert_eq!(store.get("alpha").unwrap().as_deref(), Some(b"two".as_slice()));

    store.remove("alpha").unwrap();
    assert!(!store.contains("alpha").unwrap());
    // Removing twice is fine.
    store.remove("alpha").unwrap();
    assert!(store.contains("beta").unwrap());
}

#[test]
fn memory_store_behaves_like_a_data_store() {
    exercise(&MemoryDataStore::new());
}

#[test]
fn file_store_behaves_like_a_data_store() {
    let dir = TempDir::new().unwrap();
    exercise(&FileDataStore::new(dir.path().join("nested")));
}

#[test]
fn file_store_rejects_path_like_keys() {
    let dir = TempDir::new().unwrap();
    let store = FileDataStore::new(dir.path());
    assert!(store.set("../outside", Some(b"x".as_slice())).is_err());
    assert!(store.get("a/b").is_err());
    assert!(store.get(".hidden").is_err());
}
