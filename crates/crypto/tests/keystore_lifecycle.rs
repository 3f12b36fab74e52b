//! Integration tests for the keystore directory manager
//!
//! These tests exercise the complete catalog workflow: scanning a directory
//! with clutter, creating keys, the lock/unlock cycle, verified deletion,
//! and passphrase rotation.

use std::fs;
use std::sync::Arc;

use palisade_crypto::{
    encode, CipherKind, KdfConfig, Key, KeySelector, Keystore, KeystoreError,
};
use palisade_types::Namespace;
use tempfile::TempDir;

fn light_kdf() -> KdfConfig {
    KdfConfig::Scrypt { n: 4096, r: 8, p: 1 }
}

fn open_store(root: &std::path::Path) -> Keystore {
    Keystore::open_with_config(root, light_kdf(), CipherKind::Aes128Ctr).expect("open keystore")
}

/// A directory with three well-formed keyfiles and one arbitrary non-JSON
/// file catalogs exactly three entries, without any passphrase and without a
/// fatal error.
#[test]
fn test_open_skips_clutter() {
    let dir = TempDir::new().expect("tempdir");

    for i in 0..3 {
        let key = Key::generate(Namespace::Account, &mut rand::thread_rng());
        let bytes = encode(
            &key,
            "scan-passphrase",
            Some(&format!("key-{}", i)),
            &light_kdf(),
            CipherKind::Aes128Ctr,
        )
        .expect("encode");
        fs::write(dir.path().join(format!("{}.json", key.address())), bytes).expect("write");
    }
    fs::write(dir.path().join("README.txt"), b"not a keyfile").expect("write clutter");

    let store = open_store(dir.path());
    assert_eq!(store.len(), 3);

    // Every open starts fully locked.
    for record in store.records() {
        assert!(!record.unlocked);
    }
}

/// The concrete scenario: create a validator key, lock it, unlock it with
/// the right and wrong passphrases.
#[test]
fn test_correct_horse_scenario() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(dir.path());

    let info = store
        .create("correct horse", Some("validator-1"), Namespace::Validator)
        .expect("create");
    let addr = info.address;

    // The keyfile landed at <root>/<address>.json.
    let expected_path = dir.path().join(format!("{}.json", addr));
    assert!(expected_path.is_file());

    // A fresh entry starts unlocked.
    assert!(store.is_unlocked(addr).expect("is_unlocked"));

    store.lock(addr).expect("lock");
    assert!(!store.is_unlocked(addr).expect("is_unlocked"));

    // Wrong passphrase: authentication failure, entry stays locked.
    let err = store.unlock(addr, "wrong").expect_err("wrong passphrase");
    assert!(err.is_authentication_failure());
    assert!(!store.is_unlocked(addr).expect("is_unlocked"));

    // Correct passphrase recovers a key with the same address.
    store.unlock(addr, "correct horse").expect("unlock");
    let recovered = store
        .with_key(addr, |key| key.address())
        .expect("with_key");
    assert_eq!(recovered, addr);
}

/// After locking, the key is unrecoverable from the catalog without the
/// passphrase.
#[test]
fn test_lock_forgets_key() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(dir.path());

    let info = store
        .create("pass", None, Namespace::Account)
        .expect("create");

    store.lock(info.address).expect("lock");
    assert!(matches!(
        store.with_key(info.address, |_| ()),
        Err(KeystoreError::Locked(_))
    ));
}

/// Reopening a keystore rebuilds the catalog from disk, fully locked, with
/// labels intact.
#[test]
fn test_reopen_preserves_catalog() {
    let dir = TempDir::new().expect("tempdir");
    let (addr, label) = {
        let store = open_store(dir.path());
        let info = store
            .create("pass", Some("cold-storage"), Namespace::Account)
            .expect("create");
        (info.address, info.label)
    };

    let reopened = open_store(dir.path());
    let records = reopened.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, addr);
    assert_eq!(records[0].label, label);
    assert!(!records[0].unlocked);
}

/// Delete requires the passphrase: a wrong one removes nothing, the right
/// one removes both the file and the entry.
#[test]
fn test_delete_verifies_passphrase() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(dir.path());

    let info = store
        .create("delete-me", None, Namespace::Account)
        .expect("create");
    let path = info.path.clone();

    let err = store
        .delete(info.address, "not-the-passphrase")
        .expect_err("wrong passphrase");
    assert!(err.is_authentication_failure());
    assert!(path.is_file());
    assert_eq!(store.len(), 1);

    store.delete(info.address, "delete-me").expect("delete");
    assert!(!path.exists());
    assert!(store.is_empty());
    assert!(matches!(
        store.is_unlocked(info.address),
        Err(KeystoreError::NotFound(_))
    ));
}

/// Update rotates the passphrase and label with fresh salt and IV; the old
/// passphrase stops working.
#[test]
fn test_update_rotates_passphrase() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(dir.path());

    let info = store
        .create("old-passphrase", Some("old-label"), Namespace::Validator)
        .expect("create");
    let before = fs::read(&info.path).expect("read");

    let err = store
        .update(info.address, "bogus", "new-passphrase", Some("new-label"))
        .expect_err("wrong old passphrase");
    assert!(err.is_authentication_failure());

    store
        .update(info.address, "old-passphrase", "new-passphrase", Some("new-label"))
        .expect("update");

    let after = fs::read(&info.path).expect("read");
    assert_ne!(before, after);

    let records = store.records();
    assert_eq!(records[0].label.as_deref(), Some("new-label"));
    assert_eq!(records[0].address, info.address);

    // Only the new passphrase unlocks after a restart.
    let reopened = open_store(dir.path());
    assert!(reopened
        .unlock(info.address, "old-passphrase")
        .expect_err("old passphrase")
        .is_authentication_failure());
    reopened
        .unlock(info.address, "new-passphrase")
        .expect("unlock with new passphrase");
}

/// Creating a key and selecting it by index work the same as by address.
#[test]
fn test_index_selector() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(dir.path());

    store.create("a", None, Namespace::Account).expect("create");
    store.create("b", None, Namespace::Account).expect("create");

    store.lock(KeySelector::Index(1)).expect("lock");
    assert!(store.is_unlocked(0).expect("index 0"));
    assert!(!store.is_unlocked(1).expect("index 1"));
}

/// Unlocking two different entries from two threads is safe; the KDF work
/// does not serialize catalog access.
#[test]
fn test_concurrent_unlock() {
    let dir = TempDir::new().expect("tempdir");
    let store = open_store(dir.path());

    let a = store.create("pass-a", None, Namespace::Account).expect("create");
    let b = store.create("pass-b", None, Namespace::Validator).expect("create");
    store.lock(a.address).expect("lock");
    store.lock(b.address).expect("lock");

    let store = Arc::new(store);
    let s1 = Arc::clone(&store);
    let s2 = Arc::clone(&store);
    let addr_a = a.address;
    let addr_b = b.address;

    let t1 = std::thread::spawn(move || s1.unlock(addr_a, "pass-a"));
    let t2 = std::thread::spawn(move || s2.unlock(addr_b, "pass-b"));
    t1.join().expect("join").expect("unlock a");
    t2.join().expect("join").expect("unlock b");

    assert!(store.is_unlocked(addr_a).expect("a"));
    assert!(store.is_unlocked(addr_b).expect("b"));
}

/// A keystore configured for PBKDF2 writes files scrypt-free readers of the
/// stored parameters can still decode: decryption follows the file, not the
/// current configuration.
#[test]
fn test_decode_follows_stored_parameters() {
    let dir = TempDir::new().expect("tempdir");

    let addr = {
        let pbkdf2_store = Keystore::open_with_config(
            dir.path(),
            KdfConfig::Pbkdf2 { c: 1000 },
            CipherKind::Aes128Ctr,
        )
        .expect("open");
        pbkdf2_store
            .create("pass", None, Namespace::Account)
            .expect("create")
            .address
    };

    // Reopen configured for scrypt; the pbkdf2 file still unlocks.
    let scrypt_store = open_store(dir.path());
    scrypt_store.unlock(addr, "pass").expect("unlock");
}
