//! Keystore directory manager.
//!
//! A keystore is a directory of keyfiles, one per account or validator,
//! named `<address-hex>.json`. Opening the keystore scans the directory into
//! an in-memory catalog using the cleartext envelope fields, so no
//! passphrase is needed until an entry is actually unlocked.
//!
//! Every entry cycles `Locked -> Unlocked -> Locked`; a fresh open starts
//! fully locked, and lock state never persists across processes. Catalog
//! mutations are serialized behind one mutex, while KDF work runs outside it
//! so distinct entries can be unlocked in parallel.

mod error;

pub use error::{KeystoreError, KeystoreResult};

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use palisade_types::{Address, Namespace};

use crate::key::Key;
use crate::keyfile::{self, CipherKind, KdfConfig, KeyFile};

/// A catalog entry: one keyfile under the keystore root.
///
/// The loaded [`Key`] is present only while the entry is unlocked; dropping
/// it zeroizes the seed.
#[derive(Debug)]
pub struct KeyRecord {
    path: PathBuf,
    address: Address,
    label: Option<String>,
    key: Option<Key>,
}

impl KeyRecord {
    fn is_unlocked(&self) -> bool {
        self.key.is_some()
    }
}

/// Public view of a catalog entry, without the key material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    /// Path of the backing keyfile.
    pub path: PathBuf,
    /// Address recorded in the keyfile.
    pub address: Address,
    /// Label recorded in the keyfile, if any.
    pub label: Option<String>,
    /// Whether the entry currently holds a decrypted key.
    pub unlocked: bool,
}

impl From<&KeyRecord> for RecordInfo {
    fn from(record: &KeyRecord) -> Self {
        Self {
            path: record.path.clone(),
            address: record.address,
            label: record.label.clone(),
            unlocked: record.is_unlocked(),
        }
    }
}

/// Identifies a catalog entry by address or by catalog index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySelector {
    /// Select by address.
    Address(Address),
    /// Select by position in the catalog.
    Index(usize),
}

impl From<Address> for KeySelector {
    fn from(address: Address) -> Self {
        KeySelector::Address(address)
    }
}

impl From<usize> for KeySelector {
    fn from(index: usize) -> Self {
        KeySelector::Index(index)
    }
}

impl fmt::Display for KeySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySelector::Address(address) => write!(f, "address {}", address),
            KeySelector::Index(index) => write!(f, "index {}", index),
        }
    }
}

/// A directory of keyfiles with an in-memory catalog.
pub struct Keystore {
    root: PathBuf,
    kdf: KdfConfig,
    cipher: CipherKind,
    records: Mutex<Vec<KeyRecord>>,
}

impl Keystore {
    /// Open a keystore, scanning the directory into a catalog.
    ///
    /// The root is created (mode 0700 on Unix) if it does not exist. Every
    /// regular file is probed with the cataloging decode; files that fail to
    /// parse are skipped, so stray non-keyfile content never aborts the
    /// scan. Catalog order is the scan order: entries sorted by file name.
    /// All entries start locked.
    pub fn open(root: impl AsRef<Path>) -> KeystoreResult<Self> {
        Self::open_with_config(root, KdfConfig::default(), CipherKind::default())
    }

    /// Open with explicit generation-time KDF and cipher choices for keys
    /// created or re-encrypted through this keystore.
    pub fn open_with_config(
        root: impl AsRef<Path>,
        kdf: KdfConfig,
        cipher: CipherKind,
    ) -> KeystoreResult<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&root, fs::Permissions::from_mode(0o700))?;
            }
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));

        let mut records = Vec::new();
        for path in paths {
            // Non-keyfile clutter is expected; skip anything that does not
            // parse as a versioned envelope.
            let Ok(bytes) = fs::read(&path) else { continue };
            let Ok(info) = keyfile::inspect(&bytes) else { continue };

            records.push(KeyRecord {
                path,
                address: info.address,
                label: info.label,
                key: None,
            });
        }

        Ok(Self {
            root,
            kdf,
            cipher,
            records: Mutex::new(records),
        })
    }

    /// The keystore root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot of the catalog, in scan/insertion order.
    pub fn records(&self) -> Vec<RecordInfo> {
        self.catalog().iter().map(RecordInfo::from).collect()
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.catalog().len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.catalog().is_empty()
    }

    /// Generate a fresh key, encrypt it, and persist it under the root.
    ///
    /// The keyfile is written atomically (temp file, then rename), so no
    /// partial file is ever visible at `<root>/<address>.json`. The new
    /// entry is appended to the catalog in the unlocked state, since its
    /// plaintext key was just produced in memory.
    pub fn create(
        &self,
        passphrase: &str,
        label: Option<&str>,
        namespace: Namespace,
    ) -> KeystoreResult<RecordInfo> {
        let key = Key::generate(namespace, &mut rand::thread_rng());
        let keyfile = KeyFile::seal(&key, passphrase, label, &self.kdf, self.cipher)?;
        let bytes = keyfile.to_bytes()?;

        let address = key.address();
        let path = self.keyfile_path(&address);

        let mut records = self.catalog();
        if records.iter().any(|r| r.address == address) {
            return Err(KeystoreError::AlreadyExists(address.to_hex()));
        }

        atomic_write(&path, &bytes)?;

        let record = KeyRecord {
            path,
            address,
            label: label.map(|l| l.to_string()),
            key: Some(key),
        };
        let info = RecordInfo::from(&record);
        records.push(record);

        Ok(info)
    }

    /// Decrypt an entry's keyfile and hold the key in the catalog.
    ///
    /// On authentication failure the entry stays locked and the error is
    /// returned; nothing else is affected. The KDF runs outside the catalog
    /// lock, so unlocking two different entries concurrently is safe and
    /// parallel.
    pub fn unlock(
        &self,
        selector: impl Into<KeySelector>,
        passphrase: &str,
    ) -> KeystoreResult<()> {
        let selector = selector.into();
        let (address, path) = {
            let records = self.catalog();
            let index = resolve(&records, selector)?;
            (records[index].address, records[index].path.clone())
        };

        // Heavy derivation work happens with the catalog unlocked.
        let bytes = fs::read(&path)?;
        let (key, label) = keyfile::decode(&bytes, passphrase)?;

        let mut records = self.catalog();
        let index = resolve(&records, KeySelector::Address(address))?;
        records[index].key = Some(key);
        records[index].label = label;

        Ok(())
    }

    /// Discard an entry's in-memory key. Does not touch disk.
    pub fn lock(&self, selector: impl Into<KeySelector>) -> KeystoreResult<()> {
        let selector = selector.into();
        let mut records = self.catalog();
        let index = resolve(&records, selector)?;
        // Dropping the Key zeroizes the seed.
        records[index].key = None;
        Ok(())
    }

    /// Verify the passphrase against the entry's keyfile, then remove both
    /// the file and the catalog entry.
    ///
    /// The passphrase check is a full decode: a wrong passphrase fails with
    /// an authentication error and removes nothing.
    pub fn delete(
        &self,
        selector: impl Into<KeySelector>,
        passphrase: &str,
    ) -> KeystoreResult<()> {
        let selector = selector.into();
        let (address, path) = {
            let records = self.catalog();
            let index = resolve(&records, selector)?;
            (records[index].address, records[index].path.clone())
        };

        let bytes = fs::read(&path)?;
        keyfile::decode(&bytes, passphrase)?;

        // File and catalog mutate as a unit: the entry is only removed once
        // the file removal succeeded.
        let mut records = self.catalog();
        let index = resolve(&records, KeySelector::Address(address))?;
        fs::remove_file(&records[index].path)?;
        records.remove(index);

        Ok(())
    }

    /// Re-encrypt an entry under a new passphrase and label.
    ///
    /// The old passphrase must decode the file; the replacement is written
    /// with fresh salt and IV and swapped in atomically. The entry keeps its
    /// address, takes the new label, and is left unlocked with the freshly
    /// decoded key.
    pub fn update(
        &self,
        selector: impl Into<KeySelector>,
        old_passphrase: &str,
        new_passphrase: &str,
        new_label: Option<&str>,
    ) -> KeystoreResult<()> {
        let selector = selector.into();
        let (address, path) = {
            let records = self.catalog();
            let index = resolve(&records, selector)?;
            (records[index].address, records[index].path.clone())
        };

        let bytes = fs::read(&path)?;
        let (key, _) = keyfile::decode(&bytes, old_passphrase)?;
        let replacement =
            KeyFile::seal(&key, new_passphrase, new_label, &self.kdf, self.cipher)?.to_bytes()?;

        let mut records = self.catalog();
        let index = resolve(&records, KeySelector::Address(address))?;
        atomic_write(&records[index].path, &replacement)?;
        records[index].label = new_label.map(|l| l.to_string());
        records[index].key = Some(key);

        Ok(())
    }

    /// Run a closure against an unlocked entry's key.
    ///
    /// The key never leaves the catalog; locked entries fail with
    /// [`KeystoreError::Locked`].
    pub fn with_key<T>(
        &self,
        selector: impl Into<KeySelector>,
        f: impl FnOnce(&Key) -> T,
    ) -> KeystoreResult<T> {
        let selector = selector.into();
        let records = self.catalog();
        let index = resolve(&records, selector)?;
        let record = &records[index];
        match &record.key {
            Some(key) => Ok(f(key)),
            None => Err(KeystoreError::Locked(record.address.to_hex())),
        }
    }

    /// Whether the selected entry currently holds a decrypted key.
    pub fn is_unlocked(&self, selector: impl Into<KeySelector>) -> KeystoreResult<bool> {
        let selector = selector.into();
        let records = self.catalog();
        let index = resolve(&records, selector)?;
        Ok(records[index].is_unlocked())
    }

    fn keyfile_path(&self, address: &Address) -> PathBuf {
        self.root.join(format!("{}.json", address.to_hex()))
    }

    fn catalog(&self) -> MutexGuard<'_, Vec<KeyRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Keystore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keystore")
            .field("root", &self.root)
            .field("records", &self.len())
            .finish()
    }
}

fn resolve(records: &[KeyRecord], selector: KeySelector) -> KeystoreResult<usize> {
    match selector {
        KeySelector::Address(address) => records
            .iter()
            .position(|r| r.address == address)
            .ok_or_else(|| KeystoreError::NotFound(selector.to_string())),
        KeySelector::Index(index) => {
            if index < records.len() {
                Ok(index)
            } else {
                Err(KeystoreError::NotFound(selector.to_string()))
            }
        }
    }
}

/// Write `bytes` to `path` via a temp file in the same directory, so a
/// partial file is never visible at the final path.
fn atomic_write(path: &Path, bytes: &[u8]) -> KeystoreResult<()> {
    let tmp = path.with_extension("json.tmp");

    {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}
