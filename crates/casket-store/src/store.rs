use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use casket_object::{Commit, ContentAddress, Tree};
use casket_types::ObjectHash;

use crate::codec::{self, DEFAULT_MAX_STRING_LEN};
use crate::error::{StoreError, StoreResult};
use crate::slot::{SlotDir, WriteSlot};

/// Subdirectory of the store root that holds object slots.
const OBJECTS_SUBDIR: &str = "objects";

/// Configuration for opening an object store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store root; objects live under `<root>/objects`.
    pub root: PathBuf,
    /// Ceiling for length-prefixed strings on decode.
    pub max_string_len: u32,
}

impl StoreConfig {
    /// Configuration with the default 1 MiB string ceiling.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

/// Content-addressed object store over hash-keyed slots.
///
/// Each object occupies exactly one slot named by its content hash. Writes
/// are all-or-nothing: any failure between slot open and close deletes the
/// slot before the error propagates, so a partially written object is never
/// observable under its final hash. Objects are immutable once written and
/// safely shared by any number of concurrent readers.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    slots: SlotDir,
    max_string_len: u32,
}

impl ObjectStore {
    /// Open (or create) a store with the given configuration.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let objects_dir = config.root.join(OBJECTS_SUBDIR);
        std::fs::create_dir_all(&objects_dir)?;
        Ok(Self {
            slots: SlotDir::new(objects_dir),
            max_string_len: config.max_string_len,
        })
    }

    /// Open a store at `root` with default configuration.
    pub fn at_path(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open(StoreConfig::new(root))
    }

    /// The directory object slots live under.
    pub fn objects_dir(&self) -> &Path {
        self.slots.objects_dir()
    }

    /// The on-disk path of the slot for `hash`.
    pub fn object_path(&self, hash: &ObjectHash) -> PathBuf {
        self.slots.slot_path(hash)
    }

    /// Whether an object exists under `hash`.
    pub fn exists(&self, hash: &ObjectHash) -> bool {
        self.slots.exists(hash)
    }

    /// Delete the object under `hash`. Returns whether it existed.
    ///
    /// Deleting a referenced object corrupts the store; this exists for
    /// rollback and external cleanup only.
    pub fn delete(&self, hash: &ObjectHash) -> StoreResult<bool> {
        let existed = self.slots.delete(hash)?;
        debug!(hash = %hash.short_hex(), existed, "deleted object");
        Ok(existed)
    }

    // -----------------------------------------------------------------------
    // Write protocol
    // -----------------------------------------------------------------------

    /// Run `encode` against an exclusively locked write slot for `hash`,
    /// guaranteeing the delete-on-failure contract on every exit path.
    ///
    /// Already-present objects are skipped: content addressing guarantees
    /// the slot holds identical bytes, and skipping also means a later
    /// failed write can never roll back a previously valid object.
    fn write_object<F>(&self, hash: ObjectHash, encode: F) -> StoreResult<()>
    where
        F: FnOnce(&mut WriteSlot) -> StoreResult<()>,
    {
        if self.slots.exists(&hash) {
            debug!(hash = %hash.short_hex(), "object already present; skipping write");
            return Ok(());
        }

        let mut slot = self.slots.open_for_writing(&hash)?;
        let outcome = match encode(&mut slot) {
            Ok(()) => slot.commit().map_err(StoreError::Io),
            Err(e) => {
                // Close (and unlock) before deleting the partial slot.
                drop(slot);
                Err(e)
            }
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(source) => {
                warn!(
                    hash = %hash.short_hex(),
                    error = %source,
                    "object write failed; rolling back partial slot"
                );
                match self.slots.delete(&hash) {
                    Ok(_) => Err(source),
                    Err(cleanup) => Err(StoreError::RollbackFailed {
                        hash,
                        source: Box::new(source),
                        cleanup,
                    }),
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Trees
    // -----------------------------------------------------------------------

    /// Persist a tree under its canonical content hash.
    pub fn save_tree(&self, tree: &Tree) -> StoreResult<ObjectHash> {
        let hash = tree.content_hash();
        self.write_object(hash, |slot| codec::encode_tree(slot, tree))?;
        debug!(hash = %hash.short_hex(), records = tree.len(), "saved tree");
        Ok(hash)
    }

    /// Load the tree stored under `hash`.
    pub fn load_tree(&self, hash: &ObjectHash) -> StoreResult<Tree> {
        let mut slot = self.slots.open_for_reading(hash)?;
        let tree = codec::decode_tree(&mut slot, self.max_string_len)?;
        debug!(hash = %hash.short_hex(), records = tree.len(), "loaded tree");
        Ok(tree)
    }

    // -----------------------------------------------------------------------
    // Commits
    // -----------------------------------------------------------------------

    /// Persist a commit under its canonical content hash.
    pub fn save_commit(&self, commit: &Commit) -> StoreResult<ObjectHash> {
        let hash = commit.content_hash();
        self.write_object(hash, |slot| codec::encode_commit(slot, commit))?;
        debug!(
            hash = %hash.short_hex(),
            parents = commit.parents.len(),
            "saved commit"
        );
        Ok(hash)
    }

    /// Load the commit stored under `hash`.
    pub fn load_commit(&self, hash: &ObjectHash) -> StoreResult<Commit> {
        let mut slot = self.slots.open_for_reading(hash)?;
        let commit = codec::decode_commit(&mut slot, self.max_string_len)?;
        debug!(
            hash = %hash.short_hex(),
            parents = commit.parents.len(),
            "loaded commit"
        );
        Ok(commit)
    }

    // -----------------------------------------------------------------------
    // Blob content
    // -----------------------------------------------------------------------

    /// Store raw bytes under their content digest. Returns the digest,
    /// which is the hash of the resulting blob handle.
    pub fn save_bytes(&self, data: &[u8]) -> StoreResult<ObjectHash> {
        let hash = ObjectHash::from_bytes(data);
        self.write_object(hash, |slot| {
            slot.write_all(data)?;
            Ok(())
        })?;
        debug!(hash = %hash.short_hex(), bytes = data.len(), "saved blob content");
        Ok(hash)
    }

    /// Digest a file and copy its raw bytes into the slot for that digest.
    pub fn save_file_content(&self, path: &Path) -> StoreResult<ObjectHash> {
        let hash = ObjectHash::from_file(path)?;
        self.write_object(hash, |slot| {
            let mut src = File::open(path)?;
            io::copy(&mut src, slot)?;
            Ok(())
        })?;
        debug!(hash = %hash.short_hex(), path = %path.display(), "saved file content");
        Ok(hash)
    }

    /// Read raw blob content back out under a shared lock.
    pub fn read_blob(&self, hash: &ObjectHash) -> StoreResult<Vec<u8>> {
        let mut slot = self.slots.open_for_reading(hash)?;
        let mut data = Vec::new();
        slot.read_to_end(&mut data)?;
        debug!(hash = %hash.short_hex(), bytes = data.len(), "read blob content");
        Ok(data)
    }
}
