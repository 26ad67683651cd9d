use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use casket_types::ObjectHash;

use crate::error::ObjectError;

/// The kind of object a tree record points at.
///
/// The numeric codes are part of the wire format and must never be
/// renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// A sub-tree (directory).
    Tree,
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// A commit reference (submodule-style snapshot pin).
    Commit,
}

impl RecordKind {
    /// Wire code for this kind.
    pub fn code(&self) -> u8 {
        match self {
            Self::Tree => 0,
            Self::Blob => 1,
            Self::Commit => 2,
        }
    }

    /// Parse a wire code back into a kind.
    pub fn from_code(code: u8) -> Result<Self, ObjectError> {
        match code {
            0 => Ok(Self::Tree),
            1 => Ok(Self::Blob),
            2 => Ok(Self::Commit),
            other => Err(ObjectError::UnknownRecordKind(other)),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Blob => write!(f, "blob"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Handle to raw content already reduced to a digest.
///
/// The digest is computed by the byte-storage layer over the blob's raw
/// bytes; a `Blob` carries no payload of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Content digest of the referenced bytes.
    pub hash: ObjectHash,
}

impl Blob {
    /// Create a blob handle from an existing content digest.
    pub fn new(hash: ObjectHash) -> Self {
        Self { hash }
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A single named entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRecord {
    /// Kind of object this record references.
    pub kind: RecordKind,
    /// Content digest of the referenced object.
    pub hash: ObjectHash,
    /// Entry name, unique within its owning tree.
    pub name: String,
}

impl TreeRecord {
    /// Create a new record. The name must be non-empty.
    pub fn new(
        kind: RecordKind,
        hash: ObjectHash,
        name: impl Into<String>,
    ) -> Result<Self, ObjectError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ObjectError::EmptyRecordName);
        }
        Ok(Self { kind, hash, name })
    }
}

/// Directory listing object: an immutable mapping from entry name to
/// [`TreeRecord`].
///
/// The map is keyed by name, so uniqueness is enforced by construction and
/// iteration is always in ascending name order — the same order canonical
/// hashing uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    records: BTreeMap<String, TreeRecord>,
}

impl Tree {
    /// Build a tree from a name-keyed map, validating that every key
    /// matches its record's name.
    pub fn new(records: BTreeMap<String, TreeRecord>) -> Result<Self, ObjectError> {
        for (key, record) in &records {
            if record.name.is_empty() {
                return Err(ObjectError::EmptyRecordName);
            }
            if *key != record.name {
                return Err(ObjectError::KeyNameMismatch {
                    key: key.clone(),
                    name: record.name.clone(),
                });
            }
        }
        Ok(Self { records })
    }

    /// Build a tree from a sequence of records, rejecting duplicate names.
    pub fn from_records(records: Vec<TreeRecord>) -> Result<Self, ObjectError> {
        let mut map = BTreeMap::new();
        for record in records {
            if record.name.is_empty() {
                return Err(ObjectError::EmptyRecordName);
            }
            let name = record.name.clone();
            if map.insert(name.clone(), record).is_some() {
                return Err(ObjectError::DuplicateRecordName(name));
            }
        }
        Ok(Self { records: map })
    }

    /// The empty tree.
    pub fn empty() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Option<&TreeRecord> {
        self.records.get(name)
    }

    /// Iterate records in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeRecord> {
        self.records.values()
    }

    /// The underlying name → record mapping.
    pub fn records(&self) -> &BTreeMap<String, TreeRecord> {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the tree has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A point-in-time snapshot reference.
///
/// Parents are ordered: `parents[0]` is the primary ancestry line when
/// present. Zero parents marks a root commit, one a regular commit, two or
/// more a merge. The order is preserved exactly through hashing and
/// serialization — commits are distinguished by full ancestry, not just
/// tree content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Digest of the root tree this commit snapshots.
    pub tree_hash: ObjectHash,
    /// Free-text author.
    pub author: String,
    /// Free-text commit message.
    pub message: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    /// Ordered parent commit digests.
    pub parents: Vec<ObjectHash>,
}

impl Commit {
    /// Create a commit with an explicit parent list.
    pub fn new(
        tree_hash: ObjectHash,
        author: impl Into<String>,
        message: impl Into<String>,
        timestamp: u64,
        parents: Vec<ObjectHash>,
    ) -> Self {
        Self {
            tree_hash,
            author: author.into(),
            message: message.into(),
            timestamp,
            parents,
        }
    }

    /// Convenience constructor for a root commit (no parents).
    pub fn root(
        tree_hash: ObjectHash,
        author: impl Into<String>,
        message: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self::new(tree_hash, author, message, timestamp, Vec::new())
    }

    /// Convenience constructor for a regular commit (single parent).
    pub fn with_parent(
        tree_hash: ObjectHash,
        parent: ObjectHash,
        author: impl Into<String>,
        message: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self::new(tree_hash, author, message, timestamp, vec![parent])
    }

    /// Convenience constructor for a merge commit (two or more parents).
    pub fn merge(
        tree_hash: ObjectHash,
        parents: Vec<ObjectHash>,
        author: impl Into<String>,
        message: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self::new(tree_hash, author, message, timestamp, parents)
    }

    /// Returns `true` if this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns `true` if this commit has two or more parents.
    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }

    /// The primary (HEAD-line) parent, if any.
    pub fn primary_parent(&self) -> Option<&ObjectHash> {
        self.parents.first()
    }
}
