//! Binary codec for tree and commit objects.
//!
//! On-disk format, all integers little-endian:
//!
//! Tree:
//! ```text
//! [4 bytes: record count (u32)]
//! per record, in ascending name order:
//!     [1 byte: kind code]
//!     [4 bytes: hash length (u32)] [hash, lowercase hex]
//!     [4 bytes: name length (u32)] [name, UTF-8]
//! ```
//!
//! Commit:
//! ```text
//! [4 bytes: length (u32)] [tree hash, lowercase hex]
//! [4 bytes: length (u32)] [author, UTF-8]
//! [4 bytes: length (u32)] [message, UTF-8]
//! [8 bytes: timestamp (u64)]
//! [4 bytes: parent count (u32)]
//! per parent, in stored order:
//!     [4 bytes: length (u32)] [parent hash, lowercase hex]
//! ```
//!
//! Decoding is strict: every length prefix is checked against a configured
//! ceiling before the body is read, and any short read is fatal. There is
//! no envelope beyond the fields above.

use std::io::{Read, Write};

use casket_object::{Commit, RecordKind, Tree, TreeRecord};
use casket_types::ObjectHash;

use crate::error::{StoreError, StoreResult};

/// Default ceiling for length-prefixed strings: 1 MiB.
///
/// Bounds the memory a corrupt or hostile stream can force-allocate.
pub const DEFAULT_MAX_STRING_LEN: u32 = 1024 * 1024;

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Read exactly `buf.len()` bytes, reporting how many arrived on a short
/// read so truncation surfaces as a typed error rather than a bare EOF.
fn read_exact(r: &mut impl Read, buf: &mut [u8]) -> StoreResult<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(StoreError::Truncated {
                expected: buf.len(),
                actual: filled,
            });
        }
        filled += n;
    }
    Ok(())
}

fn read_u32(r: &mut impl Read) -> StoreResult<u32> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(r: &mut impl Read) -> StoreResult<u64> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u8(r: &mut impl Read) -> StoreResult<u8> {
    let mut buf = [0u8; 1];
    read_exact(r, &mut buf)?;
    Ok(buf[0])
}

/// Read a length-prefixed string: u32 LE length, bounds check, then exactly
/// that many bytes. Nothing past the prefix is read when the bound trips.
fn read_string(r: &mut impl Read, max_len: u32) -> StoreResult<String> {
    let length = read_u32(r)?;
    if length > max_len {
        return Err(StoreError::LengthExceeded {
            length,
            max: max_len,
        });
    }
    let mut buf = vec![0u8; length as usize];
    read_exact(r, &mut buf)?;
    String::from_utf8(buf).map_err(|e| StoreError::Corrupt(format!("non-UTF-8 string: {e}")))
}

fn read_hash(r: &mut impl Read, max_len: u32) -> StoreResult<ObjectHash> {
    let s = read_string(r, max_len)?;
    ObjectHash::from_hex(&s).map_err(|e| StoreError::Corrupt(format!("malformed digest: {e}")))
}

fn write_string(w: &mut impl Write, s: &str) -> StoreResult<()> {
    w.write_all(&(s.len() as u32).to_le_bytes())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn write_hash(w: &mut impl Write, hash: &ObjectHash) -> StoreResult<()> {
    write_string(w, &hash.to_hex())
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

fn write_record(w: &mut impl Write, record: &TreeRecord) -> StoreResult<()> {
    w.write_all(&[record.kind.code()])?;
    write_hash(w, &record.hash)?;
    write_string(w, &record.name)?;
    Ok(())
}

fn read_record(r: &mut impl Read, max_len: u32) -> StoreResult<TreeRecord> {
    let kind = RecordKind::from_code(read_u8(r)?)?;
    let hash = read_hash(r, max_len)?;
    let name = read_string(r, max_len)?;
    Ok(TreeRecord::new(kind, hash, name)?)
}

/// Serialize a tree in the fixed field order.
pub fn encode_tree(w: &mut impl Write, tree: &Tree) -> StoreResult<()> {
    w.write_all(&(tree.len() as u32).to_le_bytes())?;
    for record in tree.iter() {
        write_record(w, record)?;
    }
    Ok(())
}

/// Decode a tree, strictly in the write order.
pub fn decode_tree(r: &mut impl Read, max_len: u32) -> StoreResult<Tree> {
    let count = read_u32(r)?;
    // Cap pre-allocation: a hostile count must not reserve unbounded memory
    // before the body proves it is real.
    let mut records = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        records.push(read_record(r, max_len)?);
    }
    Ok(Tree::from_records(records)?)
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Serialize a commit in the fixed field order.
pub fn encode_commit(w: &mut impl Write, commit: &Commit) -> StoreResult<()> {
    write_hash(w, &commit.tree_hash)?;
    write_string(w, &commit.author)?;
    write_string(w, &commit.message)?;
    w.write_all(&commit.timestamp.to_le_bytes())?;
    w.write_all(&(commit.parents.len() as u32).to_le_bytes())?;
    for parent in &commit.parents {
        write_hash(w, parent)?;
    }
    Ok(())
}

/// Decode a commit, strictly in the write order.
///
/// Reconstruction goes through the constructor matching the parent count,
/// so root/regular/merge commits load through the same paths callers use
/// to build them.
pub fn decode_commit(r: &mut impl Read, max_len: u32) -> StoreResult<Commit> {
    let tree_hash = read_hash(r, max_len)?;
    let author = read_string(r, max_len)?;
    let message = read_string(r, max_len)?;
    let timestamp = read_u64(r)?;

    let parent_count = read_u32(r)?;
    let mut parents = Vec::with_capacity(parent_count.min(1024) as usize);
    for _ in 0..parent_count {
        parents.push(read_hash(r, max_len)?);
    }

    Ok(match parents.len() {
        0 => Commit::root(tree_hash, author, message, timestamp),
        1 => Commit::with_parent(tree_hash, parents[0], author, message, timestamp),
        _ => Commit::merge(tree_hash, parents, author, message, timestamp),
    })
}
