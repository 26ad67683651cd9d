//! Canonical hashing rules, one per object kind.
//!
//! The content-addressing guarantee: structural equality of a value implies
//! hash equality, and hash equality is treated as proof of structural
//! equality. To keep that true the concatenation order for trees is a
//! deterministic function of the record set alone — records are hashed in
//! ascending name order, never in whatever order a container happens to
//! iterate.

use casket_types::ObjectHash;

use crate::object::{Blob, Commit, Tree};

/// Maps an object value to its stable content digest.
pub trait ContentAddress {
    /// Compute the canonical content hash of this value.
    fn content_hash(&self) -> ObjectHash;
}

impl ContentAddress for Blob {
    /// Identity: the digest was already computed over the blob's raw bytes
    /// by the byte-storage layer.
    fn content_hash(&self) -> ObjectHash {
        self.hash
    }
}

impl ContentAddress for Tree {
    /// Digest of `name || kind_code || hash` for every record, in name
    /// order.
    fn content_hash(&self) -> ObjectHash {
        let mut acc = String::new();
        for record in self.iter() {
            acc.push_str(&record.name);
            acc.push_str(&record.kind.code().to_string());
            acc.push_str(&record.hash.to_hex());
        }
        ObjectHash::from_bytes(acc.as_bytes())
    }
}

impl ContentAddress for Commit {
    /// Digest of `tree_hash || author || message || timestamp || parents…`,
    /// parents in stored order. Every field participates: changing any
    /// scalar, any parent, or the parent order changes the hash.
    fn content_hash(&self) -> ObjectHash {
        let mut acc = String::new();
        acc.push_str(&self.tree_hash.to_hex());
        acc.push_str(&self.author);
        acc.push_str(&self.message);
        acc.push_str(&self.timestamp.to_string());
        for parent in &self.parents {
            acc.push_str(&parent.to_hex());
        }
        ObjectHash::from_bytes(acc.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{RecordKind, TreeRecord};

    fn h(data: &[u8]) -> ObjectHash {
        ObjectHash::from_bytes(data)
    }

    fn record(kind: RecordKind, hash: ObjectHash, name: &str) -> TreeRecord {
        TreeRecord::new(kind, hash, name).unwrap()
    }

    // -----------------------------------------------------------------------
    // Determinism
    // -----------------------------------------------------------------------

    #[test]
    fn blob_hash_is_identity() {
        let digest = h(b"raw content");
        let blob = Blob::new(digest);
        assert_eq!(blob.content_hash(), digest);
    }

    #[test]
    fn equal_trees_hash_equal_regardless_of_build_order() {
        let a = record(RecordKind::Blob, h(b"1"), "a.txt");
        let b = record(RecordKind::Tree, h(b"2"), "sub");
        let c = record(RecordKind::Commit, h(b"3"), "link");

        let forward = Tree::from_records(vec![a.clone(), b.clone(), c.clone()]).unwrap();
        let reversed = Tree::from_records(vec![c, b, a]).unwrap();

        assert_eq!(forward, reversed);
        assert_eq!(forward.content_hash(), reversed.content_hash());
    }

    #[test]
    fn tree_hash_is_stable_across_calls() {
        let tree = Tree::from_records(vec![record(RecordKind::Blob, h(b"x"), "file")]).unwrap();
        assert_eq!(tree.content_hash(), tree.content_hash());
    }

    #[test]
    fn different_record_sets_hash_differently() {
        let one = Tree::from_records(vec![record(RecordKind::Blob, h(b"1"), "a")]).unwrap();
        let two = Tree::from_records(vec![record(RecordKind::Blob, h(b"2"), "a")]).unwrap();
        let renamed = Tree::from_records(vec![record(RecordKind::Blob, h(b"1"), "b")]).unwrap();
        let retyped = Tree::from_records(vec![record(RecordKind::Tree, h(b"1"), "a")]).unwrap();

        assert_ne!(one.content_hash(), two.content_hash());
        assert_ne!(one.content_hash(), renamed.content_hash());
        assert_ne!(one.content_hash(), retyped.content_hash());
    }

    #[test]
    fn empty_tree_hashes() {
        // The empty record set is still a valid, stable content address.
        assert_eq!(Tree::empty().content_hash(), Tree::empty().content_hash());
    }

    // -----------------------------------------------------------------------
    // Commit sensitivity
    // -----------------------------------------------------------------------

    #[test]
    fn commit_hash_changes_with_every_field() {
        let base = Commit::new(h(b"t"), "alice", "msg", 1000, vec![h(b"p1")]);
        let base_hash = base.content_hash();

        let tree_changed = Commit::new(h(b"t2"), "alice", "msg", 1000, vec![h(b"p1")]);
        let author_changed = Commit::new(h(b"t"), "bob", "msg", 1000, vec![h(b"p1")]);
        let message_changed = Commit::new(h(b"t"), "alice", "other", 1000, vec![h(b"p1")]);
        let time_changed = Commit::new(h(b"t"), "alice", "msg", 1001, vec![h(b"p1")]);
        let parent_changed = Commit::new(h(b"t"), "alice", "msg", 1000, vec![h(b"p2")]);

        assert_ne!(base_hash, tree_changed.content_hash());
        assert_ne!(base_hash, author_changed.content_hash());
        assert_ne!(base_hash, message_changed.content_hash());
        assert_ne!(base_hash, time_changed.content_hash());
        assert_ne!(base_hash, parent_changed.content_hash());
    }

    #[test]
    fn commit_hash_sensitive_to_parent_order() {
        let p1 = h(b"c1");
        let p2 = h(b"c2");
        let forward = Commit::merge(h(b"t"), vec![p1, p2], "bob", "merge", 2000);
        let reversed = Commit::merge(h(b"t"), vec![p2, p1], "bob", "merge", 2000);
        assert_ne!(forward.content_hash(), reversed.content_hash());
    }

    #[test]
    fn commit_hash_sensitive_to_parent_count() {
        let root = Commit::root(h(b"t"), "a", "m", 1);
        let regular = Commit::with_parent(h(b"t"), h(b"p"), "a", "m", 1);
        let merge = Commit::merge(h(b"t"), vec![h(b"p"), h(b"q")], "a", "m", 1);

        assert_ne!(root.content_hash(), regular.content_hash());
        assert_ne!(regular.content_hash(), merge.content_hash());
        assert_ne!(root.content_hash(), merge.content_hash());
    }

    #[test]
    fn equal_commits_hash_equal() {
        let a = Commit::merge(h(b"t"), vec![h(b"c1"), h(b"c2")], "bob", "merge", 2000);
        let b = Commit::merge(h(b"t"), vec![h(b"c1"), h(b"c2")], "bob", "merge", 2000);
        assert_eq!(a.content_hash(), b.content_hash());
    }
}
