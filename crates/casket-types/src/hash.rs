use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length of an [`ObjectHash`] in lowercase hex characters.
pub const HASH_HEX_LEN: usize = 64;

/// Buffer size for streaming file digests.
const FILE_CHUNK: usize = 64 * 1024;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectHash` is the BLAKE3 digest of an object's content, presented
/// as a fixed-width lowercase hex string. Identical content always produces
/// the same `ObjectHash`, making objects deduplicatable and verifiable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHash([u8; 32]);

impl ObjectHash {
    /// Digest raw bytes into an `ObjectHash`.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Digest a file's content, streamed in fixed-size chunks.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut hasher = blake3::Hasher::new();
        let mut buf = [0u8; FILE_CHUNK];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self(*hasher.finalize().as_bytes()))
    }

    /// Create an `ObjectHash` from a pre-computed digest.
    pub const fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation (64 lowercase hex chars).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != HASH_HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: HASH_HEX_LEN,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes);
        Ok(Self(digest))
    }
}

impl fmt::Debug for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHash({})", self.short_hex())
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for ObjectHash {
    fn from(digest: [u8; 32]) -> Self {
        Self(digest)
    }
}

impl From<ObjectHash> for [u8; 32] {
    fn from(hash: ObjectHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_bytes_is_deterministic() {
        let data = b"hello world";
        let h1 = ObjectHash::from_bytes(data);
        let h2 = ObjectHash::from_bytes(data);
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_data_produces_different_hashes() {
        let h1 = ObjectHash::from_bytes(b"hello");
        let h2 = ObjectHash::from_bytes(b"world");
        assert_ne!(h1, h2);
    }

    #[test]
    fn hex_roundtrip() {
        let hash = ObjectHash::from_bytes(b"test");
        let hex = hash.to_hex();
        assert_eq!(hex.len(), HASH_HEX_LEN);
        let parsed = ObjectHash::from_hex(&hex).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = ObjectHash::from_hex("abc123").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: HASH_HEX_LEN,
                actual: 6
            }
        );
    }

    #[test]
    fn from_hex_rejects_bad_charset() {
        let bogus = "zz".repeat(32);
        assert!(matches!(
            ObjectHash::from_hex(&bogus),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn short_hex_is_8_chars() {
        let hash = ObjectHash::from_bytes(b"test");
        assert_eq!(hash.short_hex().len(), 8);
    }

    #[test]
    fn display_is_full_hex() {
        let hash = ObjectHash::from_bytes(b"test");
        let display = format!("{hash}");
        assert_eq!(display.len(), HASH_HEX_LEN);
        assert_eq!(display, hash.to_hex());
    }

    #[test]
    fn file_digest_matches_byte_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.bin");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"streamed content").unwrap();
        drop(f);

        let from_file = ObjectHash::from_file(&path).unwrap();
        let from_bytes = ObjectHash::from_bytes(b"streamed content");
        assert_eq!(from_file, from_bytes);
    }

    #[test]
    fn file_digest_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ObjectHash::from_file(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let hash = ObjectHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&hash).unwrap();
        let parsed: ObjectHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn ordering_is_consistent() {
        let h1 = ObjectHash::from_digest([0; 32]);
        let h2 = ObjectHash::from_digest([1; 32]);
        assert!(h1 < h2);
    }
}
