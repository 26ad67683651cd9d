//! Slot layer: one durable storage location per content hash.
//!
//! Objects live under `<objects>/<aa>/<bbbb…>` where `aa` is the first two
//! hex characters of the hash (fan-out sharding, keeps directory fan
//! manageable). Advisory locking via `flock`: writers hold an exclusive
//! lock from open to close, readers a shared lock, so a reader blocks
//! against an in-progress writer and never observes a half-written slot
//! that survives — a failed write deletes its slot before the error
//! propagates.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use casket_types::ObjectHash;

use crate::error::{StoreError, StoreResult};

/// Directory of hash-keyed slots.
#[derive(Debug, Clone)]
pub struct SlotDir {
    objects_dir: PathBuf,
}

impl SlotDir {
    /// Create a slot directory rooted at `objects_dir`. The directory
    /// itself is created by the store on open.
    pub fn new(objects_dir: PathBuf) -> Self {
        Self { objects_dir }
    }

    /// The directory all slots live under.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// The path of the slot for `hash`.
    pub fn slot_path(&self, hash: &ObjectHash) -> PathBuf {
        let hex = hash.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    /// Open the slot for `hash` exclusively for writing.
    ///
    /// Creates the fan-out directory as needed and truncates any previous
    /// content once the exclusive lock is held.
    pub fn open_for_writing(&self, hash: &ObjectHash) -> StoreResult<WriteSlot> {
        let path = self.slot_path(hash);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).write(true).open(&path)?;
        if let Err(e) = file.lock_exclusive() {
            // The slot file may have just been created; don't leave an
            // empty orphan behind.
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }
        // Truncate under the lock, not at open, so a concurrent reader
        // holding the shared lock is never raced.
        file.set_len(0)?;

        Ok(WriteSlot {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Open the slot for `hash` for reading, with a shared lock.
    pub fn open_for_reading(&self, hash: &ObjectHash) -> StoreResult<ReadSlot> {
        let path = self.slot_path(hash);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*hash));
            }
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        Ok(ReadSlot {
            reader: BufReader::new(file),
        })
    }

    /// Remove the slot for `hash`, if present. Returns whether it existed.
    pub fn delete(&self, hash: &ObjectHash) -> io::Result<bool> {
        match fs::remove_file(self.slot_path(hash)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether a slot exists for `hash`.
    pub fn exists(&self, hash: &ObjectHash) -> bool {
        self.slot_path(hash).exists()
    }
}

/// Exclusive write handle to one slot.
///
/// The exclusive lock is held until [`commit`](WriteSlot::commit) or drop.
/// A `WriteSlot` never finalizes implicitly: callers that bail out must
/// delete the slot (see `ObjectStore::write_object`).
pub struct WriteSlot {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl WriteSlot {
    /// Flush, sync, unlock, and close the slot. After this returns the
    /// hash is a valid, permanent key for the written object.
    pub fn commit(mut self) -> io::Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_ref();
        file.sync_all()?;
        FileExt::unlock(file)?;
        Ok(())
    }

    /// The on-disk path of this slot.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for WriteSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSlot").field("path", &self.path).finish()
    }
}

impl Write for WriteSlot {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Shared read handle to one slot. The shared lock is released when the
/// handle is dropped.
#[derive(Debug)]
pub struct ReadSlot {
    reader: BufReader<File>,
}

impl Read for ReadSlot {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_dir() -> (tempfile::TempDir, SlotDir) {
        let dir = tempfile::tempdir().unwrap();
        let slots = SlotDir::new(dir.path().join("objects"));
        (dir, slots)
    }

    #[test]
    fn slot_path_uses_fanout() {
        let (_dir, slots) = slot_dir();
        let hash = ObjectHash::from_bytes(b"x");
        let path = slots.slot_path(&hash);
        let hex = hash.to_hex();

        assert!(path.ends_with(Path::new(&hex[..2]).join(&hex[2..])));
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (_dir, slots) = slot_dir();
        let hash = ObjectHash::from_bytes(b"payload");

        let mut slot = slots.open_for_writing(&hash).unwrap();
        slot.write_all(b"payload").unwrap();
        slot.commit().unwrap();

        let mut reader = slots.open_for_reading(&hash).unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"payload");
    }

    #[test]
    fn reading_absent_slot_is_not_found() {
        let (_dir, slots) = slot_dir();
        let hash = ObjectHash::from_bytes(b"missing");
        assert!(matches!(
            slots.open_for_reading(&hash).unwrap_err(),
            StoreError::NotFound(h) if h == hash
        ));
    }

    #[test]
    fn delete_reports_existence() {
        let (_dir, slots) = slot_dir();
        let hash = ObjectHash::from_bytes(b"gone");

        let mut slot = slots.open_for_writing(&hash).unwrap();
        slot.write_all(b"gone").unwrap();
        slot.commit().unwrap();

        assert!(slots.exists(&hash));
        assert!(slots.delete(&hash).unwrap());
        assert!(!slots.exists(&hash));
        assert!(!slots.delete(&hash).unwrap());
    }

    #[test]
    fn rewriting_truncates_previous_content() {
        let (_dir, slots) = slot_dir();
        let hash = ObjectHash::from_bytes(b"v");

        let mut slot = slots.open_for_writing(&hash).unwrap();
        slot.write_all(b"a longer first version").unwrap();
        slot.commit().unwrap();

        let mut slot = slots.open_for_writing(&hash).unwrap();
        slot.write_all(b"short").unwrap();
        slot.commit().unwrap();

        let mut buf = Vec::new();
        slots.open_for_reading(&hash).unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"short");
    }
}
