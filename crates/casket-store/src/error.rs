use std::io;

use casket_object::ObjectError;
use casket_types::ObjectHash;

/// Errors from codec and store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No slot exists for the requested hash.
    #[error("object not found: {0}")]
    NotFound(ObjectHash),

    /// I/O error from the underlying slot (encode short writes surface
    /// here via `write_all`).
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A read returned fewer bytes than the preceding length prefix or
    /// fixed-width field promised.
    #[error("truncated object: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// A length prefix exceeds the configured maximum.
    #[error("length prefix {length} exceeds maximum {max}")]
    LengthExceeded { length: u32, max: u32 },

    /// Decoded data is structurally invalid (duplicate names, unknown
    /// kind codes).
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// Decoded bytes are not a valid object field (non-UTF-8 strings,
    /// malformed digests).
    #[error("corrupt object: {0}")]
    Corrupt(String),

    /// A failed write could not be rolled back. Carries both the original
    /// failure and the cleanup failure so neither is masked.
    #[error("write of {hash} failed ({source}); rollback also failed: {cleanup}")]
    RollbackFailed {
        hash: ObjectHash,
        source: Box<StoreError>,
        cleanup: io::Error,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
