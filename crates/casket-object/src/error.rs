use thiserror::Error;

/// Structural errors from object construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectError {
    /// A tree record has an empty name.
    #[error("tree record name must be non-empty")]
    EmptyRecordName,

    /// Two tree records share the same name.
    #[error("duplicate tree record name: {0:?}")]
    DuplicateRecordName(String),

    /// A tree mapping key does not match its record's name.
    #[error("tree key {key:?} does not match record name {name:?}")]
    KeyNameMismatch { key: String, name: String },

    /// A record kind code outside the known enumeration.
    #[error("unknown record kind code: {0}")]
    UnknownRecordKind(u8),
}
