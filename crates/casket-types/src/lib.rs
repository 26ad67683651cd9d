//! Foundation types for casket.
//!
//! This crate provides the content-addressed identifier used throughout the
//! store and the digest capability that produces it. Every other casket
//! crate depends on `casket-types`.
//!
//! # Key Types
//!
//! - [`ObjectHash`] — content-addressed identifier (BLAKE3 digest, hex form)
//! - [`TypeError`] — parse/validation errors for identifiers
//!
//! The digest algorithm is deliberately confined to this crate: the object
//! model and codec treat an [`ObjectHash`] as an opaque, fixed-format
//! string, so swapping the algorithm touches nothing above this layer.

pub mod error;
pub mod hash;

pub use error::TypeError;
pub use hash::{ObjectHash, HASH_HEX_LEN};
