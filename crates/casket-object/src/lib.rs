//! Immutable object model for casket.
//!
//! Three object kinds make up the store, analogous to git internals:
//!
//! - [`Blob`] — a handle to raw content, identified by an externally
//!   computed digest
//! - [`Tree`] — a directory listing mapping entry names to [`TreeRecord`]s
//! - [`Commit`] — a point-in-time snapshot reference with ordered parents
//!
//! All three are pure value types: construction validates structural shape
//! only and performs no I/O. Once built they are never mutated — identity
//! comes from content, via the [`ContentAddress`] trait.
//!
//! # Design Rules
//!
//! 1. Structural equality implies hash equality. Tree hashing walks an
//!    explicitly name-ordered view, so two equal trees built in different
//!    orders always hash identically.
//! 2. Commit parent order is semantically meaningful (primary ancestry
//!    first) and participates in the hash.
//! 3. The digest algorithm is opaque: this crate consumes
//!    `casket_types::ObjectHash` and never looks inside it.

pub mod canonical;
pub mod error;
pub mod object;

pub use canonical::ContentAddress;
pub use error::ObjectError;
pub use object::{Blob, Commit, RecordKind, Tree, TreeRecord};
