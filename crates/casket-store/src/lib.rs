//! Durable, content-addressed object storage for casket.
//!
//! This crate is the I/O half of the store: a binary codec for tree and
//! commit objects, a slot layer that maps each content hash to one
//! advisory-locked file, and the write protocol that makes persistence
//! all-or-nothing.
//!
//! # Reliability contract
//!
//! A reader must never observe a half-written object under its final hash.
//! Every write runs inside a scoped slot acquisition: compute the hash,
//! lock the slot exclusively, encode, then flush and unlock — and on *any*
//! failure along the way, delete the slot before the error reaches the
//! caller. If that rollback itself fails, both errors are reported
//! together ([`StoreError::RollbackFailed`]); the original is never
//! masked.
//!
//! # Wire format
//!
//! See [`codec`] for the exact little-endian, length-prefixed layouts.
//! There is no magic number or version tag; a slot's bytes are exactly the
//! encoded fields.

pub mod codec;
pub mod error;
pub mod slot;
pub mod store;

pub use codec::DEFAULT_MAX_STRING_LEN;
pub use error::{StoreError, StoreResult};
pub use slot::{ReadSlot, SlotDir, WriteSlot};
pub use store::{ObjectStore, StoreConfig};
