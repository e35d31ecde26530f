//! # silo-set
//!
//! A garbage-collectable Observed-Remove Set.
//!
//! This crate provides:
//! - OR-Set semantics with deterministic, monotonic add ids
//! - A tombstone store of sealed, content-addressed buckets
//! - Wholesale garbage collection of universally-observed tombstone
//!   buckets, coordinated through digest handles
//! - A GC trail replayed during merge so erasures propagate instead of
//!   resurrecting
//!
//! ## Architecture
//!
//! State is purely additive until garbage collection: adds append records,
//! removes append tombstones, merge unions. The environment drives GC by
//! intersecting `gcable` handles across replicas and applying `gc` for
//! each handle everyone holds; merge replays each side's GC trail on the
//! other before unioning, which keeps the merge commutative, associative,
//! and idempotent at the value level even when GC has run on one side
//! only.
//!
//! ## Example
//!
//! ```rust
//! use silo_set::{GcOrSet, IdSource, SequenceSource};
//! use silo_tree::Merge;
//!
//! let mut ids = SequenceSource::new();
//! let mut a = GcOrSet::new(100).unwrap();
//! let mut b = GcOrSet::new(100).unwrap();
//!
//! a.add(ids.fresh_id(), b"apple".to_vec()).unwrap();
//! b.add(ids.fresh_id(), b"pear".to_vec()).unwrap();
//! b.remove(ids.now_us(), b"pear").unwrap();
//!
//! let merged = a.merge(&b);
//! assert!(merged.contains(b"apple"));
//! assert!(!merged.contains(b"pear"));
//! ```

mod error;
mod orset;
mod source;
mod tombstone;

pub use error::{Result, SetError};
pub use orset::GcOrSet;
pub use source::{IdSource, SequenceSource, SystemSource};
pub use tombstone::Tombstone;

pub use silo_tree::{BucketTree, Digest, Entry, EventId, Handle, Hasher, Merge, TreeError};
