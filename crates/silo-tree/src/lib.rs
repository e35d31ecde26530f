//! # silo-tree
//!
//! A content-addressed tree of time-ordered, sealable buckets.
//!
//! This crate provides:
//! - An ordered entry set grouped into buckets of a fixed capacity
//! - Sealing: a bucket that fills becomes immutable and content-addressed
//! - Split/promote insertion that keeps the newest ids clustered right
//! - Wholesale excision of sealed buckets by `(newest, digest)` handle
//!
//! ## Architecture
//!
//! Replicas use sealed-bucket handles as garbage-collection currency:
//! 1. Each replica advertises the handles of its sealed buckets
//! 2. Handles held by every replica name universally-observed history
//! 3. Such buckets can be excised wholesale, without entry-level diffing
//! 4. Digests make the exchange compact and tamper-evident
//!
//! ## Example
//!
//! ```rust
//! use silo_tree::{BucketTree, Entry, EventId};
//!
//! let mut tree = BucketTree::new(3).unwrap();
//! for id in 1..=3u64 {
//!     tree.insert(Entry::new(EventId::new(id), b"payload".to_vec()));
//! }
//!
//! // Three entries fill a bucket; it seals and advertises a handle.
//! let sealed = tree.sealed();
//! assert_eq!(sealed.len(), 1);
//!
//! // The handle buys back exactly the bucket's entries.
//! let removed = tree.extract(&sealed[0]).unwrap();
//! assert_eq!(removed.len(), 3);
//! assert!(tree.is_empty());
//! ```

mod digest;
mod entry;
mod handle;
mod merge;
mod node;
mod tree;

pub use digest::{chain_digest, seal_digest, Digest, Hasher};
pub use entry::{Entry, EventId};
pub use handle::{Handle, HANDLE_WIRE_LEN};
pub use merge::Merge;
pub use tree::{BucketTree, TreeError, TreeStats};
