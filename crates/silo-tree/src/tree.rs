//! The bucket tree: an ordered set of entries grouped into time-ordered,
//! content-addressed buckets.
//!
//! Buckets seal when they fill; sealed buckets advertise `(newest, digest)`
//! handles that replicas intersect to find history everyone has observed,
//! then excise wholesale. Insertion follows the split/promote discipline in
//! [`crate::node`]: a full bucket demotes its smallest element toward the
//! front of the tree, and a full child list sheds its smallest subtree one
//! level up, so the newest ids stay tightly clustered at the right edge.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::entry::Entry;
use crate::handle::Handle;
use crate::merge::Merge;
use crate::node::{Children, Node, Outcome, Spill};

/// Errors that can occur when building a tree.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// Buckets must hold at least two children for splitting to make sense.
    #[error("bucket capacity must be at least 2, got {0}")]
    CapacityTooSmall(u32),
}

/// An ordered entry set stored as a tree of sealable buckets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTree {
    capacity: u32,
    root: Node,
}

impl BucketTree {
    /// An empty tree with the given bucket capacity (`>= 2`).
    pub fn new(capacity: u32) -> Result<Self, TreeError> {
        if capacity < 2 {
            return Err(TreeError::CapacityTooSmall(capacity));
        }
        Ok(BucketTree {
            capacity,
            root: Node::leaf(capacity),
        })
    }

    /// Bucket capacity, uniform across the tree.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Insert an entry. Returns `false` (and changes nothing) if the exact
    /// entry is already present.
    pub fn insert(&mut self, entry: Entry) -> bool {
        if self.root.contains(&entry) {
            return false;
        }
        match self.root.insert(entry) {
            Outcome::Fit => {}
            Outcome::Spill(spill) => {
                // Root overflow: grow a new two-child root with the
                // displaced element on the left of the old root.
                let left = match spill {
                    Spill::Entry(entry) => {
                        let mut fresh = Node::leaf(self.capacity);
                        fresh.insert(entry);
                        fresh
                    }
                    Spill::Subtree(node) => node,
                };
                let old = std::mem::replace(&mut self.root, Node::leaf(self.capacity));
                self.root = Node::join_roots(self.capacity, left, old);
            }
        }
        true
    }

    /// Whether the exact `(id, payload)` entry is present.
    pub fn contains(&self, entry: &Entry) -> bool {
        self.root.contains(entry)
    }

    /// Every distinct entry, in id order.
    pub fn entries(&self) -> BTreeSet<Entry> {
        let mut out = Vec::with_capacity(self.len());
        self.root.append_entries(&mut out);
        out.into_iter().collect()
    }

    /// Number of entries stored.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Handles of every sealed bucket on the sealed frontier, in id order.
    /// Only digest-backed buckets are eligible for garbage collection, so a
    /// fully unsealed subtree contributes nothing.
    pub fn sealed(&self) -> Vec<Handle> {
        let mut out = Vec::new();
        self.root.sealed_handles(&mut out);
        out
    }

    /// Excise the sealed subtree matching `handle` and return its entries.
    /// `None` if no sealed bucket (nested ones included) matches.
    pub fn extract(&mut self, handle: &Handle) -> Option<Vec<Entry>> {
        let found = if self.root.matches(handle) {
            let taken = std::mem::replace(&mut self.root, Node::leaf(self.capacity));
            Some(taken.into_entries())
        } else {
            self.root.extract(handle)
        };
        if found.is_some() {
            self.collapse_root();
        }
        found
    }

    /// Shape counters, mostly for diagnostics and invariant checks.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.root.observe(1, &mut stats);
        stats
    }

    /// Drop pointless root layers after an excision: an empty internal root
    /// becomes an empty leaf, a single-child root becomes its child.
    fn collapse_root(&mut self) {
        loop {
            match &mut self.root.children {
                Children::Nodes(nodes) if nodes.len() == 1 => {
                    if let Some(only) = nodes.pop() {
                        self.root = only;
                    }
                }
                Children::Nodes(nodes) if nodes.is_empty() => {
                    self.root = Node::leaf(self.capacity);
                    break;
                }
                _ => break,
            }
        }
    }
}

impl Merge for BucketTree {
    /// Set union, realized by replaying the peer's entries. Replays happen
    /// in id order, so two replicas that union the same history arrive at
    /// the same buckets and the same digests.
    fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for entry in other.entries() {
            merged.insert(entry);
        }
        merged
    }
}

/// Shape counters for a tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Total entries stored.
    pub entries: usize,
    /// Total buckets, leaves and internal.
    pub nodes: usize,
    /// Buckets currently sealed.
    pub sealed_nodes: usize,
    /// Longest root-to-leaf path, in buckets.
    pub depth: usize,
    /// Largest child count observed in any bucket.
    pub max_fanout: usize,
}
