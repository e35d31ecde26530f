//! Tree nodes and the split/promote insertion routine.
//!
//! A node is a bucket of at most `capacity` children: entries for a leaf,
//! subtrees for an internal node, both kept sorted ascending. A bucket
//! seals the moment it fills (for an internal bucket, once every child is
//! itself sealed); sealing computes the content digest that replicas later
//! exchange as GC currency. Sealed buckets are never edited in place:
//! any insertion that touches one produces a replacement with a fresh
//! digest, demoting a displaced element toward the front of the tree.

use serde::{Deserialize, Serialize};

use crate::digest::{self, Digest};
use crate::entry::{Entry, EventId};
use crate::handle::Handle;
use crate::tree::TreeStats;

/// One bucket in the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Node {
    /// Bucket capacity, uniform across a tree.
    pub(crate) capacity: u32,
    /// Content digest, present exactly while the bucket is sealed.
    pub(crate) seal: Option<Digest>,
    pub(crate) children: Children,
}

/// A bucket's direct children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Children {
    /// Leaf bucket: entries sorted by `(id, payload)`.
    Entries(Vec<Entry>),
    /// Internal bucket: subtrees sorted by their newest id.
    Nodes(Vec<Node>),
}

/// Result of inserting into a subtree.
pub(crate) enum Outcome {
    /// The subtree absorbed the entry.
    Fit,
    /// The subtree was full; something was displaced toward the caller.
    Spill(Spill),
}

/// What an overflowing bucket hands upward.
pub(crate) enum Spill {
    /// A full leaf demoted its smallest entry.
    Entry(Entry),
    /// A full internal bucket shed its smallest child subtree.
    Subtree(Node),
}

impl Node {
    /// An empty leaf bucket.
    pub(crate) fn leaf(capacity: u32) -> Self {
        Node {
            capacity,
            seal: None,
            children: Children::Entries(Vec::new()),
        }
    }

    /// A leaf bucket holding one entry.
    pub(crate) fn singleton(capacity: u32, entry: Entry) -> Self {
        Node {
            capacity,
            seal: None,
            children: Children::Entries(vec![entry]),
        }
    }

    /// A new two-child root over an old root and the subtree (or demoted
    /// entry, lifted into a fresh leaf by the caller) it displaced.
    pub(crate) fn join_roots(capacity: u32, left: Node, right: Node) -> Self {
        let mut node = Node {
            capacity,
            seal: None,
            children: Children::Nodes(vec![left, right]),
        };
        node.reseal();
        node
    }

    /// Highest id transitively contained. Empty buckets report the minimum.
    pub(crate) fn newest(&self) -> EventId {
        match &self.children {
            Children::Entries(entries) => entries.last().map(|e| e.id).unwrap_or(EventId::MIN),
            Children::Nodes(nodes) => nodes.last().map(Node::newest).unwrap_or(EventId::MIN),
        }
    }

    /// Lowest id transitively contained. Empty buckets report the maximum.
    pub(crate) fn oldest(&self) -> EventId {
        match &self.children {
            Children::Entries(entries) => entries.first().map(|e| e.id).unwrap_or(EventId::MAX),
            Children::Nodes(nodes) => nodes.first().map(Node::oldest).unwrap_or(EventId::MAX),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match &self.children {
            Children::Entries(entries) => entries.len(),
            Children::Nodes(nodes) => nodes.iter().map(Node::len).sum(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match &self.children {
            Children::Entries(entries) => entries.is_empty(),
            Children::Nodes(nodes) => nodes.is_empty(),
        }
    }

    pub(crate) fn matches(&self, handle: &Handle) -> bool {
        self.seal == Some(handle.digest) && self.newest() == handle.newest
    }

    /// Insert an entry, resealing this bucket afterward. The caller has
    /// already ruled out duplicates.
    pub(crate) fn insert(&mut self, entry: Entry) -> Outcome {
        let outcome = self.place(entry);
        self.reseal();
        outcome
    }

    fn place(&mut self, entry: Entry) -> Outcome {
        let capacity = self.capacity as usize;
        match &mut self.children {
            Children::Entries(entries) => {
                let pos = match entries.binary_search(&entry) {
                    Ok(_) => return Outcome::Fit,
                    Err(pos) => pos,
                };
                if entries.len() < capacity {
                    entries.insert(pos, entry);
                    return Outcome::Fit;
                }
                // Full leaf: of the capacity + 1 candidates, the smallest
                // is demoted and the rest stay sealed here.
                if pos == 0 {
                    return Outcome::Spill(Spill::Entry(entry));
                }
                entries.insert(pos, entry);
                let demoted = entries.remove(0);
                Outcome::Spill(Spill::Entry(demoted))
            }
            Children::Nodes(nodes) => {
                // Route to the child covering the id: smallest newest >= id,
                // falling back to the greatest child.
                let mut idx = nodes
                    .iter()
                    .position(|child| child.newest() >= entry.id)
                    .unwrap_or(nodes.len() - 1);
                let mut outcome = nodes[idx].insert(entry);
                // A demoted entry belongs in the range just below the child
                // that shed it; walk it down the sibling list until a bucket
                // absorbs it or it falls off the front.
                loop {
                    match outcome {
                        Outcome::Fit => break,
                        Outcome::Spill(Spill::Subtree(shed)) => {
                            nodes.insert(idx, shed);
                            break;
                        }
                        Outcome::Spill(Spill::Entry(spilled)) => {
                            if idx == 0 {
                                nodes.insert(0, Node::singleton(capacity as u32, spilled));
                                break;
                            }
                            idx -= 1;
                            outcome = nodes[idx].insert(spilled);
                        }
                    }
                }
                if nodes.len() > capacity {
                    let shed = nodes.remove(0);
                    return Outcome::Spill(Spill::Subtree(shed));
                }
                Outcome::Fit
            }
        }
    }

    /// Recompute the seal. A bucket is sealed iff it is at capacity and,
    /// for an internal bucket, every child is sealed.
    pub(crate) fn reseal(&mut self) {
        self.seal = self.compute_seal();
    }

    fn compute_seal(&self) -> Option<Digest> {
        let capacity = self.capacity as usize;
        match &self.children {
            Children::Entries(entries) if entries.len() == capacity => {
                Some(digest::seal_digest(entries))
            }
            Children::Nodes(nodes) if nodes.len() == capacity => {
                let digests: Option<Vec<Digest>> = nodes.iter().map(|n| n.seal).collect();
                digests.map(|d| digest::chain_digest(&d))
            }
            _ => None,
        }
    }

    pub(crate) fn contains(&self, entry: &Entry) -> bool {
        match &self.children {
            Children::Entries(entries) => entries.binary_search(entry).is_ok(),
            Children::Nodes(nodes) => {
                for child in nodes {
                    if child.newest() < entry.id {
                        continue;
                    }
                    if child.oldest() > entry.id {
                        return false;
                    }
                    if child.contains(entry) {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// In-order (therefore id-ordered) clone of every entry.
    pub(crate) fn append_entries(&self, out: &mut Vec<Entry>) {
        match &self.children {
            Children::Entries(entries) => out.extend(entries.iter().cloned()),
            Children::Nodes(nodes) => {
                for child in nodes {
                    child.append_entries(out);
                }
            }
        }
    }

    pub(crate) fn into_entries(self) -> Vec<Entry> {
        let mut out = Vec::new();
        self.drain_into(&mut out);
        out
    }

    fn drain_into(self, out: &mut Vec<Entry>) {
        match self.children {
            Children::Entries(mut entries) => out.append(&mut entries),
            Children::Nodes(nodes) => {
                for child in nodes {
                    child.drain_into(out);
                }
            }
        }
    }

    /// Handles of the sealed frontier. A sealed bucket is reported once and
    /// its interior is not walked; an unsealed leaf contributes nothing.
    pub(crate) fn sealed_handles(&self, out: &mut Vec<Handle>) {
        if let Some(digest) = self.seal {
            out.push(Handle::new(self.newest(), digest));
            return;
        }
        if let Children::Nodes(nodes) = &self.children {
            for child in nodes {
                child.sealed_handles(out);
            }
        }
    }

    /// Excise the sealed subtree matching `handle` from below this node.
    /// Searches nested sealed buckets too, so handles advertised before an
    /// ancestor sealed are still honored.
    pub(crate) fn extract(&mut self, handle: &Handle) -> Option<Vec<Entry>> {
        let Children::Nodes(nodes) = &mut self.children else {
            return None;
        };
        for i in 0..nodes.len() {
            if nodes[i].matches(handle) {
                let taken = nodes.remove(i);
                self.reseal();
                return Some(taken.into_entries());
            }
            if let Some(found) = nodes[i].extract(handle) {
                if nodes[i].is_empty() {
                    nodes.remove(i);
                }
                self.reseal();
                return Some(found);
            }
        }
        None
    }

    pub(crate) fn observe(&self, depth: usize, stats: &mut TreeStats) {
        stats.nodes += 1;
        stats.depth = stats.depth.max(depth);
        if self.seal.is_some() {
            stats.sealed_nodes += 1;
        }
        match &self.children {
            Children::Entries(entries) => {
                stats.entries += entries.len();
                stats.max_fanout = stats.max_fanout.max(entries.len());
            }
            Children::Nodes(nodes) => {
                stats.max_fanout = stats.max_fanout.max(nodes.len());
                for child in nodes {
                    child.observe(depth + 1, stats);
                }
            }
        }
    }
}
