//! Garbage-collectable Observed-Remove Set.
//!
//! Standard OR-Set rules, made deterministic by monotonic ids: every add
//! is a distinct `(id, element)` record, a remove tombstones exactly the
//! records it observed, and a later add of the same element wins over an
//! earlier remove. The twist is the tombstone store: tombstones accumulate
//! in a sealed-bucket tree, and once a full bucket is known to every
//! replica it is erased wholesale from both the add set and the tombstone
//! tree, with the bucket's handle appended to a GC trail so peers replay
//! the erasure instead of resurrecting the records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use silo_tree::{BucketTree, Entry, EventId, Handle, Merge};

use crate::error::{Result, SetError};
use crate::tombstone::Tombstone;

/// An Observed-Remove Set whose tombstones can be garbage collected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcOrSet {
    capacity: u32,
    /// Live and tombstoned add records `(id, element)`.
    adds: BTreeSet<Entry>,
    /// Tombstones keyed by removal timestamp.
    removes: BucketTree,
    /// GC trail: handles of tombstone buckets already erased here.
    gced: BucketTree,
    /// Largest add id issued locally.
    last_add: Option<EventId>,
    /// Largest tombstone id issued locally.
    last_tomb: Option<EventId>,
}

impl GcOrSet {
    /// An empty set whose tombstone buckets hold `capacity` entries.
    pub fn new(capacity: u32) -> Result<Self> {
        Ok(GcOrSet {
            capacity,
            adds: BTreeSet::new(),
            removes: BucketTree::new(capacity)?,
            gced: BucketTree::new(capacity)?,
            last_add: None,
            last_tomb: None,
        })
    }

    /// Tombstone bucket capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Record `(id, element)` as present. `id` comes from the replica's
    /// fresh-id source and must advance past every add id used before.
    pub fn add(&mut self, id: EventId, element: impl Into<Vec<u8>>) -> Result<()> {
        if let Some(last) = self.last_add {
            if id <= last {
                return Err(SetError::StaleId { id, last });
            }
        }
        self.adds.insert(Entry::new(id, element.into()));
        self.last_add = Some(id);
        Ok(())
    }

    /// Tombstone every currently-observed record of `element` under the
    /// removal timestamp `tomb_id` (the replica's microsecond clock).
    /// Returns how many records were tombstoned; 0 if the element is not
    /// in the set.
    pub fn remove(&mut self, tomb_id: EventId, element: &[u8]) -> Result<usize> {
        if let Some(last) = self.last_tomb {
            if tomb_id <= last {
                return Err(SetError::StaleId { id: tomb_id, last });
            }
        }
        let victims: Vec<Entry> = self
            .live_records()
            .into_iter()
            .filter(|record| record.payload == element)
            .collect();
        for victim in &victims {
            let tomb = Tombstone::new(victim.id, victim.payload.clone());
            self.removes.insert(tomb.entry(tomb_id));
        }
        self.last_tomb = Some(tomb_id);
        Ok(victims.len())
    }

    /// The observable set: payloads of add records no tombstone covers.
    pub fn value(&self) -> BTreeSet<Vec<u8>> {
        self.live_records()
            .into_iter()
            .map(|record| record.payload)
            .collect()
    }

    /// Whether `element` is observably present.
    pub fn contains(&self, element: &[u8]) -> bool {
        self.live_records()
            .iter()
            .any(|record| record.payload == element)
    }

    /// Number of observably-present elements.
    pub fn len(&self) -> usize {
        self.value().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live_records().is_empty()
    }

    /// Handles this replica can offer for garbage collection: every sealed
    /// bucket of the tombstone tree and of the GC trail. The environment
    /// intersects these across replicas; a handle everyone holds is safe
    /// to pass to [`GcOrSet::gc`] everywhere.
    pub fn gcable(&self) -> Vec<Handle> {
        let mut handles: BTreeSet<Handle> = self.removes.sealed().into_iter().collect();
        handles.extend(self.gced.sealed());
        handles.into_iter().collect()
    }

    /// Erase the tombstone bucket named by `handle`: its tombstones leave
    /// the tree and the add records they cover leave the add set, so the
    /// erased history costs no further space. The handle is recorded in
    /// the GC trail either way; a handle matching no local bucket is a
    /// replay from a peer that sealed the bucket first, and recording it
    /// keeps the trail convergent. Returns the number of tombstones
    /// erased (0 for such a replay).
    pub fn gc(&mut self, handle: &Handle) -> usize {
        let purged = match self.removes.extract(handle) {
            Some(tombstones) => {
                for tomb in tombstones.iter().filter_map(Tombstone::from_entry) {
                    self.adds.remove(&tomb.add_record());
                }
                tombstones.len()
            }
            None => 0,
        };
        // A handle can also name a sealed bucket of the trail itself; once
        // every peer holds that bucket the individual handles inside it
        // have all been replayed everywhere and the bucket collapses into
        // this one record.
        self.gced.extract(handle);
        self.gced.insert(handle.to_entry());
        purged
    }

    /// Handles already applied here, decoded from the GC trail.
    pub fn trail(&self) -> Vec<Handle> {
        self.gced
            .entries()
            .iter()
            .filter_map(Handle::from_entry)
            .collect()
    }

    /// Add records no tombstone covers.
    fn live_records(&self) -> Vec<Entry> {
        let dead: BTreeSet<Entry> = self
            .removes
            .entries()
            .iter()
            .filter_map(Tombstone::from_entry)
            .map(|tomb| tomb.add_record())
            .collect();
        self.adds
            .iter()
            .filter(|record| !dead.contains(*record))
            .cloned()
            .collect()
    }
}

impl Merge for GcOrSet {
    /// Combine two replica states. Each side's GC trail is replayed on the
    /// other before anything is unioned; uniting first would resurrect
    /// records the other side already erased.
    fn merge(&self, other: &Self) -> Self {
        let our_trail = self.trail();
        let their_trail = other.trail();

        let mut left = self.clone();
        for handle in &their_trail {
            left.gc(handle);
        }
        let mut right = other.clone();
        for handle in &our_trail {
            right.gc(handle);
        }

        let mut adds = left.adds;
        adds.extend(right.adds);

        GcOrSet {
            capacity: left.capacity,
            adds,
            removes: left.removes.merge(&right.removes),
            // After replay the left trail carries both sides' handles.
            gced: left.gced,
            last_add: self.last_add.max(other.last_add),
            last_tomb: self.last_tomb.max(other.last_tomb),
        }
    }
}
