//! Identifiers and entries.
//!
//! An `EventId` is a totally-ordered identifier issued by the environment:
//! replica-local fresh ids for add records, microsecond timestamps for
//! tombstones. Entries pair an id with an opaque payload and never change
//! once created.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A totally-ordered identifier. Monotonic per replica, compared globally.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventId(u64);

impl EventId {
    /// The smallest possible id. Empty buckets report this as their range.
    pub const MIN: EventId = EventId(0);

    /// The largest possible id.
    pub const MAX: EventId = EventId(u64::MAX);

    pub fn new(id: u64) -> Self {
        EventId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        EventId(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An id-tagged opaque payload. The unit both the tree and the set store.
///
/// Entries order by id first, payload bytes second, so two records created
/// under the same id (e.g. tombstones written by a single remove) keep a
/// deterministic relative order everywhere.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub id: EventId,
    pub payload: Vec<u8>,
}

impl Entry {
    pub fn new(id: EventId, payload: Vec<u8>) -> Self {
        Entry { id, payload }
    }
}
