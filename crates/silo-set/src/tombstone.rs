//! Tombstone payload codec.
//!
//! A tombstone marks one observed add record `(add_id, element)` as
//! removed. In the tombstone tree it is stored as an entry whose id is the
//! removal timestamp and whose payload frames the victim record: 8-byte
//! big-endian add id, then the element bytes.

use silo_tree::{Entry, EventId};

/// One removed add record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tombstone {
    /// Id of the add record this tombstone covers.
    pub add_id: EventId,
    /// The element the record carried.
    pub element: Vec<u8>,
}

impl Tombstone {
    pub fn new(add_id: EventId, element: Vec<u8>) -> Self {
        Tombstone { add_id, element }
    }

    /// The tree entry for this tombstone under removal timestamp `tomb_id`.
    pub fn entry(&self, tomb_id: EventId) -> Entry {
        let mut payload = Vec::with_capacity(8 + self.element.len());
        payload.extend_from_slice(&self.add_id.as_u64().to_be_bytes());
        payload.extend_from_slice(&self.element);
        Entry::new(tomb_id, payload)
    }

    /// Decode a tombstone tree entry. `None` if the payload is too short to
    /// frame an add id (never the case for locally written tombstones).
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        let id_bytes: [u8; 8] = entry.payload.get(..8)?.try_into().ok()?;
        Some(Tombstone {
            add_id: EventId::new(u64::from_be_bytes(id_bytes)),
            element: entry.payload[8..].to_vec(),
        })
    }

    /// The add record this tombstone kills, in its `adds`-set form.
    pub fn add_record(&self) -> Entry {
        Entry::new(self.add_id, self.element.clone())
    }
}
