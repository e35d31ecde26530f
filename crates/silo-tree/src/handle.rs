//! Handles: compact cross-replica names for sealed buckets.
//!
//! A handle is the `(newest, digest)` pair replicas exchange when
//! negotiating which buckets every participant has observed. The digest
//! alone is not enough to place a bucket in an id-ordered tree, so the
//! bucket's highest id rides along.

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::entry::{Entry, EventId};

/// Wire size of one encoded handle: 8-byte id + 20-byte digest.
pub const HANDLE_WIRE_LEN: usize = 28;

/// A `(newest, digest)` pair naming one sealed bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle {
    /// Highest id transitively contained in the bucket.
    pub newest: EventId,
    /// Content digest of the sealed bucket.
    pub digest: Digest,
}

impl Handle {
    pub fn new(newest: EventId, digest: Digest) -> Self {
        Handle { newest, digest }
    }

    /// Fixed-width wire encoding: big-endian id, then the digest bytes.
    pub fn to_bytes(&self) -> [u8; HANDLE_WIRE_LEN] {
        let mut out = [0u8; HANDLE_WIRE_LEN];
        out[..8].copy_from_slice(&self.newest.as_u64().to_be_bytes());
        out[8..].copy_from_slice(self.digest.as_bytes());
        out
    }

    /// Decode a single wire handle. `None` unless exactly 28 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != HANDLE_WIRE_LEN {
            return None;
        }
        let mut id = [0u8; 8];
        id.copy_from_slice(&bytes[..8]);
        let mut digest = [0u8; 20];
        digest.copy_from_slice(&bytes[8..]);
        Some(Handle {
            newest: EventId::new(u64::from_be_bytes(id)),
            digest: Digest::from_bytes(digest),
        })
    }

    /// Encode a batch of handles for a gcable exchange: u32 count prefix,
    /// then fixed-width handles.
    pub fn encode_batch(handles: &[Handle]) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + handles.len() * HANDLE_WIRE_LEN);
        out.extend_from_slice(&(handles.len() as u32).to_be_bytes());
        for handle in handles {
            out.extend_from_slice(&handle.to_bytes());
        }
        out
    }

    /// Decode a batch produced by [`Handle::encode_batch`].
    pub fn decode_batch(bytes: &[u8]) -> Option<Vec<Handle>> {
        if bytes.len() < 4 {
            return None;
        }
        let mut count = [0u8; 4];
        count.copy_from_slice(&bytes[..4]);
        let count = u32::from_be_bytes(count) as usize;
        let body = &bytes[4..];
        if body.len() != count * HANDLE_WIRE_LEN {
            return None;
        }
        body.chunks(HANDLE_WIRE_LEN).map(Handle::from_bytes).collect()
    }

    /// The entry form a GC trail stores: the bucket's newest id tagging the
    /// raw digest bytes.
    pub fn to_entry(&self) -> Entry {
        Entry::new(self.newest, self.digest.as_bytes().to_vec())
    }

    /// Recover a handle from its trail entry. `None` if the payload is not
    /// a digest.
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        let bytes: [u8; 20] = entry.payload.as_slice().try_into().ok()?;
        Some(Handle {
            newest: entry.id,
            digest: Digest::from_bytes(bytes),
        })
    }
}
