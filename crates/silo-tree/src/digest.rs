//! Content-addressed hashing for sealed buckets.
//!
//! Uses SHA-1 to generate the 20-byte digests that identify sealed buckets
//! across replicas. SHA-1 is kept for wire compatibility, not security; any
//! replica comparing digests must use the same canonical framing below.

use serde::{Deserialize, Serialize};
use sha1::{Digest as _, Sha1};
use std::fmt;

use crate::entry::Entry;

/// Domain tag fed before a leaf bucket's entries.
pub(crate) const LEAF_SEAL_DOMAIN: &[u8] = b"SILO_LEAF_V1";

/// Domain tag fed before an internal bucket's child digests.
pub(crate) const BRANCH_SEAL_DOMAIN: &[u8] = b"SILO_BRANCH_V1";

/// A 20-byte SHA-1 digest identifying a sealed bucket's contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest([u8; 20]);

impl Digest {
    /// Create a digest from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Digest(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to hex string for display.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Create from hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 40 {
            return None;
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex_str = std::str::from_utf8(chunk).ok()?;
            bytes[i] = u8::from_str_radix(hex_str, 16).ok()?;
        }
        Some(Digest(bytes))
    }

    /// Truncated display (first 8 chars).
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hasher utility for computing bucket digests.
pub struct Hasher {
    inner: Sha1,
}

impl Hasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Hasher { inner: Sha1::new() }
    }

    /// Update the hasher with data.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> Digest {
        let result = self.inner.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&result);
        Digest(bytes)
    }

    /// Hash data directly.
    pub fn hash(data: &[u8]) -> Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Digest of a full leaf bucket: a canonical, length-prefixed serialization
/// of its entries. Equal entry sets always produce equal digests.
pub fn seal_digest(entries: &[Entry]) -> Digest {
    let mut hasher = Hasher::new();
    hasher.update(LEAF_SEAL_DOMAIN);
    hasher.update(&(entries.len() as u64).to_le_bytes());
    for entry in entries {
        hasher.update(&entry.id.as_u64().to_le_bytes());
        hasher.update(&(entry.payload.len() as u64).to_le_bytes());
        hasher.update(&entry.payload);
    }
    hasher.finalize()
}

/// Digest of a full internal bucket: a running feed of its child digests
/// left-to-right, smallest range first.
pub fn chain_digest(children: &[Digest]) -> Digest {
    let mut hasher = Hasher::new();
    hasher.update(BRANCH_SEAL_DOMAIN);
    for child in children {
        hasher.update(child.as_bytes());
    }
    hasher.finalize()
}
