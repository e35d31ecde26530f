//! Id and timestamp providers.
//!
//! The set consumes two capabilities from its environment: fresh
//! totally-ordered ids for add records and microsecond timestamps for
//! tombstones, each strictly increasing per replica. `SystemSource` reads
//! the OS clock with a monotonic guard; `SequenceSource` is a plain
//! counter for tests and simulations.

use silo_tree::EventId;
use std::time::{SystemTime, UNIX_EPOCH};

/// A replica's source of totally-ordered identifiers.
pub trait IdSource {
    /// A fresh id, strictly greater than any this source returned before.
    fn fresh_id(&mut self) -> EventId;

    /// A microsecond-granularity timestamp, strictly increasing.
    fn now_us(&mut self) -> EventId;
}

/// Deterministic counter source.
#[derive(Clone, Debug, Default)]
pub struct SequenceSource {
    next: u64,
}

impl SequenceSource {
    pub fn new() -> Self {
        SequenceSource { next: 0 }
    }

    /// Start counting from `base`, e.g. a per-replica offset keeping ids
    /// from different simulated replicas disjoint.
    pub fn starting_at(base: u64) -> Self {
        SequenceSource { next: base }
    }
}

impl IdSource for SequenceSource {
    fn fresh_id(&mut self) -> EventId {
        self.next += 1;
        EventId::new(self.next)
    }

    fn now_us(&mut self) -> EventId {
        self.fresh_id()
    }
}

/// Wall-clock source: microseconds since the epoch, forced strictly
/// increasing even when the OS clock stalls or steps backward.
#[derive(Clone, Debug, Default)]
pub struct SystemSource {
    last: u64,
}

impl SystemSource {
    pub fn new() -> Self {
        SystemSource { last: 0 }
    }
}

impl IdSource for SystemSource {
    fn fresh_id(&mut self) -> EventId {
        self.now_us()
    }

    fn now_us(&mut self) -> EventId {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        self.last = micros.max(self.last + 1);
        EventId::new(self.last)
    }
}
