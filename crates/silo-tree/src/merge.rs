//! The replication seam shared by every convergent structure in this
//! workspace.
//!
//! `merge` must be commutative, associative, and idempotent as observed
//! through a structure's value function. Those properties are what let
//! replicas apply merges in any order, any number of times, and still
//! converge. Internal layout (bucket boundaries, seal digests in flight)
//! may differ between two observably-equal states.

/// A state that can absorb a peer's state without coordination.
pub trait Merge: Sized {
    /// Combine two replica states into one containing everything either
    /// side has observed. Never fails.
    fn merge(&self, other: &Self) -> Self;

    /// Merge-assign: `self = self.merge(other)`.
    fn merge_assign(&mut self, other: &Self) {
        *self = self.merge(other);
    }
}
