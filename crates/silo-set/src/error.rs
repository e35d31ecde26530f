//! Error types for set operations.

use silo_tree::{EventId, TreeError};
use thiserror::Error;

/// Errors that can occur in set operations. Merging never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    /// The underlying bucket tree rejected its configuration.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A local operation presented an id that does not advance this
    /// replica's issuing order. Ids must be strictly increasing per
    /// replica, separately for add ids and tombstone ids.
    #[error("id {id} does not advance past the replica's last issued id {last}")]
    StaleId { id: EventId, last: EventId },
}

pub type Result<T> = std::result::Result<T, SetError>;
