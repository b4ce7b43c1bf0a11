//! Error type of the re-rooting engine.
//!
//! Only usage errors are reported through [RerootError]. Broken internal
//! invariants (e.g. reading a path-length cache before it was written)
//! are bugs and panic instead.

use crate::graph::ConnectionIndex;
use crate::parser::ParsingError;
use thiserror::Error;

/// Usage errors reported by the [TreeManipulator](crate::manipulator::TreeManipulator).
#[derive(Debug, Error)]
pub enum RerootError {
    /// Input tree has fewer than three leaves
    #[error("tree needs at least 3 leaves, found {found}")]
    TooFewLeaves {
        /// Number of leaves of the rejected tree
        found: usize,
    },

    /// None of the outgroup labels names a leaf of the tree
    #[error("no outgroup label matches a leaf of the tree")]
    NoOutgroupMatch,

    /// Outgroup matches every leaf, leaving no ingroup to root against
    #[error("outgroup covers all {num_leaves} leaves of the tree")]
    OutgroupCoversAllLeaves {
        /// Number of leaves of the tree
        num_leaves: usize,
    },

    /// Connection index does not exist in the graph
    #[error("connection {index} does not exist (graph has {num_connections} connections)")]
    UnknownConnection {
        /// Requested connection index
        index: ConnectionIndex,
        /// Number of connections of the graph
        num_connections: usize,
    },

    /// Newick input could not be parsed
    #[error(transparent)]
    Parsing(#[from] ParsingError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RerootError>;
