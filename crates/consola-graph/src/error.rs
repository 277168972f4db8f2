//! Error types for graph operations.

use thiserror::Error;

/// Errors produced by the rewiring engine.
///
/// Topology-level mutations no-op on bad input instead of erroring; the
/// rewiring primitives return these so orchestrators can distinguish "node
/// missing" from "insertion rolled back" before mapping the result to a
/// boolean for callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The referenced node does not exist in the target topology.
    #[error("node not found: {0}")]
    NotFound(String),

    /// A channel index is out of range for a node's current channel count.
    #[error("channel {channel} out of range for node '{node}' (limit {limit})")]
    InvalidChannel {
        /// Node whose port was addressed.
        node: String,
        /// Offending channel index.
        channel: u32,
        /// The node's channel count on the addressed side.
        limit: u32,
    },

    /// Insert-between could not connect at least one channel on each side;
    /// the topology was restored to its pre-call state.
    #[error("insertion of '{node}' rejected, original connection restored")]
    InsertionRejected {
        /// Node that failed to be inserted.
        node: String,
    },
}
