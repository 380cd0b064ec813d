//! Error types for network operations.
//!
//! All errors are local and recoverable; none leaves the network in an
//! inconsistent state. Absence of a route is an expected outcome and is
//! reported through [`Route`](crate::topology::Route) sentinels, not here.

use thiserror::Error;

use crate::types::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// An operation referenced a station id that was never registered.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// No station is active, so a new emergency cannot be enqueued anywhere.
    /// The record is still retained in the record index for audit.
    #[error("no active node available")]
    NoActiveNode,
}
