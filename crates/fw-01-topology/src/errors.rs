//! Error types for the topology subsystem.

use shared_types::NodeId;
use thiserror::Error;

/// Topology construction and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("Topology has no nodes")]
    Empty,

    #[error("Node ids must be contiguous 0..{expected}: missing node {missing}")]
    NonContiguous { expected: usize, missing: NodeId },

    #[error("Node {node} lists neighbor {neighbor} which is not in the topology")]
    UnknownNeighbor { node: NodeId, neighbor: NodeId },

    #[error("Node {0} is unreachable from the root")]
    Unreachable(NodeId),

    #[error("Preset needs at least {min} nodes, got {got}")]
    TooSmall { min: usize, got: usize },

    #[error("Invalid topology document: {0}")]
    Parse(String),
}
