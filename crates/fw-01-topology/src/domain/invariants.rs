//! Depth invariants.

use shared_types::{NodeId, ROOT_NODE};
use thiserror::Error;

use super::{NodeDepth, Topology};

/// Depth invariant violation.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum DepthViolation {
    /// The root is missing or not at depth 0.
    #[error("Root node is missing or not at depth 0")]
    RootNotZero,
    /// A non-root node has no reached parent exactly one level above it.
    #[error("Node {node} at depth {depth} has no parent at depth {}", .depth.saturating_sub(1))]
    NoParent { node: NodeId, depth: u32 },
}

/// INVARIANT-1: Root at zero
/// The root is reached and has depth 0.
pub fn invariant_root_is_zero(depths: &NodeDepth) -> bool {
    depths.get(ROOT_NODE) == Some(0)
}

/// INVARIANT-2: Parent step
/// Every reached non-root node is listed as a neighbor of some reached node
/// whose depth is exactly one less.
pub fn invariant_parent_step(topology: &Topology, depths: &NodeDepth, node: NodeId) -> bool {
    let Some(depth) = depths.get(node) else {
        return true;
    };
    if node == ROOT_NODE {
        return depth == 0;
    }
    topology.iter().any(|(parent, neighbors)| {
        neighbors.contains(&node) && depths.get(parent).map(|d| d + 1) == Some(depth)
    })
}

/// Check all depth invariants.
pub fn check_depth_invariants(
    topology: &Topology,
    depths: &NodeDepth,
) -> Result<(), DepthViolation> {
    if !invariant_root_is_zero(depths) {
        return Err(DepthViolation::RootNotZero);
    }
    for (node, depth) in depths.iter() {
        if !invariant_parent_step(topology, depths, node) {
            return Err(DepthViolation::NoParent { node, depth });
        }
    }
    Ok(())
}
