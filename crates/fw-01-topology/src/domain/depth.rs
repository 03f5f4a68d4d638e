//! # Depth Calculator
//!
//! Depth from the root is the logical unit time of a message arriving at a
//! node. It is computed once per run with a depth-first traversal from node 0.

use std::collections::{BTreeMap, HashSet};

use shared_types::{NodeId, ROOT_NODE};

use crate::domain::Topology;
use crate::errors::TopologyError;

/// Depth of every node reachable from the root.
///
/// Nodes the traversal never reached are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeDepth {
    depths: BTreeMap<NodeId, u32>,
}

impl NodeDepth {
    /// Depth of `node`, if it was reached.
    pub fn get(&self, node: NodeId) -> Option<u32> {
        self.depths.get(&node).copied()
    }

    /// Deepest reached node's depth (0 for an empty map).
    pub fn max_depth(&self) -> u32 {
        self.depths.values().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Iterate `(node, depth)` in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.depths.iter().map(|(node, depth)| (*node, *depth))
    }

    /// Fails with the lowest node id the traversal did not reach.
    pub fn ensure_complete(&self, topology: &Topology) -> Result<(), TopologyError> {
        match topology.node_ids().find(|id| !self.depths.contains_key(id)) {
            Some(missing) => Err(TopologyError::Unreachable(missing)),
            None => Ok(()),
        }
    }
}

impl FromIterator<(NodeId, u32)> for NodeDepth {
    fn from_iter<I: IntoIterator<Item = (NodeId, u32)>>(iter: I) -> Self {
        Self {
            depths: iter.into_iter().collect(),
        }
    }
}

/// Compute every reachable node's depth from [`ROOT_NODE`].
///
/// Pre-order DFS: a node receives `parent_depth + 1` on its first visit and
/// neighbors are explored in listed order. On graphs with cycles the first
/// visit wins, so the result depends on neighbor order (a ring `0→1→2→3→0`
/// yields depths `0,1,2,3`).
///
/// The traversal uses an explicit stack; neighbors are pushed in reverse so
/// they are popped in listed order, which matches the recursive formulation.
pub fn compute_depths(topology: &Topology) -> NodeDepth {
    let mut depths = BTreeMap::new();
    if !topology.contains(ROOT_NODE) {
        return NodeDepth { depths };
    }

    let mut visited: HashSet<NodeId> = HashSet::with_capacity(topology.node_count());
    let mut stack: Vec<(NodeId, u32)> = vec![(ROOT_NODE, 0)];

    while let Some((node, depth)) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        depths.insert(node, depth);

        for neighbor in topology.neighbors(node).iter().rev() {
            if !visited.contains(neighbor) {
                stack.push((*neighbor, depth + 1));
            }
        }
    }

    tracing::debug!(
        reached = depths.len(),
        nodes = topology.node_count(),
        "Node depths computed"
    );

    NodeDepth { depths }
}
