//! # Topology Entity
//!
//! An adjacency mapping from node id to an ordered list of neighbor ids.
//!
//! ## Presets
//!
//! ```text
//! tree()                ring(4)              fully_connected(4)
//!
//!        0              0 → 1                 0 ─ 1
//!      / | \            ↑   ↓                 │ ╳ │
//!     1  2  3           3 ← 2                 3 ─ 2
//!    / \
//!   4   5
//! ```

use std::collections::BTreeMap;

use shared_types::NodeId;

use crate::errors::TopologyError;

/// Static graph a run floods over.
///
/// Invariants (checked on construction):
/// - node ids are exactly `0..N-1`
/// - every listed neighbor is a node of the topology
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    adjacency: BTreeMap<NodeId, Vec<NodeId>>,
}

impl Topology {
    /// Build a topology from an adjacency mapping.
    pub fn from_adjacency(adjacency: BTreeMap<NodeId, Vec<NodeId>>) -> Result<Self, TopologyError> {
        if adjacency.is_empty() {
            return Err(TopologyError::Empty);
        }

        let expected = adjacency.len();
        for (index, id) in adjacency.keys().enumerate() {
            let index = index as NodeId;
            if *id != index {
                return Err(TopologyError::NonContiguous {
                    expected,
                    missing: index,
                });
            }
        }

        for (node, neighbors) in &adjacency {
            if let Some(neighbor) = neighbors.iter().find(|n| !adjacency.contains_key(n)) {
                return Err(TopologyError::UnknownNeighbor {
                    node: *node,
                    neighbor: *neighbor,
                });
            }
        }

        Ok(Self { adjacency })
    }

    /// Build a topology from `(node, neighbors)` pairs.
    pub fn from_pairs<I, N>(pairs: I) -> Result<Self, TopologyError>
    where
        I: IntoIterator<Item = (NodeId, N)>,
        N: IntoIterator<Item = NodeId>,
    {
        let adjacency = pairs
            .into_iter()
            .map(|(node, neighbors)| (node, neighbors.into_iter().collect()))
            .collect();
        Self::from_adjacency(adjacency)
    }

    /// Parse an adjacency mapping such as `{"0": [1, 2], "1": [], "2": []}`.
    pub fn from_json(document: &str) -> Result<Self, TopologyError> {
        let adjacency: BTreeMap<NodeId, Vec<NodeId>> =
            serde_json::from_str(document).map_err(|e| TopologyError::Parse(e.to_string()))?;
        Self::from_adjacency(adjacency)
    }

    /// The reference tree: `{0:[1,2,3], 1:[4,5], 2:[], 3:[], 4:[], 5:[]}`.
    pub fn tree() -> Self {
        Self {
            adjacency: BTreeMap::from([
                (0, vec![1, 2, 3]),
                (1, vec![4, 5]),
                (2, vec![]),
                (3, vec![]),
                (4, vec![]),
                (5, vec![]),
            ]),
        }
    }

    /// Directed ring `0 → 1 → … → n-1 → 0`.
    pub fn ring(nodes: usize) -> Result<Self, TopologyError> {
        if nodes < 2 {
            return Err(TopologyError::TooSmall { min: 2, got: nodes });
        }
        let n = nodes as NodeId;
        Self::from_pairs((0..n).map(|id| (id, vec![(id + 1) % n])))
    }

    /// Every node lists every other node, in ascending order.
    pub fn fully_connected(nodes: usize) -> Result<Self, TopologyError> {
        if nodes < 2 {
            return Err(TopologyError::TooSmall { min: 2, got: nodes });
        }
        let n = nodes as NodeId;
        Self::from_pairs((0..n).map(|id| (id, (0..n).filter(move |other| *other != id))))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Neighbors of `node`, in listed order. Empty for unknown nodes.
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `node` is part of the topology.
    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Iterate `(node, neighbors)` in ascending node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[NodeId])> + '_ {
        self.adjacency.iter().map(|(id, n)| (*id, n.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_preset() {
        let tree = Topology::tree();
        assert_eq!(tree.node_count(), 6);
        assert_eq!(tree.neighbors(0), &[1, 2, 3]);
        assert_eq!(tree.neighbors(1), &[4, 5]);
        assert!(tree.neighbors(5).is_empty());
        assert_eq!(tree.edge_count(), 5);
    }

    #[test]
    fn test_ring_preset() {
        let ring = Topology::ring(4).unwrap();
        assert_eq!(ring.neighbors(3), &[0]);
        assert_eq!(ring.edge_count(), 4);
        assert_eq!(
            Topology::ring(1),
            Err(TopologyError::TooSmall { min: 2, got: 1 })
        );
    }

    #[test]
    fn test_fully_connected_preset() {
        let full = Topology::fully_connected(4).unwrap();
        assert_eq!(full.neighbors(0), &[1, 2, 3]);
        assert_eq!(full.neighbors(2), &[0, 1, 3]);
        assert_eq!(full.edge_count(), 12);
    }

    #[test]
    fn test_rejects_non_contiguous_ids() {
        let result = Topology::from_pairs(vec![(0, vec![2]), (2, vec![])]);
        assert_eq!(
            result,
            Err(TopologyError::NonContiguous {
                expected: 2,
                missing: 1
            })
        );
    }

    #[test]
    fn test_rejects_unknown_neighbor() {
        let result = Topology::from_pairs(vec![(0, vec![1]), (1, vec![7])]);
        assert_eq!(
            result,
            Err(TopologyError::UnknownNeighbor {
                node: 1,
                neighbor: 7
            })
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            Topology::from_adjacency(BTreeMap::new()),
            Err(TopologyError::Empty)
        );
    }

    #[test]
    fn test_from_json() {
        let topology = Topology::from_json(r#"{"0": [1, 2], "1": [], "2": [0]}"#).unwrap();
        assert_eq!(topology.node_count(), 3);
        assert_eq!(topology.neighbors(2), &[0]);
        assert_eq!(topology.edge_count(), 3);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            Topology::from_json("[1, 2, 3]"),
            Err(TopologyError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_node_has_no_neighbors() {
        assert!(Topology::tree().neighbors(42).is_empty());
        assert!(!Topology::tree().contains(42));
    }
}
