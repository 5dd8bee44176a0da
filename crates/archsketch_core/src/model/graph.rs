//! Node/edge array helpers shared by the store, canvas and panels.
//!
//! # Invariants
//! - Removing a node always removes every edge that touches it.
//! - Coercion keeps the first occurrence of a duplicated id and drops edges
//!   whose endpoints do not resolve.

use crate::model::edge::Edge;
use crate::model::node::Node;
use std::collections::HashSet;

/// Counts of entries dropped while coercing an untrusted graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphRepair {
    pub duplicate_nodes: usize,
    pub duplicate_edges: usize,
    pub dangling_edges: usize,
}

impl GraphRepair {
    pub fn is_clean(&self) -> bool {
        self.duplicate_nodes == 0 && self.duplicate_edges == 0 && self.dangling_edges == 0
    }
}

/// Removes `node_id` and every edge referencing it.
///
/// Returns the removed node, or `None` (and leaves both arrays untouched)
/// when no node has that id.
pub fn remove_node_cascade(
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
    node_id: &str,
) -> Option<Node> {
    let index = nodes.iter().position(|node| node.id == node_id)?;
    let removed = nodes.remove(index);
    edges.retain(|edge| !edge.touches(node_id));
    Some(removed)
}

/// Drops duplicate ids and dangling edges in place.
pub fn coerce_graph(nodes: &mut Vec<Node>, edges: &mut Vec<Edge>) -> GraphRepair {
    let mut repair = GraphRepair::default();

    let mut seen_nodes = HashSet::new();
    nodes.retain(|node| {
        let keep = seen_nodes.insert(node.id.clone());
        if !keep {
            repair.duplicate_nodes += 1;
        }
        keep
    });

    let mut seen_edges = HashSet::new();
    edges.retain(|edge| {
        if !seen_edges.insert(edge.id.clone()) {
            repair.duplicate_edges += 1;
            return false;
        }
        if !seen_nodes.contains(&edge.source) || !seen_nodes.contains(&edge.target) {
            repair.dangling_edges += 1;
            return false;
        }
        true
    });

    repair
}
