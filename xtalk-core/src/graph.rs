//! Undirected simple graph container for interaction networks.
//!
//! Nodes carry a unique string label and edges carry a real weight. The
//! adjacency of each node is kept in a `BTreeMap`, which gives
//! O(log deg) edge-existence tests and, just as importantly, a
//! deterministic neighbour and edge iteration order: replica generation
//! draws indices from a seeded PRNG, so any nondeterministic traversal
//! would break run-to-run reproducibility.

use std::collections::{BTreeMap, HashMap};

use crate::error::GraphError;

/// Opaque handle to a node inside a [`Graph`].
///
/// Handles are dense indices assigned in insertion order. They are only
/// meaningful for the graph that issued them (or a replica sharing its
/// node set).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the dense index backing this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct NodeRecord {
    label: String,
    adjacency: BTreeMap<NodeId, f64>,
}

/// Undirected simple graph with labelled nodes and weighted links.
///
/// Invariants: labels are unique, there are no self-loops and no parallel
/// links, and `has_link(u, v) == has_link(v, u)` always holds.
///
/// # Examples
/// ```
/// use xtalk_core::Graph;
///
/// let mut graph = Graph::new();
/// let a = graph.add_node("TP53").expect("fresh label");
/// let b = graph.add_node("MDM2").expect("fresh label");
/// assert!(graph.add_link(a, b, 0.9).expect("no self-loop"));
/// assert!(graph.has_link(b, a));
/// assert_eq!(graph.degree(a), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<NodeRecord>,
    by_label: HashMap<String, NodeId>,
    links: usize,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with room for `nodes` nodes.
    #[must_use]
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            by_label: HashMap::with_capacity(nodes),
            links: 0,
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links
    }

    /// Iterates node handles in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Adds a node with the given label.
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateLabel`] when the label is already
    /// present.
    pub fn add_node(&mut self, label: impl Into<String>) -> Result<NodeId, GraphError> {
        let label = label.into();
        if self.by_label.contains_key(&label) {
            return Err(GraphError::DuplicateLabel { label });
        }
        let id = NodeId(self.nodes.len());
        self.by_label.insert(label.clone(), id);
        self.nodes.push(NodeRecord {
            label,
            adjacency: BTreeMap::new(),
        });
        Ok(id)
    }

    /// Returns the label of `node`.
    #[must_use]
    pub fn label(&self, node: NodeId) -> &str {
        &self.nodes[node.0].label
    }

    /// Looks a node up by label.
    #[must_use]
    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    /// Number of distinct neighbours of `node`.
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.nodes[node.0].adjacency.len()
    }

    /// Iterates the neighbours of `node` in ascending handle order.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node.0].adjacency.keys().copied()
    }

    /// Tests whether an undirected link between `u` and `v` exists.
    #[must_use]
    pub fn has_link(&self, u: NodeId, v: NodeId) -> bool {
        self.nodes[u.0].adjacency.contains_key(&v)
    }

    /// Adds an undirected link of the given weight.
    ///
    /// Adding a link that already exists is a no-op reported as
    /// `Ok(false)`.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] when `u == v`.
    pub fn add_link(&mut self, u: NodeId, v: NodeId, weight: f64) -> Result<bool, GraphError> {
        if u == v {
            return Err(GraphError::SelfLoop {
                label: self.nodes[u.0].label.clone(),
            });
        }
        if self.has_link(u, v) {
            return Ok(false);
        }
        self.nodes[u.0].adjacency.insert(v, weight);
        self.nodes[v.0].adjacency.insert(u, weight);
        self.links += 1;
        Ok(true)
    }

    /// Removes the link between `u` and `v`, reporting whether it existed.
    pub fn remove_link(&mut self, u: NodeId, v: NodeId) -> bool {
        if self.nodes[u.0].adjacency.remove(&v).is_none() {
            return false;
        }
        self.nodes[v.0].adjacency.remove(&u);
        self.links -= 1;
        true
    }

    /// Removes every link while keeping the node set intact.
    pub fn clear_links(&mut self) {
        for record in &mut self.nodes {
            record.adjacency.clear();
        }
        self.links = 0;
    }

    /// Iterates each undirected link exactly once as `(u, v, weight)` with
    /// `u < v`, in deterministic handle order.
    pub fn links(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.nodes.iter().enumerate().flat_map(|(index, record)| {
            let u = NodeId(index);
            record
                .adjacency
                .range(NodeId(index + 1)..)
                .map(move |(&v, &weight)| (u, v, weight))
        })
    }

    /// Swaps the labels of two nodes, keeping the label index coherent.
    pub fn swap_labels(&mut self, u: NodeId, v: NodeId) {
        if u == v {
            return;
        }
        let (lo, hi) = if u.0 < v.0 { (u.0, v.0) } else { (v.0, u.0) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        std::mem::swap(&mut head[lo].label, &mut tail[0].label);
        self.by_label.insert(self.nodes[u.0].label.clone(), u);
        self.by_label.insert(self.nodes[v.0].label.clone(), v);
    }

    /// Overwrites this graph with a deep copy of `other`, reusing
    /// allocations where possible. Replica graphs are reset through this
    /// between iterations.
    pub fn reset_from(&mut self, other: &Graph) {
        self.nodes.clone_from(&other.nodes);
        self.by_label.clone_from(&other.by_label);
        self.links = other.links;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphErrorCode;

    fn triangle() -> (Graph, NodeId, NodeId, NodeId) {
        let mut graph = Graph::new();
        let a = graph.add_node("A").expect("fresh label");
        let b = graph.add_node("B").expect("fresh label");
        let c = graph.add_node("C").expect("fresh label");
        graph.add_link(a, b, 1.0).expect("distinct nodes");
        graph.add_link(b, c, 1.0).expect("distinct nodes");
        graph.add_link(a, c, 1.0).expect("distinct nodes");
        (graph, a, b, c)
    }

    #[test]
    fn links_are_symmetric_and_counted_once() {
        let (graph, a, b, c) = triangle();
        assert!(graph.has_link(a, b) && graph.has_link(b, a));
        assert_eq!(graph.link_count(), 3);
        let listed: Vec<_> = graph.links().map(|(u, v, _)| (u, v)).collect();
        assert_eq!(listed, vec![(a, b), (a, c), (b, c)]);
    }

    #[test]
    fn duplicate_link_is_a_no_op() {
        let (mut graph, a, b, _) = triangle();
        assert!(!graph.add_link(a, b, 5.0).expect("distinct nodes"));
        assert_eq!(graph.link_count(), 3);
    }

    #[test]
    fn self_loop_is_rejected() {
        let (mut graph, a, _, _) = triangle();
        let err = graph.add_link(a, a, 1.0).expect_err("self-loop");
        assert_eq!(err.code(), GraphErrorCode::SelfLoop);
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let (mut graph, _, _, _) = triangle();
        let err = graph.add_node("A").expect_err("duplicate");
        assert_eq!(err.code(), GraphErrorCode::DuplicateLabel);
    }

    #[test]
    fn remove_link_updates_both_endpoints() {
        let (mut graph, a, b, _) = triangle();
        assert!(graph.remove_link(a, b));
        assert!(!graph.has_link(b, a));
        assert!(!graph.remove_link(a, b));
        assert_eq!(graph.link_count(), 2);
    }

    #[test]
    fn swap_labels_keeps_lookup_coherent() {
        let (mut graph, a, b, _) = triangle();
        graph.swap_labels(a, b);
        assert_eq!(graph.label(a), "B");
        assert_eq!(graph.node_by_label("A"), Some(b));
        assert_eq!(graph.node_by_label("B"), Some(a));
    }

    #[test]
    fn reset_from_restores_links_and_labels() {
        let (original, a, b, _) = triangle();
        let mut replica = original.clone();
        replica.clear_links();
        replica.swap_labels(a, b);
        replica.reset_from(&original);
        assert_eq!(replica.link_count(), 3);
        assert_eq!(replica.label(a), "A");
        assert!(replica.has_link(a, b));
    }

    #[test]
    fn clear_links_keeps_nodes() {
        let (mut graph, a, _, _) = triangle();
        graph.clear_links();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.degree(a), 0);
    }
}
