//! Degree binning and the degree profile shared by the null-model
//! generators.
//!
//! Degrees are quantised into logarithmic bins, `b(d) = round(ln(d) + 1)`.
//! The coarsening is deliberate: it keeps the second-order generator's
//! candidate pools non-empty on sparse networks, and published results
//! depend on this exact quantisation.

use std::collections::BTreeMap;

use crate::graph::{Graph, NodeId};

/// Quantises a node degree into its logarithmic bin.
///
/// Defined for `degree >= 1`; isolated nodes fall into a sentinel bin 0,
/// which never mixes with connected nodes because `b(1) = 1`.
///
/// # Examples
/// ```
/// use xtalk_core::degree_bin;
///
/// assert_eq!(degree_bin(1), 1);
/// assert_eq!(degree_bin(4), 2);
/// assert_eq!(degree_bin(90), 5);
/// ```
#[must_use]
pub fn degree_bin(degree: usize) -> i32 {
    if degree == 0 {
        return 0;
    }
    ((degree as f64).ln() + 1.0).round() as i32
}

/// Degree information derived once from the original network and reused
/// across every replica.
///
/// Holds the per-bin node lists consulted by the label-permutation and
/// second-order generators, and the per-node cache of neighbour degree
/// bins (the multiset of `b(degree(u))` over each node's neighbours).
/// Replicas share the original's node set, so the profile never needs to
/// be copied onto them.
#[derive(Clone, Debug)]
pub struct DegreeProfile {
    bins: BTreeMap<i32, Vec<NodeId>>,
    neighbour_bins: Vec<Vec<i32>>,
}

impl DegreeProfile {
    /// Builds the profile for `graph`.
    #[must_use]
    pub fn build(graph: &Graph) -> Self {
        let mut bins: BTreeMap<i32, Vec<NodeId>> = BTreeMap::new();
        let mut neighbour_bins = Vec::with_capacity(graph.node_count());
        for node in graph.node_ids() {
            bins.entry(degree_bin(graph.degree(node)))
                .or_default()
                .push(node);
            neighbour_bins.push(
                graph
                    .neighbours(node)
                    .map(|neighbour| degree_bin(graph.degree(neighbour)))
                    .collect(),
            );
        }
        Self {
            bins,
            neighbour_bins,
        }
    }

    /// Nodes whose degree falls into `bin`, in node order.
    #[must_use]
    pub fn bin_members(&self, bin: i32) -> &[NodeId] {
        self.bins.get(&bin).map_or(&[], Vec::as_slice)
    }

    /// The cached neighbour degree bins of `node`, in neighbour order.
    #[must_use]
    pub fn neighbour_bins(&self, node: NodeId) -> &[i32] {
        &self.neighbour_bins[node.index()]
    }

    /// Iterates `(bin, members)` pairs in ascending bin order.
    pub fn bins(&self) -> impl Iterator<Item = (i32, &[NodeId])> + '_ {
        self.bins.iter().map(|(&bin, members)| (bin, members.as_slice()))
    }
}
