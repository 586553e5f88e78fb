//! Structural network metrics logged while randomising.
//!
//! The s-metric and the degree assortativity coefficient give a quick
//! read on how much second-order structure a replica retained; the
//! orchestrator emits them at debug level for every replica.

use crate::graph::Graph;

/// The s-metric: the sum over all links of the product of the endpoint
/// degrees.
#[must_use]
pub fn s_metric(graph: &Graph) -> u64 {
    graph
        .links()
        .map(|(u, v, _)| (graph.degree(u) * graph.degree(v)) as u64)
        .sum()
}

/// Pearson degree assortativity of the network, or `None` for a graph
/// without links.
#[must_use]
pub fn assortativity(graph: &Graph) -> Option<f64> {
    if graph.link_count() == 0 {
        return None;
    }
    let inv_links = 1.0 / graph.link_count() as f64;
    let (mut product, mut half_sum, mut half_squares) = (0.0, 0.0, 0.0);
    for (u, v, _) in graph.links() {
        let d1 = graph.degree(u) as f64;
        let d2 = graph.degree(v) as f64;
        product += d1 * d2;
        half_sum += 0.5 * (d1 + d2);
        half_squares += 0.5 * (d1 * d1 + d2 * d2);
    }
    let mean_sq = (inv_links * half_sum).powi(2);
    let denominator = inv_links * half_squares - mean_sq;
    if denominator == 0.0 {
        return None;
    }
    Some((inv_links * product - mean_sq) / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(leaves: usize) -> Graph {
        let mut graph = Graph::new();
        let hub = graph.add_node("HUB").expect("fresh label");
        for i in 0..leaves {
            let leaf = graph.add_node(format!("L{i}")).expect("fresh label");
            graph.add_link(hub, leaf, 1.0).expect("distinct nodes");
        }
        graph
    }

    #[test]
    fn s_metric_of_a_star_is_degree_times_links() {
        // Every link joins the hub (degree 5) to a leaf (degree 1).
        assert_eq!(s_metric(&star(5)), 25);
    }

    #[test]
    fn a_star_is_perfectly_disassortative() {
        let r = assortativity(&star(5)).expect("graph has links");
        assert!((r - -1.0).abs() < 1e-12);
    }

    #[test]
    fn metrics_handle_the_empty_graph() {
        let graph = Graph::new();
        assert_eq!(s_metric(&graph), 0);
        assert_eq!(assortativity(&graph), None);
    }

    #[test]
    fn regular_graphs_have_no_defined_assortativity() {
        // A triangle is 2-regular: zero degree variance.
        let mut graph = Graph::new();
        let a = graph.add_node("A").expect("fresh label");
        let b = graph.add_node("B").expect("fresh label");
        let c = graph.add_node("C").expect("fresh label");
        graph.add_link(a, b, 1.0).expect("distinct nodes");
        graph.add_link(b, c, 1.0).expect("distinct nodes");
        graph.add_link(a, c, 1.0).expect("distinct nodes");
        assert_eq!(assortativity(&graph), None);
    }
}
