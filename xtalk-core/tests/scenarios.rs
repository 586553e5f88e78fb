//! End-to-end scenarios running the full randomise-count-aggregate loop
//! on small, hand-checkable networks.

use std::collections::BTreeSet;

use xtalk_core::{AnalysisBuilder, GeneGroup, Graph, GroupSet, Method, PairKind};

fn graph_of(links: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::new();
    for &(u, v) in links {
        let u = match graph.node_by_label(u) {
            Some(node) => node,
            None => graph.add_node(u).expect("fresh label"),
        };
        let v = match graph.node_by_label(v) {
            Some(node) => node,
            None => graph.add_node(v).expect("fresh label"),
        };
        graph.add_link(u, v, 1.0).expect("distinct nodes");
    }
    graph
}

fn set_of(groups: &[(&str, &[&str])]) -> GroupSet {
    let mut universe = BTreeSet::new();
    let built = groups
        .iter()
        .map(|&(id, members)| {
            let mut group = GeneGroup::new(id, "SYS", "hsa", "", "test");
            for &member in members {
                universe.insert(member.to_owned());
                group.push_member(member);
            }
            group
        })
        .collect();
    GroupSet::from_groups(built, universe, 0, 1).expect("non-empty")
}

#[test]
fn triangle_with_self_overlapping_groups_under_label_permutation() {
    // K3 is invariant under any relabelling, so the null equals the
    // observation exactly and every statistic collapses to NA.
    let network = graph_of(&[("A", "B"), ("B", "C"), ("A", "C")]);
    let groups = set_of(&[("G1", &["A", "B"]), ("G2", &["B", "C"])]);

    let analysis = AnalysisBuilder::new()
        .with_method(Method::LabelPermutation)
        .with_iterations(10)
        .with_seed(42)
        .build()
        .expect("valid configuration");
    let report = analysis
        .run_all_pairs(&network, &groups)
        .expect("analysis runs");

    assert_eq!(report.replicas_counted, 10);
    assert_eq!(report.replicas_discarded, 0);
    assert_eq!(report.rows.len(), 3);

    let intra_g1 = &report.rows[0];
    assert_eq!(intra_g1.pair, "G1_vs_G1");
    assert_eq!(intra_g1.kind, PairKind::Intra);
    assert_eq!(intra_g1.stats.observed, 1.0);
    assert_eq!(intra_g1.stats.expected, 1.0);

    let intra_g2 = &report.rows[1];
    assert_eq!(intra_g2.pair, "G2_vs_G2");
    assert_eq!(intra_g2.stats.observed, 1.0);
    assert_eq!(intra_g2.stats.expected, 1.0);

    // B sits in both groups, so only the A-C link crosses under mode 0.
    let inter = &report.rows[2];
    assert_eq!(inter.pair, "G2_vs_G1");
    assert_eq!(inter.kind, PairKind::Inter);
    assert_eq!(inter.stats.observed, 1.0);
    assert_eq!(inter.stats.expected, 1.0);

    for row in &report.rows {
        assert_eq!(row.stats.std_dev, None, "zero variance renders as NA");
        assert_eq!(row.stats.z_score, None);
        assert_eq!(row.stats.p_value, None);
        assert_eq!(row.stats.fdr, None);
        assert_eq!(row.stats.chi_sqr, None);
    }
}

#[test]
fn star_with_leaf_group_has_an_undefined_null_under_second_order() {
    // Leaves can only draw the hub as a bin-matched neighbour, so every
    // second-order replica is the star again: intra count stays 0.
    let network = graph_of(&[
        ("HUB", "L1"),
        ("HUB", "L2"),
        ("HUB", "L3"),
        ("HUB", "L4"),
        ("HUB", "L5"),
    ]);
    let groups = set_of(&[("LEAVES", &["L1", "L2", "L3", "L4", "L5"])]);

    let analysis = AnalysisBuilder::new()
        .with_method(Method::AssignmentSecondOrder)
        .with_iterations(20)
        .with_seed(7)
        .build()
        .expect("valid configuration");
    let report = analysis
        .run_all_pairs(&network, &groups)
        .expect("analysis runs");

    assert_eq!(report.replicas_counted, 20);
    let row = &report.rows[0];
    assert_eq!(row.stats.observed, 0.0);
    assert_eq!(row.stats.expected, 0.0);
    assert_eq!(row.stats.std_dev, None);
    assert_eq!(row.stats.p_value, None);
}

#[test]
fn bipartite_k22_between_two_files() {
    let network = graph_of(&[("A1", "B1"), ("A1", "B2"), ("A2", "B1"), ("A2", "B2")]);
    let left = set_of(&[("GA", &["A1", "A2"])]);
    let right = set_of(&[("GB", &["B1", "B2"])]);

    let analysis = AnalysisBuilder::new()
        .with_method(Method::LinkAssignment)
        .with_iterations(100)
        .with_seed(99)
        .build()
        .expect("valid configuration");
    let report = analysis
        .run_between(&network, &left, &right)
        .expect("analysis runs");

    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.pair, "GA_vs_GB");
    assert_eq!(row.kind, PairKind::Inter);
    assert_eq!(row.stats.observed, 4.0);
    // Degree conservation bounds the replica cross counts: each of the
    // four degree-2 nodes contributes at most its full degree.
    assert!(row.stats.expected <= 4.0);
    assert!(row.stats.expected > 0.0);
    if row.stats.std_dev.is_none() {
        assert_eq!(row.stats.p_value, None);
        assert_eq!(row.stats.fdr, None);
    }
}

#[test]
fn networks_without_links_report_na_everywhere() {
    let mut network = Graph::new();
    for label in ["A", "B", "C"] {
        network.add_node(label).expect("fresh label");
    }
    let groups = set_of(&[("G1", &["A", "B"]), ("G2", &["B", "C"])]);

    for method in [
        Method::LinkPermutation,
        Method::LinkAssignment,
        Method::AssignmentSecondOrder,
        Method::LabelPermutation,
    ] {
        let analysis = AnalysisBuilder::new()
            .with_method(method)
            .with_iterations(5)
            .with_seed(11)
            .build()
            .expect("valid configuration");
        let report = analysis
            .run_all_pairs(&network, &groups)
            .expect("an edgeless network is not an error");
        for row in &report.rows {
            assert_eq!(row.stats.observed, 0.0);
            assert_eq!(row.stats.expected, 0.0);
            assert_eq!(row.stats.std_dev, None);
            assert_eq!(row.stats.p_value, None);
        }
    }
}

#[test]
fn fixed_seeds_reproduce_full_reports() {
    let network = graph_of(&[
        ("A", "B"),
        ("B", "C"),
        ("C", "D"),
        ("D", "E"),
        ("E", "A"),
        ("A", "C"),
        ("B", "D"),
    ]);
    let groups = set_of(&[("G1", &["A", "B", "C"]), ("G2", &["C", "D", "E"])]);

    let run = || {
        AnalysisBuilder::new()
            .with_method(Method::LinkPermutation)
            .with_iterations(25)
            .with_seed(2024)
            .build()
            .expect("valid configuration")
            .run_all_pairs(&network, &groups)
            .expect("analysis runs")
    };
    let first = run();
    let second = run();
    for (a, b) in first.rows.iter().zip(second.rows.iter()) {
        assert_eq!(a.pair, b.pair);
        assert_eq!(a.stats, b.stats);
    }
}

#[test]
fn hypergeometric_overlap_is_reported_when_requested() {
    let network = graph_of(&[("A", "B"), ("B", "C"), ("C", "D")]);
    let groups = set_of(&[("G1", &["A", "B", "C"]), ("G2", &["B", "C", "D"])]);

    let analysis = AnalysisBuilder::new()
        .with_method(Method::LabelPermutation)
        .with_iterations(5)
        .with_seed(5)
        .with_hypergeometric(true)
        .build()
        .expect("valid configuration");
    let report = analysis
        .run_all_pairs(&network, &groups)
        .expect("analysis runs");

    for row in &report.rows {
        let p_hyper = row.stats.p_hyper.expect("requested for every pair");
        assert!((0.0..=1.0).contains(&p_hyper));
    }
    // G1 and G2 share 2 of their 3 members out of a 4-gene universe:
    // C(3,2) * C(1,1) / C(4,3) = 3/4.
    let inter = report
        .rows
        .iter()
        .find(|row| row.kind == PairKind::Inter)
        .expect("one inter pair");
    let p_hyper = inter.stats.p_hyper.expect("present");
    assert!((p_hyper - 0.75).abs() < 1e-9);
}
