//! Criterion benchmarks for the null-model generators.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use xtalk_core::{DegreeProfile, Graph, Method, NodeId, generate};

fn scale_free(nodes: usize, links_per_node: usize, rng: &mut SmallRng) -> Graph {
    let mut graph = Graph::with_capacity(nodes);
    let mut endpoints: Vec<NodeId> = Vec::new();
    let seed_nodes = links_per_node + 1;
    let ids: Vec<NodeId> = (0..nodes)
        .map(|i| graph.add_node(format!("N{i}")).expect("fresh label"))
        .collect();
    for i in 0..seed_nodes {
        for j in 0..i {
            graph.add_link(ids[i], ids[j], 1.0).expect("distinct nodes");
            endpoints.push(ids[i]);
            endpoints.push(ids[j]);
        }
    }
    for &node in ids.iter().skip(seed_nodes) {
        let mut placed = 0;
        while placed < links_per_node {
            let target = endpoints[rng.gen_range(0..endpoints.len())];
            if target == node || graph.has_link(node, target) {
                continue;
            }
            graph.add_link(node, target, 1.0).expect("distinct nodes");
            endpoints.push(node);
            endpoints.push(target);
            placed += 1;
        }
    }
    graph
}

fn bench_generators(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(17);
    let original = scale_free(500, 2, &mut rng);
    let profile = DegreeProfile::build(&original);

    let mut group = c.benchmark_group("generate");
    for method in [
        Method::LinkPermutation,
        Method::LinkAssignment,
        Method::AssignmentSecondOrder,
        Method::LabelPermutation,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(method.label()),
            &method,
            |b, &method| {
                let mut replica = original.clone();
                let mut rng = SmallRng::seed_from_u64(23);
                b.iter(|| {
                    replica.reset_from(&original);
                    generate(method, &original, &mut replica, &profile, &mut rng)
                        .expect("labels always match")
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_generators);
criterion_main!(benches);
