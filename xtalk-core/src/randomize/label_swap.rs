//! Label permutation: swap node labels within degree bins.

use rand::{Rng, rngs::SmallRng, seq::SliceRandom};

use crate::degree::{DegreeProfile, degree_bin};
use crate::graph::{Graph, NodeId};

/// Permutes node labels within degree bins, leaving the topology exactly
/// as it is. Each node, visited in a shuffled order, trades labels with a
/// uniformly drawn member of its own bin; a node may draw itself, so the
/// permutation is not guaranteed to be a derangement.
pub(crate) fn permute(replica: &mut Graph, profile: &DegreeProfile, rng: &mut SmallRng) {
    let mut order: Vec<NodeId> = replica.node_ids().collect();
    order.shuffle(rng);

    for node in order {
        let members = profile.bin_members(degree_bin(replica.degree(node)));
        debug_assert!(!members.is_empty(), "a node's own bin cannot be empty");
        let partner = members[rng.gen_range(0..members.len())];
        replica.swap_labels(node, partner);
    }
}
