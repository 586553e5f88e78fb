//! Link assignment: rebuild the link set from scratch while conserving
//! the degree sequence.
//!
//! Both assignment variants share this skeleton and differ only in the
//! candidate pool offered for each needed neighbour: the first-order
//! variant draws from the whole residual working set, the second-order
//! variant from the members of the next unconsumed cached neighbour
//! degree bin of the node being wired.

use rand::{Rng, rngs::SmallRng, seq::SliceRandom};

use crate::degree::DegreeProfile;
use crate::error::GraphError;
use crate::graph::{Graph, NodeId};

/// Clears the replica's links and reassigns them node by node.
///
/// Nodes are shuffled into a residual order and walked front to back.
/// For each needed neighbour a candidate is drawn uniformly from the
/// pool; candidates that are the node itself, already adjacent, or
/// saturated are dropped from the pool and redrawn. When a pool runs dry
/// the node keeps its residual deficit for the repair pass. Whenever an
/// endpoint saturates it leaves the working set and the walk restarts
/// from the front of the residual order.
pub(crate) fn assign(
    original: &Graph,
    replica: &mut Graph,
    profile: &DegreeProfile,
    second_order: bool,
    rng: &mut SmallRng,
) -> Result<(), GraphError> {
    let targets: Vec<usize> = original.node_ids().map(|node| original.degree(node)).collect();
    let mut working: Vec<NodeId> = replica.node_ids().collect();
    working.shuffle(rng);
    replica.clear_links();

    'walk: loop {
        let mut index = 0;
        'nodes: while index < working.len() {
            let node = working[index];
            let target = targets[node.index()];
            let needed = target.saturating_sub(replica.degree(node));
            if needed == 0 {
                working.remove(index);
                continue 'nodes;
            }

            // First-order pools persist across this node's slots so that
            // rejected candidates stay rejected; second-order pools are
            // rebuilt per slot from the next cached neighbour bin.
            let mut marginal_pool: Option<Vec<NodeId>> = None;
            for _ in 0..needed {
                let mut bin_pool;
                let pool: &mut Vec<NodeId> = if second_order {
                    let bin = profile.neighbour_bins(node)[replica.degree(node)];
                    bin_pool = profile.bin_members(bin).to_vec();
                    &mut bin_pool
                } else {
                    marginal_pool.get_or_insert_with(|| working.clone())
                };

                let candidate = loop {
                    if pool.is_empty() {
                        break None;
                    }
                    let pick = pool.swap_remove(rng.gen_range(0..pool.len()));
                    if pick == node
                        || replica.degree(pick) >= targets[pick.index()]
                        || replica.has_link(node, pick)
                    {
                        continue;
                    }
                    break Some(pick);
                };
                let Some(candidate) = candidate else {
                    index += 1;
                    continue 'nodes;
                };

                replica.add_link(node, candidate, 1.0)?;

                let mut shrunk = false;
                if replica.degree(candidate) == targets[candidate.index()] {
                    drop_node(&mut working, candidate);
                    shrunk = true;
                }
                if replica.degree(node) == target {
                    drop_node(&mut working, node);
                    shrunk = true;
                }
                if shrunk {
                    continue 'walk;
                }
            }
            index += 1;
        }
        break;
    }

    Ok(())
}

fn drop_node(working: &mut Vec<NodeId>, node: NodeId) {
    if let Some(position) = working.iter().position(|&entry| entry == node) {
        working.remove(position);
    }
}
