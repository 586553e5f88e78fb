//! Link permutation: degree-preserving double-edge swaps.

use std::collections::HashSet;

use rand::{Rng, rngs::SmallRng};

use crate::error::GraphError;
use crate::graph::{Graph, NodeId};

/// Rewires the replica with double-edge swaps over a snapshot of its link
/// list, returning the number of links moved (2 x successful swaps).
///
/// Two links `(a, b)` and `(c, d)` are swappable when the four endpoints
/// are distinct and at least one rewiring introduces no parallel link;
/// the uncrossed rewiring `(a, c) + (b, d)` is preferred. Both links
/// leave the working list after a swap. Index pairs that fail are
/// memoised, and the walk stops once as many distinct pairs have failed
/// as there are links left, or fewer than two links remain.
pub(crate) fn permute(replica: &mut Graph, rng: &mut SmallRng) -> Result<usize, GraphError> {
    let mut links: Vec<(NodeId, NodeId)> = replica.links().map(|(u, v, _)| (u, v)).collect();
    let mut tried: HashSet<(usize, usize)> = HashSet::new();
    let mut swaps = 0_usize;

    while links.len() >= 2 && tried.len() < links.len() {
        let i = rng.gen_range(0..links.len());
        let j = rng.gen_range(0..links.len());
        if i == j {
            continue;
        }
        let (a, b) = links[i];
        let (c, d) = links[j];

        if a == c || a == d || b == c || b == d {
            tried.insert((i.min(j), i.max(j)));
            continue;
        }
        let uncrossed = !replica.has_link(a, c) && !replica.has_link(b, d);
        let crossed = !replica.has_link(a, d) && !replica.has_link(b, c);
        if !uncrossed && !crossed {
            tried.insert((i.min(j), i.max(j)));
            continue;
        }

        replica.remove_link(a, b);
        replica.remove_link(c, d);
        if uncrossed {
            replica.add_link(a, c, 1.0)?;
            replica.add_link(b, d, 1.0)?;
        } else {
            replica.add_link(a, d, 1.0)?;
            replica.add_link(b, c, 1.0)?;
        }
        swaps += 1;

        let (high, low) = if i > j { (i, j) } else { (j, i) };
        links.remove(high);
        links.remove(low);
        tried.clear();
    }

    Ok(2 * swaps)
}
