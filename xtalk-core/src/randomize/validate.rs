//! Degree-sequence validation and deterministic repair for assignment
//! replicas.

use crate::error::{CoreError, GraphError};
use crate::graph::{Graph, NodeId};

/// One node whose replica degree disagrees with the original.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DegreeMismatch {
    pub(crate) node: NodeId,
    /// Signed deficit `degree_original - degree_replica`.
    pub(crate) deficit: i64,
}

/// Sum of absolute deficits across an error list.
pub(crate) fn residual_deficit(errors: &[DegreeMismatch]) -> u64 {
    errors.iter().map(|error| error.deficit.unsigned_abs()).sum()
}

/// Compares the replica's degree sequence against the original's.
///
/// Both graphs are walked in the shared node order. The returned
/// mismatches are sorted by ascending signed deficit. An empty list
/// together with matching node and link counts means the replica is
/// valid.
///
/// # Errors
/// Returns [`CoreError::LabelMismatch`] when a node's labels differ
/// between the graphs; the replica shares the original's node set, so
/// this is a bug, not a recoverable condition.
pub(crate) fn validate(
    original: &Graph,
    replica: &Graph,
) -> Result<Vec<DegreeMismatch>, CoreError> {
    let mut errors = Vec::new();
    for node in original.node_ids() {
        if original.label(node) != replica.label(node) {
            return Err(CoreError::LabelMismatch {
                index: node.index(),
                original: original.label(node).to_owned(),
                replica: replica.label(node).to_owned(),
            });
        }
        let deficit = original.degree(node) as i64 - replica.degree(node) as i64;
        if deficit != 0 {
            errors.push(DegreeMismatch { node, deficit });
        }
    }
    errors.sort_by_key(|error| error.deficit);
    Ok(errors)
}

/// Repairs residual degree mismatches in two passes.
///
/// First the odd-deficit nodes are paired up; for each pair an existing
/// link `(u, v)` away from both is split so that `u` feeds one error node
/// and `v` the other, making both deficits even. Then every remaining
/// deficit is closed two at a time by swallowing a link `(u, v)` whose
/// endpoints are not adjacent to the error node `e` into `(u, e)` and
/// `(v, e)`. The odd pass must run first; reordering the passes converges
/// measurably worse on sparse networks.
pub(crate) fn repair(
    original: &Graph,
    replica: &mut Graph,
    errors: &[DegreeMismatch],
) -> Result<(), GraphError> {
    let odd: Vec<NodeId> = errors
        .iter()
        .filter(|error| error.deficit % 2 == 1)
        .map(|error| error.node)
        .collect();
    for pair in odd.chunks_exact(2) {
        let (err_a, err_b) = (pair[0], pair[1]);
        splice_towards(replica, err_a, err_b)?;
    }

    for error in errors {
        let node = error.node;
        let mut deficit = original.degree(node) as i64 - replica.degree(node) as i64;
        while deficit >= 2 {
            if !swallow_link(replica, node)? {
                break;
            }
            deficit -= 2;
        }
    }
    Ok(())
}

/// Finds a link `(u, v)` with both endpoints away from `err_a` and
/// `err_b` and a rewiring direction that introduces no parallel link,
/// then replaces it with `(u, err_a)` and `(v, err_b)` (or the crossed
/// orientation). Raises both error degrees by one.
fn splice_towards(replica: &mut Graph, err_a: NodeId, err_b: NodeId) -> Result<(), GraphError> {
    let snapshot: Vec<(NodeId, NodeId)> = replica.links().map(|(u, v, _)| (u, v)).collect();
    for (u, v) in snapshot {
        if u == err_a || u == err_b || v == err_a || v == err_b {
            continue;
        }
        if !replica.has_link(u, err_a) && !replica.has_link(v, err_b) {
            replica.remove_link(u, v);
            replica.add_link(u, err_a, 1.0)?;
            replica.add_link(v, err_b, 1.0)?;
            return Ok(());
        }
        if !replica.has_link(v, err_a) && !replica.has_link(u, err_b) {
            replica.remove_link(u, v);
            replica.add_link(v, err_a, 1.0)?;
            replica.add_link(u, err_b, 1.0)?;
            return Ok(());
        }
    }
    Ok(())
}

/// Removes one link `(u, v)` not touching `node` and with neither
/// endpoint adjacent to it, then connects both `u` and `v` to `node`.
/// Raises `node`'s degree by two and leaves every other degree intact.
fn swallow_link(replica: &mut Graph, node: NodeId) -> Result<bool, GraphError> {
    let found = replica
        .links()
        .map(|(u, v, _)| (u, v))
        .find(|&(u, v)| {
            u != node && v != node && !replica.has_link(u, node) && !replica.has_link(v, node)
        });
    let Some((u, v)) = found else {
        return Ok(false);
    };
    replica.remove_link(u, v);
    replica.add_link(u, node, 1.0)?;
    replica.add_link(v, node, 1.0)?;
    Ok(true)
}
