//! Crosstalk counting: per-pair link tallies under the shared-member
//! counting rules.
//!
//! For every link the counter walks the cross product of the endpoint
//! group memberships, so one physical link can contribute to several
//! pair counters. Links whose endpoints sit in both groups of a pair are
//! suppressed according to the selected [`CountingMode`].

use crate::graph::Graph;
use crate::groups::GroupSet;

/// Shared-member suppression rule applied to inter-group links.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CountingMode {
    /// Skip the link when *either* endpoint belongs to both groups
    /// (mode 0, the default).
    SkipEither,
    /// Skip the link only when *both* endpoints belong to both groups
    /// (mode 1).
    SkipBoth,
}

impl CountingMode {
    /// Parses the numeric CLI code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::SkipEither),
            1 => Some(Self::SkipBoth),
            _ => None,
        }
    }

    /// The numeric CLI code of this mode.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::SkipEither => 0,
            Self::SkipBoth => 1,
        }
    }
}

/// Index of the unordered pair `(i, j)` in a lower-triangular counter
/// vector. Requires `i >= j`.
#[must_use]
pub(crate) fn tri_index(i: usize, j: usize) -> usize {
    debug_assert!(i >= j);
    i * (i + 1) / 2 + j
}

/// Length of the lower-triangular counter vector for `n` groups.
#[must_use]
pub(crate) fn tri_len(n: usize) -> usize {
    n * (n + 1) / 2
}

fn skip_by_indices(mode: CountingMode, s_u: &[usize], a: usize, s_v: &[usize], b: usize) -> bool {
    let u_in_both = s_u.contains(&b);
    let v_in_both = s_v.contains(&a);
    match mode {
        CountingMode::SkipEither => u_in_both || v_in_both,
        CountingMode::SkipBoth => u_in_both && v_in_both,
    }
}

fn contains_id(set: &GroupSet, indices: &[usize], id: &str) -> bool {
    indices.iter().any(|&index| set.group(index).id() == id)
}

fn skip_by_ids(
    mode: CountingMode,
    set_u: &GroupSet,
    s_u: &[usize],
    id_a: &str,
    set_v: &GroupSet,
    s_v: &[usize],
    id_b: &str,
) -> bool {
    let u_in_both = contains_id(set_u, s_u, id_b);
    let v_in_both = contains_id(set_v, s_v, id_a);
    match mode {
        CountingMode::SkipEither => u_in_both || v_in_both,
        CountingMode::SkipBoth => u_in_both && v_in_both,
    }
}

/// Counts links between every unordered pair of groups of one set.
///
/// The result is a lower-triangular vector indexed by
/// `tri_index(max(a, b), min(a, b))`; groups are id-sorted, so the index
/// canonicalisation is exactly lexicographic max/min on group ids. A link
/// whose endpoints are both in group `g` contributes one count to
/// `(g, g)`.
#[must_use]
pub fn count_all_pairs(graph: &Graph, groups: &GroupSet, mode: CountingMode) -> Vec<u64> {
    let mut counts = vec![0_u64; tri_len(groups.len())];
    for (u, v, _) in graph.links() {
        let s_u = groups.groups_of(graph.label(u));
        let s_v = groups.groups_of(graph.label(v));
        for &a in s_u {
            for &b in s_v {
                if a == b {
                    counts[tri_index(a, b)] += 1;
                } else if !skip_by_indices(mode, s_u, a, s_v, b) {
                    counts[tri_index(a.max(b), a.min(b))] += 1;
                }
            }
        }
    }
    counts
}

/// Counts links between the groups of two sets.
///
/// The result is a dense row-major matrix of `a.len() * b.len()`
/// counters. Each link is examined in both orientations, so a pair whose
/// group ids coincide in both files is counted twice; the caller halves
/// those entries before computing statistics.
#[must_use]
pub fn count_between(graph: &Graph, a: &GroupSet, b: &GroupSet, mode: CountingMode) -> Vec<u64> {
    let mut counts = vec![0_u64; a.len() * b.len()];
    let width = b.len();
    for (u, v, _) in graph.links() {
        let label_u = graph.label(u);
        let label_v = graph.label(v);
        for (left, right) in [(label_u, label_v), (label_v, label_u)] {
            let s_a = a.groups_of(left);
            let s_b = b.groups_of(right);
            if s_a.is_empty() || s_b.is_empty() {
                continue;
            }
            for &ia in s_a {
                let id_a = a.group(ia).id();
                for &ib in s_b {
                    let id_b = b.group(ib).id();
                    if id_a == id_b || !skip_by_ids(mode, a, s_a, id_a, b, s_b, id_b) {
                        counts[ia * width + ib] += 1;
                    }
                }
            }
        }
    }
    counts
}
