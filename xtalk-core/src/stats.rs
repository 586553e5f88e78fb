//! Statistics over replica link counts: empirical null moments, z-scores,
//! two-sided p-values, reduced chi-square goodness of fit, Benjamini-
//! Hochberg adjustment, and the optional hypergeometric overlap test.
//!
//! Conventions follow the published method: the null standard deviation
//! is the population form (divisor R, not R - 1), and the chi-square
//! statistic normalises each bin residual by the null standard deviation
//! rather than the bin expectation.

use std::f64::consts::SQRT_2;

/// Final statistics for one group pair. Fields that are undefined when
/// the null distribution has zero variance are `None` and render as `NA`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PairStats {
    /// Link count observed on the original network.
    pub observed: f64,
    /// Mean link count across replicas.
    pub expected: f64,
    /// Population standard deviation across replicas.
    pub std_dev: Option<f64>,
    /// `(observed - expected) / std_dev`.
    pub z_score: Option<f64>,
    /// Two-sided p-value, `erfc(|z| / sqrt(2))`.
    pub p_value: Option<f64>,
    /// Reduced chi-square of the replica counts against normality.
    pub chi_sqr: Option<f64>,
    /// Benjamini-Hochberg adjusted p-value.
    pub fdr: Option<f64>,
    /// Hypergeometric probability of the member overlap, when requested.
    pub p_hyper: Option<f64>,
}

/// Mean and population standard deviation of a replica count vector.
///
/// Returns `(0.0, 0.0)` for an empty vector, which downstream code treats
/// as an undefined null.
#[must_use]
pub fn mean_and_std(counts: &[u64]) -> (f64, f64) {
    if counts.is_empty() {
        return (0.0, 0.0);
    }
    let len = counts.len() as f64;
    let mean = counts.iter().map(|&c| c as f64).sum::<f64>() / len;
    let variance = counts
        .iter()
        .map(|&c| (c as f64 - mean).powi(2))
        .sum::<f64>()
        / len;
    (mean, variance.sqrt())
}

/// Two-sided p-value of a z-score under the standard normal.
#[must_use]
pub fn p_from_z(z: f64) -> f64 {
    libm::erfc(z.abs() / SQRT_2)
}

const CHI_LOWER_BIN: f64 = -1.6;
const CHI_BIN_WIDTH: f64 = 0.4;
const CHI_INNER_EDGES: usize = 9;

fn chi_bin_edges() -> Vec<f64> {
    let mut edges = Vec::with_capacity(CHI_INNER_EDGES + 2);
    edges.push(f64::NEG_INFINITY);
    for i in 0..CHI_INNER_EDGES {
        edges.push(CHI_LOWER_BIN + i as f64 * CHI_BIN_WIDTH);
    }
    edges.push(f64::INFINITY);
    edges
}

/// Reduced chi-square of the replica counts against a standard normal.
///
/// Counts are normalised by `(mean, std_dev)`, histogrammed into bins with
/// cut-points at -inf, -1.6, -1.2, ..., +1.6, +inf, and compared with the
/// normal bin masses. Three constraints (mean, standard deviation, and
/// the sample size) leave `R - 3` degrees of freedom.
#[must_use]
pub fn reduced_chi_square(counts: &[u64], mean: f64, std_dev: f64) -> f64 {
    let edges = chi_bin_edges();
    let len = counts.len() as f64;

    let mut observed = vec![0_u64; edges.len() - 1];
    for &count in counts {
        let value = (count as f64 - mean) / std_dev;
        for j in 1..edges.len() {
            if value < edges[j] {
                observed[j - 1] += 1;
                break;
            }
        }
    }

    let mut chi_sqr = 0.0;
    for (j, &seen) in observed.iter().enumerate() {
        let expected =
            len * 0.5 * (libm::erfc(-edges[j + 1] / SQRT_2) - libm::erfc(-edges[j] / SQRT_2));
        chi_sqr += ((seen as f64 - expected) / std_dev).powi(2);
    }
    chi_sqr / (len - 3.0)
}

/// Applies the Benjamini-Hochberg adjustment in place.
///
/// Entries are `(key, p)` pairs; they are sorted by ascending p and the
/// `i`-th entry (1-based) is scaled by `n / (n - i + 1)` and capped at 1.
/// The first entry is left unadjusted. Adjusted values are monotone
/// non-decreasing in the sorted order.
pub fn benjamini_hochberg(entries: &mut [(usize, f64)]) {
    entries.sort_by(|left, right| left.1.total_cmp(&right.1));
    let len = entries.len();
    for rank in 1..len {
        let factor = len as f64 / (len - rank) as f64;
        entries[rank].1 = (entries[rank].1 * factor).min(1.0);
    }
}

/// Natural log of the binomial coefficient `C(n, k)`.
///
/// Computed through `lgamma` so that group sizes far beyond what a direct
/// product can represent stay finite. Out-of-range `k` yields negative
/// infinity, i.e. a zero coefficient.
#[must_use]
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    if k == 0 || k == n {
        return 0.0;
    }
    libm::lgamma((n + 1) as f64) - libm::lgamma((k + 1) as f64) - libm::lgamma((n - k + 1) as f64)
}

/// Hypergeometric probability of drawing exactly `k_shared` marked items
/// in `n_draws` draws without replacement from a universe of `universe`
/// items of which `m_successes` are marked:
/// `C(m, k) * C(N - m, n - k) / C(N, n)`.
#[must_use]
pub fn hypergeometric_p(n_draws: u64, m_successes: u64, k_shared: u64, universe: u64) -> f64 {
    if k_shared > n_draws || m_successes > universe || n_draws > universe {
        return 0.0;
    }
    let ln_p = ln_choose(m_successes, k_shared)
        + ln_choose(universe - m_successes, n_draws - k_shared)
        - ln_choose(universe, n_draws);
    ln_p.exp()
}
