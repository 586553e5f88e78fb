//! Orchestration of the randomise-count-aggregate loop.
//!
//! An [`Analysis`] owns the run configuration and the single PRNG. Each
//! iteration resets the reusable replica graph to the original, invokes
//! the selected generator, and on success appends the per-pair link
//! counts; failed replicas are discarded. After the final iteration the
//! original network is counted once for the observed values and the
//! statistics are finalised.

use rand::{SeedableRng, rngs::SmallRng};
use tracing::{debug, info};

use crate::crosstalk::{self, CountingMode, tri_index, tri_len};
use crate::degree::DegreeProfile;
use crate::error::CoreError;
use crate::graph::Graph;
use crate::groups::GroupSet;
use crate::metrics;
use crate::randomize::{self, Method, ReplicaOutcome};
use crate::stats::{
    PairStats, benjamini_hochberg, hypergeometric_p, mean_and_std, p_from_z, reduced_chi_square,
};

/// Configures and constructs [`Analysis`] instances.
///
/// # Examples
/// ```
/// use xtalk_core::{AnalysisBuilder, CountingMode, Method};
///
/// let analysis = AnalysisBuilder::new()
///     .with_method(Method::LabelPermutation)
///     .with_iterations(10)
///     .with_seed(7)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(analysis.method(), Method::LabelPermutation);
/// assert_eq!(analysis.mode(), CountingMode::SkipEither);
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisBuilder {
    method: Method,
    iterations: usize,
    mode: CountingMode,
    hypergeometric: bool,
    seed: Option<u64>,
}

impl Default for AnalysisBuilder {
    fn default() -> Self {
        Self {
            method: Method::AssignmentSecondOrder,
            iterations: 100,
            mode: CountingMode::SkipEither,
            hypergeometric: false,
            seed: None,
        }
    }
}

impl AnalysisBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the randomisation method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the number of replicas to generate.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Selects the shared-member counting mode.
    #[must_use]
    pub fn with_mode(mut self, mode: CountingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Also computes the hypergeometric overlap probability per pair.
    #[must_use]
    pub fn with_hypergeometric(mut self, enabled: bool) -> Self {
        self.hypergeometric = enabled;
        self
    }

    /// Seeds the PRNG for a reproducible run. Without a seed the PRNG is
    /// seeded from system entropy.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration and constructs the [`Analysis`].
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidIterations`] when the replica count is
    /// zero.
    pub fn build(self) -> Result<Analysis, CoreError> {
        if self.iterations == 0 {
            return Err(CoreError::InvalidIterations { got: 0 });
        }
        Ok(Analysis {
            method: self.method,
            iterations: self.iterations,
            mode: self.mode,
            hypergeometric: self.hypergeometric,
            seed: self.seed,
        })
    }
}

/// Whether a pair compares a group with itself or with another group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PairKind {
    /// Both counters belong to the same group id.
    Intra,
    /// The counters belong to distinct group ids.
    Inter,
}

impl PairKind {
    /// The report column value for this kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intra => "intra",
            Self::Inter => "inter",
        }
    }
}

/// One report row: a group pair with its final statistics.
#[derive(Clone, Debug)]
pub struct PairRow {
    /// Canonical pair name, `<id>_vs_<id>`.
    pub pair: String,
    /// Classification systems of the two groups.
    pub systems: (String, String),
    /// Intra- or inter-group comparison.
    pub kind: PairKind,
    /// Final statistics; undefined fields are `None`.
    pub stats: PairStats,
}

/// The finalised outcome of one run.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    /// Report rows in output order: intra pairs first, then inter pairs,
    /// groups in ascending id order.
    pub rows: Vec<PairRow>,
    /// Replicas that passed validation and were counted.
    pub replicas_counted: usize,
    /// Replicas discarded after failed repair.
    pub replicas_discarded: usize,
}

/// Entry point for running the crosstalk analysis.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use xtalk_core::{AnalysisBuilder, GeneGroup, Graph, GroupSet, Method};
///
/// let mut network = Graph::new();
/// let a = network.add_node("A").expect("fresh label");
/// let b = network.add_node("B").expect("fresh label");
/// let c = network.add_node("C").expect("fresh label");
/// network.add_link(a, b, 1.0).expect("distinct nodes");
/// network.add_link(b, c, 1.0).expect("distinct nodes");
///
/// let mut group = GeneGroup::new("G1", "SYS", "hsa", "", "demo");
/// group.push_member("A");
/// group.push_member("B");
/// let universe: BTreeSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
/// let groups = GroupSet::from_groups(vec![group], universe, 0, 2).expect("one group");
///
/// let analysis = AnalysisBuilder::new()
///     .with_method(Method::LabelPermutation)
///     .with_iterations(5)
///     .with_seed(1)
///     .build()
///     .expect("valid configuration");
/// let report = analysis.run_all_pairs(&network, &groups).expect("analysis runs");
/// assert_eq!(report.rows.len(), 1);
/// assert_eq!(report.replicas_counted, 5);
/// ```
#[derive(Debug, Clone)]
pub struct Analysis {
    method: Method,
    iterations: usize,
    mode: CountingMode,
    hypergeometric: bool,
    seed: Option<u64>,
}

impl Analysis {
    /// The configured randomisation method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The configured replica count.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The configured counting mode.
    #[must_use]
    pub fn mode(&self) -> CountingMode {
        self.mode
    }

    /// Whether hypergeometric overlap probabilities are computed.
    #[must_use]
    pub fn hypergeometric(&self) -> bool {
        self.hypergeometric
    }

    /// The configured PRNG seed, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }

    /// Compares every pair of groups within one set against the null
    /// ensemble.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyNetwork`] for a network without nodes
    /// and propagates generator invariant violations.
    pub fn run_all_pairs(
        &self,
        network: &Graph,
        groups: &GroupSet,
    ) -> Result<AnalysisReport, CoreError> {
        if network.node_count() == 0 {
            return Err(CoreError::EmptyNetwork);
        }
        let (table, discarded) = self.collect_counts(network, tri_len(groups.len()), |replica| {
            crosstalk::count_all_pairs(replica, groups, self.mode)
        })?;
        let observed = crosstalk::count_all_pairs(network, groups, self.mode);

        let universe = groups.universe().len() as u64;
        let count = groups.len();
        let mut cells: Vec<(PairKind, PairStats)> = Vec::with_capacity(tri_len(count));
        for i in 0..count {
            for j in 0..=i {
                let index = tri_index(i, j);
                let kind = if i == j { PairKind::Intra } else { PairKind::Inter };
                let mut stats = finalise_pair(&table[index], observed[index] as f64);
                if self.hypergeometric {
                    stats.p_hyper = Some(overlap_probability(
                        groups.group(i).members().len() as u64,
                        groups.group(j).members().len() as u64,
                        groups.group(i).shared_members(groups.group(j)) as u64,
                        universe,
                    ));
                }
                cells.push((kind, stats));
            }
        }

        // Intra and inter pairs are adjusted as separate families.
        for kind in [PairKind::Intra, PairKind::Inter] {
            let mut entries: Vec<(usize, f64)> = cells
                .iter()
                .enumerate()
                .filter(|(_, (k, stats))| *k == kind && stats.p_value.is_some())
                .map(|(index, (_, stats))| (index, stats.p_value.unwrap_or(1.0)))
                .collect();
            benjamini_hochberg(&mut entries);
            for (index, fdr) in entries {
                cells[index].1.fdr = Some(fdr);
            }
        }

        let mut rows = Vec::with_capacity(cells.len());
        for i in 0..count {
            let group = groups.group(i);
            rows.push(PairRow {
                pair: format!("{}_vs_{}", group.id(), group.id()),
                systems: (group.system().to_owned(), group.system().to_owned()),
                kind: PairKind::Intra,
                stats: cells[tri_index(i, i)].1.clone(),
            });
        }
        for i in 0..count {
            for j in 0..i {
                rows.push(PairRow {
                    pair: format!("{}_vs_{}", groups.group(i).id(), groups.group(j).id()),
                    systems: (
                        groups.group(i).system().to_owned(),
                        groups.group(j).system().to_owned(),
                    ),
                    kind: PairKind::Inter,
                    stats: cells[tri_index(i, j)].1.clone(),
                });
            }
        }

        Ok(AnalysisReport {
            rows,
            replicas_counted: self.iterations - discarded,
            replicas_discarded: discarded,
        })
    }

    /// Compares every group of set `a` against every group of set `b`.
    ///
    /// Pairs whose ids coincide in both files are traversed from both
    /// sides by the counter, so their counts are halved before the
    /// statistics (replica counts as integers, the observed count as a
    /// real).
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyNetwork`] for a network without nodes
    /// and propagates generator invariant violations.
    pub fn run_between(
        &self,
        network: &Graph,
        a: &GroupSet,
        b: &GroupSet,
    ) -> Result<AnalysisReport, CoreError> {
        if network.node_count() == 0 {
            return Err(CoreError::EmptyNetwork);
        }
        let width = b.len();
        let (mut table, discarded) = self.collect_counts(network, a.len() * width, |replica| {
            crosstalk::count_between(replica, a, b, self.mode)
        })?;
        let observed = crosstalk::count_between(network, a, b, self.mode);

        let universe = a.universe().union(b.universe()).count() as u64;
        let mut cells: Vec<(PairKind, PairStats)> = Vec::with_capacity(table.len());
        for (ia, group_a) in a.groups().iter().enumerate() {
            for (ib, group_b) in b.groups().iter().enumerate() {
                let index = ia * width + ib;
                let same_id = group_a.id() == group_b.id();
                let observed_links = if same_id {
                    for count in &mut table[index] {
                        *count /= 2;
                    }
                    observed[index] as f64 * 0.5
                } else {
                    observed[index] as f64
                };
                let kind = if same_id { PairKind::Intra } else { PairKind::Inter };
                let mut stats = finalise_pair(&table[index], observed_links);
                if self.hypergeometric {
                    stats.p_hyper = Some(overlap_probability(
                        group_a.members().len() as u64,
                        group_b.members().len() as u64,
                        group_a.shared_members(group_b) as u64,
                        universe,
                    ));
                }
                cells.push((kind, stats));
            }
        }

        let mut entries: Vec<(usize, f64)> = cells
            .iter()
            .enumerate()
            .filter(|(_, (_, stats))| stats.p_value.is_some())
            .map(|(index, (_, stats))| (index, stats.p_value.unwrap_or(1.0)))
            .collect();
        benjamini_hochberg(&mut entries);
        for (index, fdr) in entries {
            cells[index].1.fdr = Some(fdr);
        }

        let rows = a
            .groups()
            .iter()
            .enumerate()
            .flat_map(|(ia, group_a)| {
                let cells = &cells;
                b.groups().iter().enumerate().map(move |(ib, group_b)| {
                    let (kind, stats) = cells[ia * width + ib].clone();
                    PairRow {
                        pair: format!("{}_vs_{}", group_a.id(), group_b.id()),
                        systems: (group_a.system().to_owned(), group_b.system().to_owned()),
                        kind,
                        stats,
                    }
                })
            })
            .collect();

        Ok(AnalysisReport {
            rows,
            replicas_counted: self.iterations - discarded,
            replicas_discarded: discarded,
        })
    }

    /// Generates a single randomised replica of `network`, e.g. for the
    /// write-random-graph mode. The replica is returned even when repair
    /// left a residual deficit; the deficit is logged.
    ///
    /// # Errors
    /// Propagates generator invariant violations.
    pub fn randomize_once(&self, network: &Graph) -> Result<Graph, CoreError> {
        if network.node_count() == 0 {
            return Err(CoreError::EmptyNetwork);
        }
        let profile = DegreeProfile::build(network);
        let mut rng = self.rng();
        let mut replica = network.clone();
        randomize::generate(self.method, network, &mut replica, &profile, &mut rng)?;
        Ok(replica)
    }

    fn collect_counts(
        &self,
        network: &Graph,
        pairs: usize,
        mut count: impl FnMut(&Graph) -> Vec<u64>,
    ) -> Result<(Vec<Vec<u64>>, usize), CoreError> {
        let profile = DegreeProfile::build(network);
        let mut rng = self.rng();
        let mut replica = network.clone();
        let mut table = vec![Vec::with_capacity(self.iterations); pairs];
        let mut discarded = 0;
        let original_s_metric = metrics::s_metric(network);

        for iteration in 1..=self.iterations {
            info!(iteration, total = self.iterations, "generating replica");
            replica.reset_from(network);
            match randomize::generate(self.method, network, &mut replica, &profile, &mut rng)? {
                ReplicaOutcome::Valid { .. } => {
                    if original_s_metric > 0 {
                        debug!(
                            s_metric_ratio =
                                metrics::s_metric(&replica) as f64 / original_s_metric as f64,
                            assortativity = metrics::assortativity(&replica),
                            "replica structure"
                        );
                    }
                    for (pair, value) in count(&replica).into_iter().enumerate() {
                        table[pair].push(value);
                    }
                }
                ReplicaOutcome::Discarded { .. } => {
                    discarded += 1;
                }
            }
        }
        Ok((table, discarded))
    }
}

fn finalise_pair(counts: &[u64], observed: f64) -> PairStats {
    let (expected, std_dev) = mean_and_std(counts);
    let mut stats = PairStats {
        observed,
        expected,
        ..PairStats::default()
    };
    if std_dev != 0.0 {
        let z = (observed - expected) / std_dev;
        stats.std_dev = Some(std_dev);
        stats.z_score = Some(z);
        stats.p_value = Some(p_from_z(z));
        stats.chi_sqr = Some(reduced_chi_square(counts, expected, std_dev));
    }
    stats
}

fn overlap_probability(size_a: u64, size_b: u64, shared: u64, universe: u64) -> f64 {
    hypergeometric_p(size_a.min(size_b), size_a.max(size_b), shared, universe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreErrorCode;

    #[test]
    fn zero_iterations_are_rejected() {
        let err = AnalysisBuilder::new()
            .with_iterations(0)
            .build()
            .expect_err("zero replicas is invalid");
        assert_eq!(err.code(), CoreErrorCode::InvalidIterations);
    }

    #[test]
    fn builder_defaults_match_the_published_tool() {
        let analysis = AnalysisBuilder::new().build().expect("defaults are valid");
        assert_eq!(analysis.method(), Method::AssignmentSecondOrder);
        assert_eq!(analysis.iterations(), 100);
        assert_eq!(analysis.mode(), CountingMode::SkipEither);
        assert!(!analysis.hypergeometric());
        assert_eq!(analysis.seed(), None);
    }

    #[test]
    fn empty_network_is_rejected() {
        let analysis = AnalysisBuilder::new()
            .with_seed(3)
            .build()
            .expect("valid configuration");
        let err = analysis
            .randomize_once(&Graph::new())
            .expect_err("no nodes to randomise");
        assert_eq!(err.code(), CoreErrorCode::EmptyNetwork);
    }

    #[test]
    fn kind_labels_match_the_report_vocabulary() {
        assert_eq!(PairKind::Intra.label(), "intra");
        assert_eq!(PairKind::Inter.label(), "inter");
    }
}
