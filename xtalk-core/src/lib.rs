//! xtalk core library.
//!
//! Statistical assessment of crosstalk enrichment between gene groups in
//! an undirected interaction network. The crate provides the graph
//! container, the degree-preserving null-model generators, the per-pair
//! link counter, and the statistics aggregator; file ingestion lives in
//! the provider crates and the command-line surface in `xtalk-cli`.
//!
//! # Determinism
//!
//! Every source of randomness flows from a single PRNG owned by the
//! [`Analysis`] orchestrator. With a fixed seed, identical inputs yield
//! identical replicas and therefore identical reports; graph traversal
//! orders are deterministic by construction.

mod analysis;
mod crosstalk;
mod degree;
mod error;
mod graph;
mod groups;
pub mod metrics;
mod randomize;
mod stats;

pub use crate::{
    analysis::{Analysis, AnalysisBuilder, AnalysisReport, PairKind, PairRow},
    crosstalk::{CountingMode, count_all_pairs, count_between},
    degree::{DegreeProfile, degree_bin},
    error::{CoreError, CoreErrorCode, GraphError, GraphErrorCode, Result},
    graph::{Graph, NodeId},
    groups::{GeneGroup, GroupLoadSummary, GroupSet},
    randomize::{Method, ReplicaOutcome, generate},
    stats::{
        PairStats, benjamini_hochberg, hypergeometric_p, ln_choose, mean_and_std, p_from_z,
        reduced_chi_square,
    },
};
