//! Null-model replica generation.
//!
//! Four interchangeable strategies produce randomised replicas that share
//! the original network's node set and labels and, except for label
//! permutation, its exact degree sequence. A generator invocation moves
//! through `READY -> BUILDING -> (VALID | REPAIRING -> (VALID | FAILED))`;
//! only `VALID` replicas reach the crosstalk counter, `FAILED` replicas
//! are discarded by the orchestrator.
//!
//! All randomness comes from the caller-owned PRNG; generators never
//! consult the clock or any other entropy source of their own.

mod assignment;
mod label_swap;
mod link_swap;
mod validate;


use rand::rngs::SmallRng;
use tracing::warn;

use crate::degree::DegreeProfile;
use crate::error::CoreError;
use crate::graph::Graph;

use validate::residual_deficit;

/// Randomisation strategy selected on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    /// Double-edge swaps on the original link set (method 0).
    LinkPermutation,
    /// Fresh uniform link assignment conserving the degree sequence
    /// (method 1).
    LinkAssignment,
    /// Link assignment restricted to matching neighbour degree bins,
    /// approximately conserving the joint degree distribution (method 2,
    /// the default).
    AssignmentSecondOrder,
    /// Label swaps within degree bins; the topology is untouched
    /// (method 3).
    LabelPermutation,
}

impl Method {
    /// Parses the numeric CLI code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::LinkPermutation),
            1 => Some(Self::LinkAssignment),
            2 => Some(Self::AssignmentSecondOrder),
            3 => Some(Self::LabelPermutation),
            _ => None,
        }
    }

    /// The numeric CLI code of this method.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::LinkPermutation => 0,
            Self::LinkAssignment => 1,
            Self::AssignmentSecondOrder => 2,
            Self::LabelPermutation => 3,
        }
    }

    /// Human-readable name used in reports and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LinkPermutation => "Link Permutation",
            Self::LinkAssignment => "Link Assignment",
            Self::AssignmentSecondOrder => "Link Assignment + Second-order",
            Self::LabelPermutation => "Node Label Permutation",
        }
    }
}

/// Terminal state of one generator invocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplicaOutcome {
    /// The replica conserves the degree sequence and may be counted.
    Valid {
        /// For link permutation, the number of links that moved
        /// (2 x successful swaps).
        swapped_links: Option<usize>,
    },
    /// Repair could not close every degree mismatch; the replica must be
    /// discarded.
    Discarded {
        /// Summed absolute degree deficit remaining after repair.
        residual_deficit: u64,
    },
}

/// Randomises `replica` in place with the selected method.
///
/// `replica` must already be a fresh copy of `original` (the orchestrator
/// resets it between iterations), and `profile` must have been built from
/// `original`.
///
/// # Errors
/// Returns [`CoreError::LabelMismatch`] when the replica's labels
/// disagree with the original during validation; this indicates a bug,
/// not bad input.
pub fn generate(
    method: Method,
    original: &Graph,
    replica: &mut Graph,
    profile: &DegreeProfile,
    rng: &mut SmallRng,
) -> Result<ReplicaOutcome, CoreError> {
    match method {
        Method::LinkPermutation => {
            let swapped = link_swap::permute(replica, rng)?;
            Ok(ReplicaOutcome::Valid {
                swapped_links: Some(swapped),
            })
        }
        Method::LinkAssignment | Method::AssignmentSecondOrder => {
            let second_order = method == Method::AssignmentSecondOrder;
            assignment::assign(original, replica, profile, second_order, rng)?;

            let errors = validate::validate(original, replica)?;
            if errors.is_empty() && replica.link_count() == original.link_count() {
                return Ok(ReplicaOutcome::Valid {
                    swapped_links: None,
                });
            }

            validate::repair(original, replica, &errors)?;
            let errors = validate::validate(original, replica)?;
            if errors.is_empty() && replica.link_count() == original.link_count() {
                Ok(ReplicaOutcome::Valid {
                    swapped_links: None,
                })
            } else {
                let residual = residual_deficit(&errors);
                warn!(
                    residual_deficit = residual,
                    "randomisation failed to conserve connectivities; discarding replica"
                );
                Ok(ReplicaOutcome::Discarded {
                    residual_deficit: residual,
                })
            }
        }
        Method::LabelPermutation => {
            label_swap::permute(replica, profile, rng);
            Ok(ReplicaOutcome::Valid {
                swapped_links: None,
            })
        }
    }
}
