//! Gene group file ingestion for xtalk.
//!
//! A group file is a loosely delimited table, one gene-to-group
//! assignment per row: `gene, group_id[, system, species, description]`
//! split on any mix of commas, spaces, and tabs. Genes and group ids are
//! uppercased, the system column is uppercased, species lowercased.
//! Genes absent from the network are dropped (but counted), and groups
//! that end up below the minimum size are discarded entirely.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use xtalk_core::{CoreError, GeneGroup, Graph, GroupSet};

/// Stable codes describing [`GroupFileError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum GroupFileErrorCode {
    /// File could not be read.
    Io,
    /// No group survived filtering.
    NoGroups,
}

impl GroupFileErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "GROUPS_IO",
            Self::NoGroups => "GROUPS_NONE_USABLE",
        }
    }
}

impl fmt::Display for GroupFileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while reading a group file.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GroupFileError {
    /// File could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// No group in the file kept enough network members.
    #[error(
        "`{path}` yields no group with at least {min_group_size} members in the network; \
         verify the file format and the gene labels"
    )]
    NoGroups {
        /// Path of the offending file.
        path: PathBuf,
        /// Minimum members a group needed to survive.
        min_group_size: usize,
    },
}

impl GroupFileError {
    /// Retrieve the stable [`GroupFileErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> GroupFileErrorCode {
        match self {
            Self::Io { .. } => GroupFileErrorCode::Io,
            Self::NoGroups { .. } => GroupFileErrorCode::NoGroups,
        }
    }
}

/// Column positions within a split group row.
const COLUMN_GENE: usize = 0;
const COLUMN_GROUP_ID: usize = 1;
const COLUMN_SYSTEM: usize = 2;
const COLUMN_SPECIES: usize = 3;
const COLUMN_DESCRIPTION: usize = 4;

/// Reads a group file against the loaded network.
///
/// Rows with fewer than two usable tokens are skipped. Group metadata is
/// taken from the first row that introduces a group id. Member genes not
/// present in `network` are dropped and counted in the load summary;
/// groups with fewer than `min_group_size` surviving members are
/// discarded together with their membership entries.
///
/// # Errors
/// Returns [`GroupFileError::Io`] when the file cannot be read and
/// [`GroupFileError::NoGroups`] when no group survives filtering.
pub fn read_groups(
    path: &Path,
    network: &Graph,
    min_group_size: usize,
) -> Result<GroupSet, GroupFileError> {
    let content = fs::read_to_string(path).map_err(|source| GroupFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "reading groups");

    let mut groups: Vec<GeneGroup> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();
    let mut universe: BTreeSet<String> = BTreeSet::new();
    let mut missing: BTreeSet<String> = BTreeSet::new();

    for line in content.lines() {
        let tokens: Vec<&str> = line
            .split(|c| matches!(c, ',' | ' ' | '\t'))
            .map(str::trim_end)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.len() <= COLUMN_GROUP_ID {
            continue;
        }

        let gene = tokens[COLUMN_GENE].to_uppercase();
        let group_id = tokens[COLUMN_GROUP_ID].to_uppercase();
        universe.insert(gene.clone());

        let index = *index_of.entry(group_id.clone()).or_insert_with(|| {
            groups.push(GeneGroup::new(
                group_id,
                tokens
                    .get(COLUMN_SYSTEM)
                    .map_or(String::new(), |t| t.to_uppercase()),
                tokens
                    .get(COLUMN_SPECIES)
                    .map_or(String::new(), |t| t.to_lowercase()),
                tokens
                    .get(COLUMN_DESCRIPTION)
                    .map_or(String::new(), |t| (*t).to_owned()),
                path,
            ));
            groups.len() - 1
        });

        if network.node_by_label(&gene).is_some() {
            groups[index].push_member(gene);
        } else {
            missing.insert(gene);
        }
    }

    let set = GroupSet::from_groups(groups, universe, missing.len(), min_group_size).map_err(
        |error| match error {
            CoreError::NoGroups { min_group_size } => GroupFileError::NoGroups {
                path: path.to_path_buf(),
                min_group_size,
            },
            // `from_groups` only fails with `NoGroups`.
            _ => GroupFileError::NoGroups {
                path: path.to_path_buf(),
                min_group_size,
            },
        },
    )?;

    let summary = set.summary();
    info!(
        groups_input = summary.total_groups,
        groups_retained = summary.retained_groups,
        unique_genes = summary.unique_genes,
        genes_not_in_network = summary.genes_not_in_network,
        "groups loaded"
    );
    Ok(set)
}
