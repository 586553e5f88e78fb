//! Gene groups and the label-to-group membership index.
//!
//! A [`GroupSet`] is the filtered, id-sorted collection of groups from one
//! group file together with the reverse index from node label to group
//! indices. Sorting by id before indexing means group indices order the
//! same way as lexicographic id comparison, which the crosstalk counter
//! relies on when canonicalising pair keys.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// One gene group as loaded from a group file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneGroup {
    id: String,
    system: String,
    species: String,
    description: String,
    source: PathBuf,
    members: Vec<String>,
}

impl GeneGroup {
    /// Creates an empty group with the given metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        system: impl Into<String>,
        species: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            system: system.into(),
            species: species.into(),
            description: description.into(),
            source: source.into(),
            members: Vec::new(),
        }
    }

    /// The group identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The classification system the group came from (e.g. `KEGG`).
    #[must_use]
    pub fn system(&self) -> &str {
        &self.system
    }

    /// The species annotation, lowercased on load.
    #[must_use]
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Path of the file the group was read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Member labels present in the network, in file order.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of in-network members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no in-network members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Appends a member label.
    pub fn push_member(&mut self, label: impl Into<String>) {
        self.members.push(label.into());
    }

    /// Number of member labels shared with `other`.
    #[must_use]
    pub fn shared_members(&self, other: &GeneGroup) -> usize {
        self.members
            .iter()
            .filter(|label| other.members.contains(label))
            .count()
    }
}

/// Counters describing one group file load, echoed into the info file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupLoadSummary {
    /// Groups present in the file before size filtering.
    pub total_groups: usize,
    /// Unique gene labels in the file, in or out of the network.
    pub unique_genes: usize,
    /// Groups that survived the minimum-size filter.
    pub retained_groups: usize,
    /// Unique gene labels absent from the network.
    pub genes_not_in_network: usize,
    /// Unique gene labels present in both the surviving groups and the
    /// network.
    pub genes_in_network: usize,
}

/// The filtered, sorted gene groups of one group file plus the reverse
/// membership index.
#[derive(Clone, Debug)]
pub struct GroupSet {
    groups: Vec<GeneGroup>,
    membership: HashMap<String, Vec<usize>>,
    universe: BTreeSet<String>,
    summary: GroupLoadSummary,
}

impl GroupSet {
    /// Builds a set from raw groups: drops groups with fewer than
    /// `min_group_size` in-network members, sorts the survivors by id, and
    /// derives the membership index and load summary.
    ///
    /// `universe` is the pre-filter set of unique gene labels seen in the
    /// file (used as the hypergeometric universe); `genes_not_in_network`
    /// counts labels that never matched a network node.
    ///
    /// # Errors
    /// Returns [`CoreError::NoGroups`] when nothing survives the filter.
    pub fn from_groups(
        mut groups: Vec<GeneGroup>,
        universe: BTreeSet<String>,
        genes_not_in_network: usize,
        min_group_size: usize,
    ) -> Result<Self, CoreError> {
        let total_groups = groups.len();
        groups.retain(|group| group.len() >= min_group_size);
        if groups.is_empty() {
            return Err(CoreError::NoGroups { min_group_size });
        }
        groups.sort_by(|left, right| left.id.cmp(&right.id));

        let mut membership: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            for label in &group.members {
                membership.entry(label.clone()).or_default().push(index);
            }
        }

        let summary = GroupLoadSummary {
            total_groups,
            unique_genes: universe.len(),
            retained_groups: groups.len(),
            genes_not_in_network,
            genes_in_network: membership.len(),
        };

        Ok(Self {
            groups,
            membership,
            universe,
            summary,
        })
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the set holds no groups. Construction guarantees this is
    /// never the case.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The groups in ascending id order.
    #[must_use]
    pub fn groups(&self) -> &[GeneGroup] {
        &self.groups
    }

    /// The group at `index`.
    #[must_use]
    pub fn group(&self, index: usize) -> &GeneGroup {
        &self.groups[index]
    }

    /// Indices of the groups containing `label`, empty when the label is
    /// unknown.
    #[must_use]
    pub fn groups_of(&self, label: &str) -> &[usize] {
        self.membership.get(label).map_or(&[], Vec::as_slice)
    }

    /// The pre-filter unique gene labels of the source file.
    #[must_use]
    pub fn universe(&self) -> &BTreeSet<String> {
        &self.universe
    }

    /// Load counters for the info file.
    #[must_use]
    pub fn summary(&self) -> &GroupLoadSummary {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreErrorCode;

    fn group(id: &str, members: &[&str]) -> GeneGroup {
        let mut group = GeneGroup::new(id, "KEGG", "hsa", "", "groups.tsv");
        for &member in members {
            group.push_member(member);
        }
        group
    }

    fn universe(labels: &[&str]) -> BTreeSet<String> {
        labels.iter().map(|&label| label.to_owned()).collect()
    }

    #[test]
    fn groups_are_sorted_and_indexed() {
        let set = GroupSet::from_groups(
            vec![group("G2", &["B", "C"]), group("G1", &["A", "B"])],
            universe(&["A", "B", "C"]),
            0,
            2,
        )
        .expect("two surviving groups");

        assert_eq!(set.group(0).id(), "G1");
        assert_eq!(set.group(1).id(), "G2");
        assert_eq!(set.groups_of("B"), &[0, 1]);
        assert_eq!(set.groups_of("A"), &[0]);
        assert!(set.groups_of("UNKNOWN").is_empty());
    }

    #[test]
    fn small_groups_are_dropped_and_counted() {
        let set = GroupSet::from_groups(
            vec![group("BIG", &["A", "B", "C"]), group("TINY", &["A"])],
            universe(&["A", "B", "C"]),
            1,
            2,
        )
        .expect("one surviving group");

        assert_eq!(set.len(), 1);
        let summary = set.summary();
        assert_eq!(summary.total_groups, 2);
        assert_eq!(summary.retained_groups, 1);
        assert_eq!(summary.unique_genes, 3);
        assert_eq!(summary.genes_not_in_network, 1);
        assert_eq!(summary.genes_in_network, 3);
    }

    #[test]
    fn empty_after_filtering_is_an_error() {
        let err = GroupSet::from_groups(
            vec![group("TINY", &["A"])],
            universe(&["A"]),
            0,
            10,
        )
        .expect_err("no group survives");
        assert_eq!(err.code(), CoreErrorCode::NoGroups);
    }

    #[test]
    fn shared_members_counts_the_overlap() {
        let left = group("L", &["A", "B", "C"]);
        let right = group("R", &["B", "C", "D"]);
        assert_eq!(left.shared_members(&right), 2);
        assert_eq!(right.shared_members(&left), 2);
    }
}
