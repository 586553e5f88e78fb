//! Error types for the xtalk core library.
//!
//! Defines error enums exposed by the public API and a convenient result
//! alias. Each enum is paired with a stable machine-readable code so CLI
//! wrappers and tests can match on failures without parsing messages.

use std::fmt;

use thiserror::Error;

/// Stable codes describing [`GraphError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum GraphErrorCode {
    /// An edge connecting a node to itself was requested.
    SelfLoop,
    /// A node with the same label already exists in the graph.
    DuplicateLabel,
}

impl GraphErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfLoop => "XTALK_GRAPH_SELF_LOOP",
            Self::DuplicateLabel => "XTALK_GRAPH_DUPLICATE_LABEL",
        }
    }
}

impl fmt::Display for GraphErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced by [`Graph`](crate::Graph) mutations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// An edge connecting a node to itself was requested.
    #[error("self-loops are not permitted (node `{label}`)")]
    SelfLoop { label: String },
    /// A node with the same label already exists in the graph.
    #[error("node label `{label}` is already present")]
    DuplicateLabel { label: String },
}

impl GraphError {
    /// Retrieve the stable [`GraphErrorCode`] for this error.
    pub const fn code(&self) -> GraphErrorCode {
        match self {
            Self::SelfLoop { .. } => GraphErrorCode::SelfLoop,
            Self::DuplicateLabel { .. } => GraphErrorCode::DuplicateLabel,
        }
    }
}

/// Stable codes describing [`CoreError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum CoreErrorCode {
    /// The network contained no nodes.
    EmptyNetwork,
    /// No gene groups survived filtering.
    NoGroups,
    /// The replica count must be at least one.
    InvalidIterations,
    /// Original and replica graphs disagreed on a node label.
    LabelMismatch,
    /// A graph mutation failed while building a replica.
    Graph,
}

impl CoreErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyNetwork => "XTALK_EMPTY_NETWORK",
            Self::NoGroups => "XTALK_NO_GROUPS",
            Self::InvalidIterations => "XTALK_INVALID_ITERATIONS",
            Self::LabelMismatch => "XTALK_LABEL_MISMATCH",
            Self::Graph => "XTALK_GRAPH_FAILURE",
        }
    }
}

impl fmt::Display for CoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced when configuring or running an
/// [`Analysis`](crate::Analysis).
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CoreError {
    /// The network contained no nodes.
    #[error("the network contains no nodes")]
    EmptyNetwork,
    /// No gene groups survived filtering.
    #[error("no gene groups with at least {min_group_size} network members")]
    NoGroups { min_group_size: usize },
    /// The replica count must be at least one.
    #[error("iterations must be at least 1 (got {got})")]
    InvalidIterations { got: usize },
    /// Original and replica graphs disagreed on a node label. The replica
    /// shares the original's node set, so this indicates a bug rather than
    /// bad input.
    #[error(
        "node {index} is labelled `{original}` in the original network but \
         `{replica}` in the replica; this should never happen"
    )]
    LabelMismatch {
        index: usize,
        original: String,
        replica: String,
    },
    /// A graph mutation failed while building a replica.
    #[error("replica construction failed: {source}")]
    Graph {
        #[source]
        source: GraphError,
    },
}

impl CoreError {
    /// Retrieve the stable [`CoreErrorCode`] for this error.
    pub const fn code(&self) -> CoreErrorCode {
        match self {
            Self::EmptyNetwork => CoreErrorCode::EmptyNetwork,
            Self::NoGroups { .. } => CoreErrorCode::NoGroups,
            Self::InvalidIterations { .. } => CoreErrorCode::InvalidIterations,
            Self::LabelMismatch { .. } => CoreErrorCode::LabelMismatch,
            Self::Graph { .. } => CoreErrorCode::Graph,
        }
    }
}

impl From<GraphError> for CoreError {
    fn from(source: GraphError) -> Self {
        Self::Graph { source }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, CoreError>;
