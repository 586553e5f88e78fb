//! Error types for network file ingestion.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Stable codes describing [`NetworkFileError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum NetworkFileErrorCode {
    /// File could not be read.
    Io,
    /// The XML document was not well-formed XGMML.
    InvalidXgmml,
    /// The TSV rows did not match any supported layout.
    InvalidTsv,
    /// No links survived parsing and filtering.
    EmptyNetwork,
}

impl NetworkFileErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "NETWORK_IO",
            Self::InvalidXgmml => "NETWORK_INVALID_XGMML",
            Self::InvalidTsv => "NETWORK_INVALID_TSV",
            Self::EmptyNetwork => "NETWORK_EMPTY",
        }
    }
}

impl fmt::Display for NetworkFileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised while reading or writing a network file.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NetworkFileError {
    /// File could not be read or written.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The XML document was not well-formed XGMML.
    #[error("invalid XGMML in `{path}`: {detail}")]
    InvalidXgmml {
        /// Path of the offending file.
        path: PathBuf,
        /// What was wrong with the document.
        detail: String,
    },
    /// The TSV rows did not match any supported layout.
    #[error("invalid TSV in `{path}`: {detail}")]
    InvalidTsv {
        /// Path of the offending file.
        path: PathBuf,
        /// What was wrong with the rows.
        detail: String,
    },
    /// No links survived parsing and filtering.
    #[error("`{path}` contains no usable links")]
    EmptyNetwork {
        /// Path of the offending file.
        path: PathBuf,
    },
}

impl NetworkFileError {
    /// Retrieve the stable [`NetworkFileErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> NetworkFileErrorCode {
        match self {
            Self::Io { .. } => NetworkFileErrorCode::Io,
            Self::InvalidXgmml { .. } => NetworkFileErrorCode::InvalidXgmml,
            Self::InvalidTsv { .. } => NetworkFileErrorCode::InvalidTsv,
            Self::EmptyNetwork { .. } => NetworkFileErrorCode::EmptyNetwork,
        }
    }
}
