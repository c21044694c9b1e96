//! Error types for artifact transformation.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when rewriting artifacts, along with a convenient
//! [`Result<T>`] type alias.
//!
//! Two classes of failure exist and only one of them surfaces here:
//! configuration and structural errors (bad patterns, unreadable containers,
//! output conflicts) are returned as `Err` and abort the affected input,
//! while per-entry failures inside a container are handled fail-soft by the
//! container actions — the original bytes are passed through and the failure
//! is counted in [`ContainerChanges::failed`](crate::ContainerChanges).

use std::io;

/// The main error type for artifact transformation operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file or archive operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive structure is corrupt or truncated.
    ///
    /// The offset points at the byte where parsing gave up. When an archive
    /// nested inside another container fails this way, the outer container
    /// treats it as a per-entry failure rather than aborting the run.
    #[error("Corrupt archive at offset {offset:#x}: {reason}")]
    CorruptArchive {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// The archive uses a feature this crate does not support (e.g. zip64).
    #[error("Unsupported archive feature: {feature}")]
    UnsupportedFeature {
        /// The name of the unsupported feature.
        feature: &'static str,
    },

    /// An entry name could not be decoded or re-encoded.
    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    /// A selection glob pattern failed to compile.
    #[error("Invalid selection pattern: {0}")]
    InvalidPattern(String),

    /// A rename rule is malformed (empty key, duplicate key, empty target).
    #[error("Invalid rename rule: {0}")]
    InvalidRule(String),

    /// A driver-level configuration error: missing input, output exists
    /// without overwrite permission, or mismatched input/output kinds.
    ///
    /// Configuration errors are fatal and reported before any entry is
    /// processed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An entry handed to a text action is not valid UTF-8.
    ///
    /// Container actions catch this, count the entry as failed, and copy
    /// the original bytes through.
    #[error("Entry '{name}' is not valid UTF-8 text")]
    MalformedText {
        /// The name of the offending entry.
        name: String,
    },
}

/// A specialized `Result` type for transformation operations.
pub type Result<T> = std::result::Result<T, Error>;
