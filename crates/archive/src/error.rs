//! Error types for archive indexing and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for indexing and extraction operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Archive file not found at the specified path.
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    /// The archive format could not be determined or is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The archive could not be opened or scanned.
    #[error("Cannot read archive: {0}")]
    Read(String),

    /// Decoding a member failed while extracting it.
    #[error("Cannot extract archive member: {0}")]
    Extract(String),

    /// The requested member is not present in the archive.
    #[error("Member not found in archive: {0}")]
    MemberNotFound(String),

    /// The extraction destination is missing or not a directory.
    #[error("Destination is not a directory: {0}")]
    DestinationNotDirectory(PathBuf),

    /// A member would be written outside of the destination.
    #[error("Security violation: {0}")]
    Security(#[from] SecurityError),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Wrap a third-party reader error raised while scanning.
    pub(crate) fn read(err: impl std::fmt::Display) -> Self {
        ArchiveError::Read(err.to_string())
    }

    /// Reclassify a scan failure as an extraction failure.
    pub(crate) fn into_extract(self) -> Self {
        match self {
            ArchiveError::Read(msg) => ArchiveError::Extract(msg),
            other => other,
        }
    }
}

/// Path safety violations found while planning an extraction.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Path traversal attempt detected (e.g., "../../../etc/passwd").
    #[error("Path traversal attempt: {0}")]
    PathTraversal(String),

    /// Absolute path not allowed in archive entries.
    #[error("Absolute path not allowed: {0}")]
    AbsolutePath(String),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
