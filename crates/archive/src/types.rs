//! Type definitions shared by the indexer, the presenter and extraction.

use serde::{Deserialize, Serialize};

/// Name prefix of the extended-attribute shadow files macOS writes into archives.
pub const APPLE_DOUBLE_PREFIX: &str = "._";

/// One indexed archive member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Path of the member within the archive. Directories end with `/`.
    pub path: String,

    /// Uncompressed size in bytes
    pub size: u64,

    /// Whether this member is a directory
    pub is_directory: bool,
}

impl Entry {
    pub fn new(path: impl Into<String>, size: u64, is_directory: bool) -> Self {
        let mut path = path.into();
        if is_directory && !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        Self {
            path,
            size,
            is_directory,
        }
    }

    /// Directory entry for an ancestor the archive never listed itself.
    pub(crate) fn inferred_directory(path: &str) -> Self {
        Self::new(path, 0, true)
    }

    /// Final path segment, ignoring a trailing separator.
    pub fn base_name(&self) -> &str {
        split_path(&self.path).1
    }

    /// Whether this is a macOS `._` metadata member.
    pub fn is_hidden(&self) -> bool {
        is_hidden(&self.path)
    }
}

/// Split a member path into `(parent_dir, base_name)` at the last `/`.
///
/// The trailing separator of a directory is stripped first and the parent
/// keeps its own trailing separator, so `"a/b/"` splits into `("a/", "b")`.
/// Members at the archive root have the empty string as parent.
pub fn split_path(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => (&trimmed[..=idx], &trimmed[idx + 1..]),
        None => ("", trimmed),
    }
}

/// Whether the final segment of `path` starts with `._`.
pub fn is_hidden(path: &str) -> bool {
    split_path(path).1.starts_with(APPLE_DOUBLE_PREFIX)
}

/// Key under which the children of `node` are stored.
///
/// Tree node ids may come with or without the trailing separator.
pub fn directory_key(node: &str) -> String {
    if node.is_empty() || node.ends_with('/') {
        node.to_string()
    } else {
        format!("{node}/")
    }
}

/// Statistics about a completed extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractStats {
    /// Number of files written
    pub files_extracted: u64,

    /// Number of directories created
    pub directories_created: u64,

    /// Total bytes written to disk
    pub bytes_written: u64,
}
