//! Path checks applied before any member is written to disk.
//!
//! A member's output path is derived from its archive name, so a crafted
//! name such as `../../etc/passwd` must never escape the destination.

use crate::error::SecurityError;
use std::path::{Component, Path, PathBuf};

/// Validates and normalizes a relative output path derived from a member name.
///
/// - Rejects absolute paths
/// - Rejects paths containing ".." components
/// - Drops "." components and redundant separators
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use arcview_archive::safety::validate_entry_path;
///
/// let safe_path = validate_entry_path(Path::new("dir/file.txt")).unwrap();
/// assert_eq!(safe_path, Path::new("dir/file.txt"));
///
/// assert!(validate_entry_path(Path::new("../../etc/passwd")).is_err());
/// assert!(validate_entry_path(Path::new("/etc/passwd")).is_err());
/// ```
pub fn validate_entry_path(path: &Path) -> Result<PathBuf, SecurityError> {
    if path.is_absolute() {
        return Err(SecurityError::AbsolutePath(path.display().to_string()));
    }

    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => continue,
            Component::ParentDir => {
                return Err(SecurityError::PathTraversal(format!(
                    "Path contains '..' component: {}",
                    path.display()
                )));
            }
            // Windows drive prefixes count as absolute too
            Component::RootDir | Component::Prefix(_) => {
                return Err(SecurityError::AbsolutePath(path.display().to_string()));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(SecurityError::PathTraversal(
            "Path normalizes to empty".to_string(),
        ));
    }

    Ok(normalized)
}
