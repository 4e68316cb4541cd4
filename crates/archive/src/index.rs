//! Archive indexing: a full scan of the members into two lookup tables.

use crate::error::{ArchiveError, Result};
use crate::format::{detect_format, for_each_member, ArchiveFormat, Member};
use crate::types::{directory_key, is_hidden, split_path, Entry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Full entry path to entry.
pub type PathIndex = HashMap<String, Entry>;

/// Directory key (parent path with trailing `/`, `""` for the root) to its
/// direct children in archive order.
pub type ChildIndex = HashMap<String, Vec<Entry>>;

/// The indexed view of one archive.
///
/// Built once by [`ArchiveTree::index`] and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveTree {
    archive_path: PathBuf,
    format: ArchiveFormat,
    paths: PathIndex,
    children: ChildIndex,
}

impl ArchiveTree {
    /// Scan the archive at `archive_path` and index every eligible member.
    ///
    /// # Errors
    ///
    /// Any failure to open, detect or scan the archive aborts indexing; no
    /// partial tree is returned.
    pub fn index(archive_path: &Path) -> Result<Self> {
        if !archive_path.exists() {
            return Err(ArchiveError::NotFound(archive_path.to_path_buf()));
        }

        let format = detect_format(archive_path)?;
        let mut builder = TreeBuilder::default();
        let mut skipped = 0usize;

        for_each_member(archive_path, format, &mut |member: &dyn Member| {
            let name = member.name();
            if is_hidden(&name) {
                tracing::debug!(member = %name, "skipping macOS metadata member");
                skipped += 1;
                return Ok(());
            }
            if member.is_link() {
                tracing::debug!(member = %name, "skipping link member");
                skipped += 1;
                return Ok(());
            }
            builder.insert(Entry::new(name.into_owned(), member.size(), member.is_directory()));
            Ok(())
        })?;

        tracing::info!(
            archive = %archive_path.display(),
            format = %format,
            entries = builder.paths.len(),
            skipped,
            "indexed archive"
        );

        Ok(builder.finish(archive_path.to_path_buf(), format))
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    pub fn path_index(&self) -> &PathIndex {
        &self.paths
    }

    pub fn child_index(&self) -> &ChildIndex {
        &self.children
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Look up an entry by path, with or without a directory's trailing `/`.
    pub fn entry(&self, path: &str) -> Option<&Entry> {
        self.paths
            .get(path)
            .or_else(|| self.paths.get(&directory_key(path)))
    }

    /// Direct children of a node, empty when the node has none.
    pub fn children(&self, node: &str) -> &[Entry] {
        self.children
            .get(&directory_key(node))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Accumulates entries while the archive is scanned.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    paths: PathIndex,
    children: ChildIndex,
}

impl TreeBuilder {
    /// Index one member under its parent, inferring missing ancestors.
    ///
    /// A member named after the archive root itself (`""`, `"/"`) is dropped.
    pub(crate) fn insert(&mut self, entry: Entry) {
        if entry.path.trim_matches('/').is_empty() {
            return;
        }
        let parent = split_path(&entry.path).0.to_string();
        self.ensure_directory(&parent);
        self.place(parent, entry);
    }

    pub(crate) fn finish(self, archive_path: PathBuf, format: ArchiveFormat) -> ArchiveTree {
        ArchiveTree {
            archive_path,
            format,
            paths: self.paths,
            children: self.children,
        }
    }

    fn ensure_directory(&mut self, dir: &str) {
        if dir.is_empty() || self.paths.contains_key(dir) {
            return;
        }
        let parent = split_path(dir).0;
        self.ensure_directory(parent);
        self.place(parent.to_string(), Entry::inferred_directory(dir));
    }

    /// A path seen twice keeps its first position and takes the later metadata.
    fn place(&mut self, parent: String, entry: Entry) {
        if let Some(existing) = self.paths.get_mut(&entry.path) {
            if let Some(slot) = self
                .children
                .get_mut(&parent)
                .and_then(|siblings| siblings.iter_mut().find(|e| e.path == entry.path))
            {
                *slot = entry.clone();
            }
            *existing = entry;
            return;
        }

        self.children.entry(parent).or_default().push(entry.clone());
        self.paths.insert(entry.path.clone(), entry);
    }
}
