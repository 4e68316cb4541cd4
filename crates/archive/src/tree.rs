//! Read-only tree view over an [`ArchiveTree`].
//!
//! These are the queries a GUI tree widget asks while it renders: the child
//! ids of a node, whether a node can be expanded, and the row for a node.

use crate::app::ExtractEntry;
use crate::index::ArchiveTree;
use serde::Serialize;

/// One rendered tree row.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    /// Node id, the full entry path.
    pub id: String,
    pub display_name: String,
    /// Human-readable size; empty for directories.
    pub display_size: String,
    pub is_branch: bool,
    /// Command bound to this row's entry.
    pub extract: ExtractEntry,
}

pub struct TreePresenter<'a> {
    tree: &'a ArchiveTree,
}

impl<'a> TreePresenter<'a> {
    pub fn new(tree: &'a ArchiveTree) -> Self {
        Self { tree }
    }

    /// Paths of the direct children of `node`; `""` is the archive root.
    pub fn children_of(&self, node: &str) -> Vec<String> {
        self.tree
            .children(node)
            .iter()
            .map(|e| e.path.clone())
            .collect()
    }

    pub fn is_branch(&self, node: &str) -> bool {
        !self.tree.children(node).is_empty()
    }

    /// Row for `node`, or `None` if no such entry was indexed.
    pub fn render_row(&self, node: &str) -> Option<Row> {
        let entry = self.tree.entry(node)?;
        let display_size = if entry.is_directory {
            String::new()
        } else {
            format_size(entry.size)
        };

        Some(Row {
            id: entry.path.clone(),
            display_name: entry.base_name().to_string(),
            display_size,
            is_branch: self.is_branch(&entry.path),
            extract: ExtractEntry::new(self.tree.archive_path(), entry.clone()),
        })
    }

    /// Rows for every child of `node`, in archive order.
    pub fn rows_of(&self, node: &str) -> Vec<Row> {
        self.tree
            .children(node)
            .iter()
            .filter_map(|e| self.render_row(&e.path))
            .collect()
    }
}

/// Format a byte count with decimal units, e.g. `1.5 MB` or `10 B`.
///
/// Values under ten units keep one decimal, larger ones are rounded to a
/// whole number.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 10 {
        return format!("{} B", bytes);
    }

    let mut exp = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1000.0 && exp < UNITS.len() - 1 {
        scaled /= 1000.0;
        exp += 1;
    }

    let rounded = (scaled * 10.0 + 0.5).floor() / 10.0;
    if rounded < 10.0 {
        format!("{:.1} {}", rounded, UNITS[exp])
    } else {
        format!("{:.0} {}", rounded, UNITS[exp])
    }
}
