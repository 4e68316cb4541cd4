//! # arcview archive core
//!
//! Indexes an archive into a browsable tree and extracts single members or
//! whole directories out of it. Decoding is left to the format crates; this
//! crate only builds the two lookup tables a tree view needs and drives the
//! per-format readers.
//!
//! ## Supported Formats
//!
//! - ZIP
//! - TAR (plain, gzip, bzip2, xz)
//! - 7-Zip
//! - RAR (read-only)
//!
//! ## Example
//!
//! ```rust,no_run
//! use arcview_archive::{extract_entry, ArchiveTree, TreePresenter};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = ArchiveTree::index(Path::new("archive.zip"))?;
//! let presenter = TreePresenter::new(&tree);
//!
//! for row in presenter.rows_of("") {
//!     println!("{} {}", row.display_name, row.display_size);
//! }
//!
//! if let Some(entry) = tree.entry("docs/readme.txt") {
//!     extract_entry(tree.archive_path(), entry, Path::new("output"))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod error;
pub mod extract;
pub mod format;
pub mod index;
pub mod launch;
pub mod safety;
pub mod tree;
pub mod types;

// Re-export main types
pub use app::{AppContext, Command, ExtractEntry, ExtractJob, Lifecycle, OpenArchive, Outcome, Response, View};
pub use error::{ArchiveError, SecurityError};
pub use extract::extract_entry;
pub use format::{detect_format, ArchiveFormat, Member};
pub use index::{ArchiveTree, ChildIndex, PathIndex};
pub use launch::{banner, LaunchMode};
pub use tree::{format_size, Row, TreePresenter};
pub use types::{Entry, ExtractStats};
