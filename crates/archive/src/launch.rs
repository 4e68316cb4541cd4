//! Command-line handling of the GUI binary.
//!
//! The GUI takes at most one argument: an archive to open, or a version flag.

use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// Print [`banner`] and exit.
    Version,
    /// Open straight into the tree of this archive.
    Open(PathBuf),
    /// Start on the "choose an archive" view.
    Blank,
}

impl LaunchMode {
    /// Interpret the arguments that follow the program name.
    ///
    /// Anything other than exactly one argument starts blank.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.len() != 1 {
            return LaunchMode::Blank;
        }

        let arg = args.remove(0);
        if arg == "-version" || arg == "--version" {
            LaunchMode::Version
        } else {
            LaunchMode::Open(PathBuf::from(arg))
        }
    }
}

/// Name, copyright and project URL, one per line.
pub fn banner() -> String {
    format!(
        "arcview {}\nCopyright (c) 2026 arcview contributors\nSee {} for more information.",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_REPOSITORY"),
    )
}
