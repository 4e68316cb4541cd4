//! Toolkit-independent application context.
//!
//! The GUI shell translates user actions into [`Command`]s and hands them to
//! [`AppContext::dispatch`]. Extraction is one-shot: its [`Outcome`] travels
//! back to the context, and [`AppContext::shutdown`] turns it into the exit
//! code the entry point terminates with.

use crate::extract::extract_entry;
use crate::index::ArchiveTree;
use crate::launch::LaunchMode;
use crate::tree::TreePresenter;
use crate::types::{Entry, ExtractStats};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Open an archive and show its tree.
#[derive(Debug, Clone, Serialize)]
pub struct OpenArchive {
    pub archive_path: PathBuf,
}

/// Extract one entry of the current archive.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractEntry {
    pub archive_path: PathBuf,
    pub entry: Entry,
    /// `None` until the user picked a folder; a request without one is a cancelled prompt.
    pub destination: Option<PathBuf>,
}

impl ExtractEntry {
    pub fn new(archive_path: &Path, entry: Entry) -> Self {
        Self {
            archive_path: archive_path.to_path_buf(),
            entry,
            destination: None,
        }
    }

    pub fn with_destination(mut self, destination: Option<PathBuf>) -> Self {
        self.destination = destination;
        self
    }

    /// Where the destination prompt opens: the archive's own folder.
    pub fn picker_location(&self) -> PathBuf {
        self.archive_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    OpenArchive(OpenArchive),
    ExtractEntry(ExtractEntry),
}

/// What the shell should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum View {
    /// The "choose an archive" screen, with the last open error if any.
    OpenArchive { error: Option<String> },
    /// The tree of the loaded archive.
    Tree { archive_path: PathBuf },
}

/// Result of dispatching a command.
#[derive(Debug)]
pub enum Response {
    /// The view changed.
    View(View),
    /// An extraction was accepted and must be run off the UI thread.
    Extract(ExtractJob),
    /// Nothing to do: the prompt was cancelled or an extraction already runs.
    Ignored,
}

/// An accepted extraction, ready to run.
#[derive(Debug)]
pub struct ExtractJob {
    archive_path: PathBuf,
    entry: Entry,
    destination: PathBuf,
}

impl ExtractJob {
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Run the extraction; blocks until the archive is closed again.
    pub fn run(self) -> Outcome {
        match extract_entry(&self.archive_path, &self.entry, &self.destination) {
            Ok(stats) => Outcome::Done(stats),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    Done(ExtractStats),
    Failed(String),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Done(_) => 0,
            Outcome::Failed(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Init,
    Running,
    ShuttingDown,
}

pub struct AppContext {
    lifecycle: Lifecycle,
    view: View,
    tree: Option<ArchiveTree>,
    extracting: bool,
    outcome: Option<Outcome>,
}

impl AppContext {
    /// Build the context for a launch. An archive named on the command line
    /// is opened right away; if that fails the open view shows the error.
    pub fn init(mode: &LaunchMode) -> Self {
        let mut ctx = Self {
            lifecycle: Lifecycle::Init,
            view: View::OpenArchive { error: None },
            tree: None,
            extracting: false,
            outcome: None,
        };

        if let LaunchMode::Open(path) = mode {
            ctx.dispatch(Command::OpenArchive(OpenArchive {
                archive_path: path.clone(),
            }));
        }
        ctx
    }

    /// Enter the running state and return the first view to show.
    pub fn run(&mut self) -> View {
        self.lifecycle = Lifecycle::Running;
        self.view.clone()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn tree(&self) -> Option<&ArchiveTree> {
        self.tree.as_ref()
    }

    pub fn presenter(&self) -> Option<TreePresenter<'_>> {
        self.tree.as_ref().map(TreePresenter::new)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// The single entry point for user actions.
    pub fn dispatch(&mut self, command: Command) -> Response {
        match command {
            Command::OpenArchive(open) => Response::View(self.open(&open.archive_path)),
            Command::ExtractEntry(request) => self.accept_extract(request),
        }
    }

    fn open(&mut self, archive_path: &Path) -> View {
        match ArchiveTree::index(archive_path) {
            Ok(tree) => {
                self.tree = Some(tree);
                self.view = View::Tree {
                    archive_path: archive_path.to_path_buf(),
                };
            }
            Err(e) => {
                tracing::warn!(archive = %archive_path.display(), error = %e, "cannot open archive");
                self.tree = None;
                self.view = View::OpenArchive {
                    error: Some(e.to_string()),
                };
            }
        }
        self.view.clone()
    }

    fn accept_extract(&mut self, request: ExtractEntry) -> Response {
        let Some(destination) = request.destination else {
            tracing::debug!(member = %request.entry.path, "destination prompt cancelled");
            return Response::Ignored;
        };
        if self.extracting || self.lifecycle == Lifecycle::ShuttingDown {
            tracing::warn!(member = %request.entry.path, "extraction already in progress");
            return Response::Ignored;
        }

        self.extracting = true;
        Response::Extract(ExtractJob {
            archive_path: request.archive_path,
            entry: request.entry,
            destination,
        })
    }

    /// Record how the extraction ended. The session is over afterwards.
    pub fn finish(&mut self, outcome: Outcome) {
        self.extracting = false;
        self.lifecycle = Lifecycle::ShuttingDown;
        self.outcome = Some(outcome);
    }

    /// Log the outcome and return the process exit code.
    ///
    /// A session closed without extracting anything exits with 0.
    pub fn shutdown(&mut self) -> i32 {
        self.lifecycle = Lifecycle::ShuttingDown;
        match &self.outcome {
            Some(Outcome::Done(stats)) => {
                tracing::info!(
                    files = stats.files_extracted,
                    bytes = stats.bytes_written,
                    "extraction done, exiting"
                );
                0
            }
            Some(Outcome::Failed(error)) => {
                tracing::error!(%error, "extraction failed, exiting");
                1
            }
            None => 0,
        }
    }
}
