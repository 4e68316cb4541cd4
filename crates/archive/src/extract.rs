//! Extraction of a single member, or of a directory member and everything below it.

use crate::error::{ArchiveError, Result};
use crate::format::{detect_format, open_tar, ArchiveFormat, Member, ZipHeader};
use crate::safety::validate_entry_path;
use crate::types::{is_hidden, split_path, Entry, ExtractStats};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Extract `entry` from the archive into `destination`.
///
/// The selected member keeps its own base name and drops its parents, so
/// extracting `a/b/` writes `destination/b/...` and extracting
/// `docs/real.txt` writes `destination/real.txt`. macOS `._` members inside
/// an extracted directory are skipped.
///
/// The archive is opened for this call only.
///
/// # Errors
///
/// Returns an error if:
/// - The archive or the destination directory doesn't exist
/// - No member of the archive matches `entry`
/// - A member name would escape the destination
/// - Decoding or writing a member fails
pub fn extract_entry(archive_path: &Path, entry: &Entry, destination: &Path) -> Result<ExtractStats> {
    if !archive_path.exists() {
        return Err(ArchiveError::NotFound(archive_path.to_path_buf()));
    }
    if !destination.is_dir() {
        return Err(ArchiveError::DestinationNotDirectory(destination.to_path_buf()));
    }

    let format = detect_format(archive_path)?;
    tracing::info!(
        archive = %archive_path.display(),
        member = %entry.path,
        destination = %destination.display(),
        "extracting"
    );

    let mut selection = Selection::new(entry, destination);
    match format {
        ArchiveFormat::Zip => unpack_zip(archive_path, &mut selection)?,
        ArchiveFormat::SevenZ => unpack_7z(archive_path, &mut selection)?,
        ArchiveFormat::Rar => unpack_rar(archive_path, &mut selection)?,
        tar_format => unpack_tar(archive_path, tar_format, &mut selection)?,
    }

    if !selection.matched {
        return Err(ArchiveError::MemberNotFound(entry.path.clone()));
    }

    tracing::info!(
        files = selection.stats.files_extracted,
        directories = selection.stats.directories_created,
        bytes = selection.stats.bytes_written,
        "extraction finished"
    );
    Ok(selection.stats)
}

/// Decides, member by member, whether and where a member is written.
struct Selection<'a> {
    target: &'a str,
    subtree: bool,
    parent_prefix: &'a str,
    destination: &'a Path,
    matched: bool,
    stats: ExtractStats,
}

impl<'a> Selection<'a> {
    fn new(entry: &'a Entry, destination: &'a Path) -> Self {
        Self {
            target: entry.path.trim_end_matches('/'),
            subtree: entry.is_directory,
            parent_prefix: split_path(&entry.path).0,
            destination,
            matched: false,
            stats: ExtractStats::default(),
        }
    }

    fn selects(&self, name: &str) -> bool {
        if name == self.target {
            return true;
        }
        self.subtree
            && name
                .strip_prefix(self.target)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Output file for `member`, or `None` when nothing is to be written.
    ///
    /// Directory members are created here and never yield a path.
    fn plan(&mut self, member: &dyn Member) -> Result<Option<PathBuf>> {
        let name = member.name();
        let name = name.trim_end_matches('/');
        if !self.selects(name) || is_hidden(name) || member.is_link() {
            return Ok(None);
        }
        self.matched = true;

        let relative = Path::new(&name[self.parent_prefix.len()..]);
        // A `./` member stands for the destination itself
        if member.is_directory() && relative.components().all(|c| c == Component::CurDir) {
            return Ok(None);
        }
        let output = self.destination.join(validate_entry_path(relative)?);

        if member.is_directory() {
            self.create_dirs(&output)?;
            return Ok(None);
        }

        if let Some(parent) = output.parent() {
            self.create_dirs(parent)?;
        }
        Ok(Some(output))
    }

    /// `create_dir_all`, counting every directory it had to make.
    fn create_dirs(&mut self, dir: &Path) -> Result<()> {
        let missing = dir.ancestors().take_while(|p| !p.is_dir()).count();
        if missing > 0 {
            fs::create_dir_all(dir)?;
            self.stats.directories_created += missing as u64;
        }
        Ok(())
    }

    fn wrote(&mut self, output: &Path, bytes: u64) {
        tracing::debug!(file = %output.display(), bytes, "wrote member");
        self.stats.files_extracted += 1;
        self.stats.bytes_written += bytes;
    }
}

fn decode_error(err: impl std::fmt::Display) -> ArchiveError {
    ArchiveError::Extract(err.to_string())
}

fn unpack_zip(path: &Path, selection: &mut Selection<'_>) -> Result<()> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(decode_error)?;

    for i in 0..archive.len() {
        let header = {
            let raw = archive.by_index_raw(i).map_err(decode_error)?;
            ZipHeader {
                name: raw.name().to_string(),
                size: raw.size(),
                is_dir: raw.is_dir(),
            }
        };

        if let Some(output) = selection.plan(&header)? {
            let mut member = archive.by_index(i).map_err(decode_error)?;
            let mut out = File::create(&output)?;
            let written = io::copy(&mut member, &mut out)?;
            selection.wrote(&output, written);
        }
    }
    Ok(())
}

fn unpack_tar(path: &Path, format: ArchiveFormat, selection: &mut Selection<'_>) -> Result<()> {
    let mut archive = open_tar(path, format).map_err(ArchiveError::into_extract)?;

    for entry_result in archive.entries().map_err(decode_error)? {
        let mut entry = entry_result.map_err(decode_error)?;
        if let Some(output) = selection.plan(&entry)? {
            let mut out = File::create(&output)?;
            let written = io::copy(&mut entry, &mut out)?;
            selection.wrote(&output, written);
        }
    }
    Ok(())
}

fn unpack_7z(path: &Path, selection: &mut Selection<'_>) -> Result<()> {
    use sevenz_rust2::{Password, SevenZReader};

    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut sz = SevenZReader::new(file, file_len, Password::empty()).map_err(decode_error)?;

    // The callback can only report the library's error type, so ours is kept aside
    let mut failure: Option<ArchiveError> = None;
    sz.for_each_entries(|entry, reader| {
        // Each folder restarts the walk, so stop every later one too
        if failure.is_some() {
            return Ok(false);
        }
        let step = match selection.plan(entry) {
            Ok(Some(output)) => File::create(&output)
                .and_then(|mut out| io::copy(reader, &mut out))
                .map(|written| selection.wrote(&output, written))
                .map_err(ArchiveError::from),
            // Solid blocks are decoded sequentially, unread data has to be consumed
            Ok(None) => io::copy(reader, &mut io::sink())
                .map(|_| ())
                .map_err(ArchiveError::from),
            Err(e) => Err(e),
        };
        match step {
            Ok(()) => Ok(true),
            Err(e) => {
                failure = Some(e);
                Ok(false)
            }
        }
    })
    .map_err(decode_error)?;

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn unpack_rar(path: &Path, selection: &mut Selection<'_>) -> Result<()> {
    let archive = unrar::Archive::new(path)
        .open_for_processing()
        .map_err(decode_error)?;
    let mut current = Some(archive);

    while let Some(arch) = current {
        match arch.read_header().map_err(decode_error)? {
            Some(header) => {
                let planned = selection.plan(header.entry())?;
                let size = header.entry().unpacked_size;
                current = Some(match planned {
                    Some(output) => {
                        let next = header.extract_to(&output).map_err(decode_error)?;
                        selection.wrote(&output, size);
                        next
                    }
                    None => header.skip().map_err(decode_error)?,
                });
            }
            None => {
                current = None;
            }
        }
    }
    Ok(())
}
