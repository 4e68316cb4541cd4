//! Archive format detection and the per-format member headers.
//!
//! Every supported container exposes its members through [`Member`], so the
//! indexer and the extraction planner never look at format-specific records.

use crate::error::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    SevenZ,
    Rar,
}

impl ArchiveFormat {
    pub fn display_name(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "ZIP",
            ArchiveFormat::Tar => "TAR",
            ArchiveFormat::TarGz => "TAR.GZ",
            ArchiveFormat::TarBz2 => "TAR.BZ2",
            ArchiveFormat::TarXz => "TAR.XZ",
            ArchiveFormat::SevenZ => "7Z",
            ArchiveFormat::Rar => "RAR",
        }
    }

    pub fn is_tar(&self) -> bool {
        matches!(
            self,
            ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarBz2 | ArchiveFormat::TarXz
        )
    }

    /// File extensions offered by the open-archive dialog.
    pub fn all_extensions() -> &'static [&'static str] {
        &["zip", "tar", "gz", "tgz", "bz2", "tbz2", "tbz", "xz", "txz", "7z", "rar"]
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Detect the format of `path`, by extension first and by magic bytes second.
pub fn detect_format(path: &Path) -> Result<ArchiveFormat> {
    if let Some(format) = format_from_extension(path) {
        return Ok(format);
    }

    let mut head = [0u8; 512];
    let mut file = File::open(path)?;
    let read = read_up_to(&mut file, &mut head)?;

    format_from_magic(&head[..read]).ok_or_else(|| {
        ArchiveError::UnsupportedFormat(format!("Unrecognized archive: {}", path.display()))
    })
}

fn format_from_extension(path: &Path) -> Option<ArchiveFormat> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();

    let format = if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        ArchiveFormat::TarGz
    } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") || name.ends_with(".tbz") {
        ArchiveFormat::TarBz2
    } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
        ArchiveFormat::TarXz
    } else if name.ends_with(".tar") {
        ArchiveFormat::Tar
    } else if name.ends_with(".zip") {
        ArchiveFormat::Zip
    } else if name.ends_with(".7z") {
        ArchiveFormat::SevenZ
    } else if name.ends_with(".rar") {
        ArchiveFormat::Rar
    } else {
        return None;
    };
    Some(format)
}

fn format_from_magic(head: &[u8]) -> Option<ArchiveFormat> {
    const ZIP: &[u8] = b"PK\x03\x04";
    const ZIP_EMPTY: &[u8] = b"PK\x05\x06";
    const SEVEN_Z: &[u8] = b"7z\xBC\xAF\x27\x1C";
    const RAR: &[u8] = b"Rar!\x1A\x07";
    const GZIP: &[u8] = b"\x1F\x8B";
    const BZIP2: &[u8] = b"BZh";
    const XZ: &[u8] = b"\xFD7zXZ\x00";

    if head.starts_with(ZIP) || head.starts_with(ZIP_EMPTY) {
        Some(ArchiveFormat::Zip)
    } else if head.starts_with(SEVEN_Z) {
        Some(ArchiveFormat::SevenZ)
    } else if head.starts_with(RAR) {
        Some(ArchiveFormat::Rar)
    } else if head.starts_with(GZIP) {
        Some(ArchiveFormat::TarGz)
    } else if head.starts_with(BZIP2) {
        Some(ArchiveFormat::TarBz2)
    } else if head.starts_with(XZ) {
        Some(ArchiveFormat::TarXz)
    } else if head.len() >= 262 && &head[257..262] == b"ustar" {
        Some(ArchiveFormat::Tar)
    } else {
        None
    }
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// The metadata every archive member exposes, whatever its container.
pub trait Member {
    /// Path of the member as stored in the archive.
    fn name(&self) -> Cow<'_, str>;

    /// Uncompressed size in bytes.
    fn size(&self) -> u64;

    fn is_directory(&self) -> bool;

    /// Symbolic or hard link. Links are neither listed nor extracted.
    fn is_link(&self) -> bool {
        false
    }
}

/// Central directory record of a zip member.
pub(crate) struct ZipHeader {
    pub(crate) name: String,
    pub(crate) size: u64,
    pub(crate) is_dir: bool,
}

impl Member for ZipHeader {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn is_directory(&self) -> bool {
        self.is_dir
    }
}

impl<'a, R: Read> Member for tar::Entry<'a, R> {
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(String::from_utf8_lossy(&self.path_bytes()).into_owned())
    }

    fn size(&self) -> u64 {
        tar::Entry::size(self)
    }

    fn is_directory(&self) -> bool {
        self.header().entry_type().is_dir()
    }

    fn is_link(&self) -> bool {
        let kind = self.header().entry_type();
        kind.is_symlink() || kind.is_hard_link()
    }
}

impl Member for sevenz_rust2::SevenZArchiveEntry {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(sevenz_rust2::SevenZArchiveEntry::name(self))
    }

    fn size(&self) -> u64 {
        sevenz_rust2::SevenZArchiveEntry::size(self)
    }

    fn is_directory(&self) -> bool {
        sevenz_rust2::SevenZArchiveEntry::is_directory(self)
    }
}

impl Member for unrar::FileHeader {
    fn name(&self) -> Cow<'_, str> {
        self.filename.to_string_lossy()
    }

    fn size(&self) -> u64 {
        self.unpacked_size
    }

    fn is_directory(&self) -> bool {
        unrar::FileHeader::is_directory(self)
    }
}

/// Open the tar stream of `path`, undoing the outer compression.
pub(crate) fn open_tar(path: &Path, format: ArchiveFormat) -> Result<tar::Archive<Box<dyn Read>>> {
    use bzip2::read::BzDecoder;
    use flate2::read::GzDecoder;
    use xz2::read::XzDecoder;

    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(file)),
        ArchiveFormat::TarBz2 => Box::new(BzDecoder::new(file)),
        ArchiveFormat::TarXz => Box::new(XzDecoder::new(file)),
        _ => Box::new(file),
    };
    Ok(tar::Archive::new(reader))
}

/// Visit the header of every member of the archive, in archive order.
///
/// Member contents are skipped, not extracted. Compressed tar streams are
/// decoded as they are read, never buffered whole.
pub fn for_each_member(
    path: &Path,
    format: ArchiveFormat,
    visit: &mut dyn FnMut(&dyn Member) -> Result<()>,
) -> Result<()> {
    match format {
        ArchiveFormat::Zip => walk_zip(path, visit),
        ArchiveFormat::SevenZ => walk_7z(path, visit),
        ArchiveFormat::Rar => walk_rar(path, visit),
        tar_format => walk_tar(path, tar_format, visit),
    }
}

fn walk_zip(path: &Path, visit: &mut dyn FnMut(&dyn Member) -> Result<()>) -> Result<()> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(ArchiveError::read)?;

    for i in 0..archive.len() {
        // Raw access skips decryption, so encrypted members can still be listed
        let entry = archive.by_index_raw(i).map_err(ArchiveError::read)?;
        let header = ZipHeader {
            name: entry.name().to_string(),
            size: entry.size(),
            is_dir: entry.is_dir(),
        };
        drop(entry);
        visit(&header)?;
    }
    Ok(())
}

fn walk_tar(
    path: &Path,
    format: ArchiveFormat,
    visit: &mut dyn FnMut(&dyn Member) -> Result<()>,
) -> Result<()> {
    let mut archive = open_tar(path, format)?;

    for entry_result in archive.entries().map_err(ArchiveError::read)? {
        let entry = entry_result.map_err(ArchiveError::read)?;
        visit(&entry)?;
    }
    Ok(())
}

fn walk_7z(path: &Path, visit: &mut dyn FnMut(&dyn Member) -> Result<()>) -> Result<()> {
    use sevenz_rust2::{Password, SevenZReader};

    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let sz = SevenZReader::new(file, file_len, Password::empty()).map_err(ArchiveError::read)?;

    for entry in sz.archive().files.iter() {
        visit(entry)?;
    }
    Ok(())
}

fn walk_rar(path: &Path, visit: &mut dyn FnMut(&dyn Member) -> Result<()>) -> Result<()> {
    let archive = unrar::Archive::new(path)
        .open_for_listing()
        .map_err(ArchiveError::read)?;
    let mut current = Some(archive);

    while let Some(arch) = current {
        match arch.read_header().map_err(ArchiveError::read)? {
            Some(header) => {
                visit(header.entry())?;
                current = Some(header.skip().map_err(ArchiveError::read)?);
            }
            None => {
                current = None;
            }
        }
    }
    Ok(())
}
