//! Fixture builders for the formats without a writer in the tar/zip family.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Build a 7z archive from `files`; names ending in `/` become directories.
///
/// The archive is written from a staging directory, so it also carries a
/// member for that directory itself, named `""`.
pub fn create_7z_archive(archive_path: &Path, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    let staging = tempfile::TempDir::new()?;
    for (name, content) in files {
        let path = staging.path().join(name);
        if name.ends_with('/') {
            fs::create_dir_all(&path)?;
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
        }
    }

    sevenz_rust2::compress_to_path(staging.path(), archive_path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(data);
    crc.sum()
}

/// One RAR 1.5-4.x block: CRC16, type, flags, size, then the body.
fn rar_block(kind: u8, flags: u16, body: &[u8]) -> Vec<u8> {
    let mut rest = vec![kind];
    rest.extend_from_slice(&flags.to_le_bytes());
    rest.extend_from_slice(&(7 + body.len() as u16).to_le_bytes());
    rest.extend_from_slice(body);

    let mut block = ((crc32(&rest) & 0xFFFF) as u16).to_le_bytes().to_vec();
    block.extend(rest);
    block
}

/// Build a stored (uncompressed) RAR archive; names ending in `/` become directories.
pub fn create_rar_archive(archive_path: &Path, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    const MAIN_HEAD: u8 = 0x73;
    const FILE_HEAD: u8 = 0x74;
    const END_HEAD: u8 = 0x7B;
    const LONG_BLOCK: u16 = 0x8000;
    const DIRECTORY: u16 = 0x00E0;
    const HOST_WIN32: u8 = 2;
    const METHOD_STORE: u8 = 0x30;
    // 2020-01-01 00:00 in DOS format
    const DOS_TIME: u32 = 0x5021_0000;

    let mut out = b"Rar!\x1A\x07\x00".to_vec();
    out.extend(rar_block(MAIN_HEAD, 0, &[0u8; 6]));

    for (name, content) in files {
        let is_dir = name.ends_with('/');
        let stored_name = name.trim_end_matches('/').replace('/', "\\");
        let data: &[u8] = if is_dir { b"" } else { content };

        let mut body = Vec::new();
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.push(HOST_WIN32);
        body.extend_from_slice(&crc32(data).to_le_bytes());
        body.extend_from_slice(&DOS_TIME.to_le_bytes());
        body.push(20);
        body.push(METHOD_STORE);
        body.extend_from_slice(&(stored_name.len() as u16).to_le_bytes());
        let attributes: u32 = if is_dir { 0x10 } else { 0x20 };
        body.extend_from_slice(&attributes.to_le_bytes());
        body.extend_from_slice(stored_name.as_bytes());

        let flags = if is_dir { LONG_BLOCK | DIRECTORY } else { LONG_BLOCK };
        out.extend(rar_block(FILE_HEAD, flags, &body));
        out.extend_from_slice(data);
    }
    out.extend(rar_block(END_HEAD, 0x4000, &[]));

    File::create(archive_path)?.write_all(&out)
}
