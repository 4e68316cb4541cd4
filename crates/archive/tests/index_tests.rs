//! Integration tests for archive indexing and the tree presenter.

mod common;

use arcview_archive::{ArchiveError, ArchiveFormat, ArchiveTree, TreePresenter};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper function to create a test archive directory
fn setup_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Helper function to create a ZIP archive; names ending in `/` become directories
fn create_zip_archive(archive_path: &Path, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    let file = File::create(archive_path)?;
    let mut zip = zip::ZipWriter::new(file);

    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in files {
        if name.ends_with('/') {
            zip.add_directory(*name, options)?;
        } else {
            zip.start_file(*name, options)?;
            zip.write_all(content)?;
        }
    }

    zip.finish()?;
    Ok(())
}

fn append_tar_files<W: Write>(tar: &mut tar::Builder<W>, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        if name.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
        } else {
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
        }
        header.set_cksum();
        tar.append_data(&mut header, name, &content[..])?;
    }
    Ok(())
}

/// Helper function to create a plain TAR archive
fn create_tar_archive(archive_path: &Path, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    let file = File::create(archive_path)?;
    let mut tar = tar::Builder::new(file);
    append_tar_files(&mut tar, files)?;
    tar.finish()?;
    Ok(())
}

/// Helper function to create a TAR.GZ archive
fn create_tar_gz_archive(archive_path: &Path, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    let file = File::create(archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(encoder);
    append_tar_files(&mut tar, files)?;
    tar.into_inner()?.finish()?;
    Ok(())
}

/// Helper function to create a TAR.BZ2 archive
fn create_tar_bz2_archive(archive_path: &Path, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    use bzip2::write::BzEncoder;

    let file = File::create(archive_path)?;
    let encoder = BzEncoder::new(file, bzip2::Compression::default());
    let mut tar = tar::Builder::new(encoder);
    append_tar_files(&mut tar, files)?;
    tar.into_inner()?.finish()?;
    Ok(())
}

/// Helper function to create a TAR.XZ archive
fn create_tar_xz_archive(archive_path: &Path, files: &[(&str, &[u8])]) -> std::io::Result<()> {
    let mut tar = tar::Builder::new(Vec::new());
    append_tar_files(&mut tar, files)?;
    let raw = tar.into_inner()?;

    let mut out = File::create(archive_path)?;
    lzma_rs::xz_compress(&mut std::io::Cursor::new(raw), &mut out)?;
    Ok(())
}

fn child_paths(tree: &ArchiveTree, node: &str) -> Vec<String> {
    TreePresenter::new(tree).children_of(node)
}

#[test]
fn test_index_zip_counts() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("test.zip");

    create_zip_archive(
        &archive_path,
        &[
            ("docs/", b""),
            ("docs/a.txt", b"alpha"),
            ("docs/b.txt", b"beta"),
            ("readme.md", b"# readme"),
        ],
    )
    .expect("Failed to create ZIP");

    let tree = ArchiveTree::index(&archive_path).expect("Failed to index archive");

    assert_eq!(tree.format(), ArchiveFormat::Zip);
    assert_eq!(tree.len(), 4);
    let listed: usize = tree.child_index().values().map(Vec::len).sum();
    assert_eq!(listed, 4);

    assert_eq!(child_paths(&tree, ""), vec!["docs/", "readme.md"]);
    assert_eq!(child_paths(&tree, "docs/"), vec!["docs/a.txt", "docs/b.txt"]);
    assert_eq!(tree.entry("docs/a.txt").unwrap().size, 5);
}

#[test]
fn test_index_filters_apple_double_files() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("mac.zip");

    create_zip_archive(
        &archive_path,
        &[
            ("docs/", b""),
            ("docs/._hidden", b"xattr"),
            ("docs/real.txt", b"real"),
        ],
    )
    .expect("Failed to create ZIP");

    let tree = ArchiveTree::index(&archive_path).expect("Failed to index archive");

    assert!(tree.entry("docs/._hidden").is_none());
    assert!(tree.entry("docs/real.txt").is_some());
    assert_eq!(tree.child_index()["docs/"].len(), 1);
}

#[test]
fn test_index_infers_directories() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("nested.zip");

    create_zip_archive(&archive_path, &[("a/b/c.txt", b"see")]).expect("Failed to create ZIP");

    let tree = ArchiveTree::index(&archive_path).expect("Failed to index archive");
    let presenter = TreePresenter::new(&tree);

    assert_eq!(presenter.children_of("a/"), vec!["a/b/"]);
    assert_eq!(presenter.children_of("a/b/"), vec!["a/b/c.txt"]);
    assert!(presenter.is_branch("a/b/"));
    assert!(tree.entry("a/b/").unwrap().is_directory);
}

#[test]
fn test_index_is_idempotent() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("twice.tar.gz");

    create_tar_gz_archive(
        &archive_path,
        &[("src/", b""), ("src/main.rs", b"fn main() {}"), ("Cargo.toml", b"[package]")],
    )
    .expect("Failed to create TAR.GZ");

    let first = ArchiveTree::index(&archive_path).unwrap();
    let second = ArchiveTree::index(&archive_path).unwrap();

    assert_eq!(first.path_index(), second.path_index());
    assert_eq!(first.child_index(), second.child_index());
}

#[test]
fn test_index_tar_variants() {
    let temp_dir = setup_test_dir();
    let files: &[(&str, &[u8])] = &[("dir/", b""), ("dir/file.txt", b"Hello, TAR!")];

    let cases: Vec<(PathBuf, ArchiveFormat)> = vec![
        (temp_dir.path().join("t.tar"), ArchiveFormat::Tar),
        (temp_dir.path().join("t.tar.gz"), ArchiveFormat::TarGz),
        (temp_dir.path().join("t.tar.bz2"), ArchiveFormat::TarBz2),
        (temp_dir.path().join("t.tar.xz"), ArchiveFormat::TarXz),
    ];

    create_tar_archive(&cases[0].0, files).unwrap();
    create_tar_gz_archive(&cases[1].0, files).unwrap();
    create_tar_bz2_archive(&cases[2].0, files).unwrap();
    create_tar_xz_archive(&cases[3].0, files).unwrap();

    for (path, format) in cases {
        let tree = ArchiveTree::index(&path).unwrap_or_else(|e| panic!("{format}: {e}"));
        assert_eq!(tree.format(), format);
        assert_eq!(tree.len(), 2, "{format}");
        assert_eq!(child_paths(&tree, "dir/"), vec!["dir/file.txt"], "{format}");
        assert_eq!(tree.entry("dir/file.txt").unwrap().size, 11, "{format}");
    }
}

#[test]
fn test_index_tar_directory_without_trailing_slash() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("noslash.tar");

    let file = File::create(&archive_path).unwrap();
    let mut tar = tar::Builder::new(file);
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Directory);
    header.set_size(0);
    header.set_mode(0o755);
    header.set_cksum();
    tar.append_data(&mut header, "pkg", std::io::empty()).unwrap();
    append_tar_files(&mut tar, &[("pkg/data.bin", b"0123456789")]).unwrap();
    tar.finish().unwrap();

    let tree = ArchiveTree::index(&archive_path).unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(child_paths(&tree, ""), vec!["pkg/"]);
    assert_eq!(child_paths(&tree, "pkg"), vec!["pkg/data.bin"]);
}

#[test]
fn test_index_detects_format_from_content() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("download.bin");

    create_zip_archive(&archive_path, &[("x.txt", b"0123456789")]).unwrap();

    let tree = ArchiveTree::index(&archive_path).unwrap();
    assert_eq!(tree.format(), ArchiveFormat::Zip);
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_index_corrupted_zip() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("broken.zip");
    std::fs::write(&archive_path, b"this is not a zip archive").unwrap();

    let result = ArchiveTree::index(&archive_path);
    assert!(matches!(result, Err(ArchiveError::Read(_))));
}

#[test]
fn test_index_unsupported_file() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("notes.txt");
    std::fs::write(&archive_path, b"plain text").unwrap();

    let result = ArchiveTree::index(&archive_path);
    assert!(matches!(result, Err(ArchiveError::UnsupportedFormat(_))));
}

#[test]
fn test_single_file_row() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("one.zip");

    create_zip_archive(&archive_path, &[("x.txt", b"0123456789")]).unwrap();

    let tree = ArchiveTree::index(&archive_path).unwrap();
    let rows = TreePresenter::new(&tree).rows_of("");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].display_name, "x.txt");
    assert_eq!(rows[0].display_size, "10 B");
    assert!(!rows[0].is_branch);
}

#[test]
fn test_tree_serializes_to_json() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("json.zip");

    create_zip_archive(&archive_path, &[("x.txt", b"0123456789")]).unwrap();

    let tree = ArchiveTree::index(&archive_path).unwrap();
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json["format"], "Zip");
    assert_eq!(json["paths"]["x.txt"]["size"], 10);
}

fn child_set(tree: &ArchiveTree, node: &str) -> BTreeSet<String> {
    child_paths(tree, node).into_iter().collect()
}

#[test]
fn test_index_7z_drops_root_member() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("test.7z");

    common::create_7z_archive(
        &archive_path,
        &[("top.txt", b"top"), ("sub/inner.txt", b"inner")],
    )
    .expect("Failed to create 7z");

    let tree = ArchiveTree::index(&archive_path).expect("Failed to index archive");

    assert_eq!(tree.format(), ArchiveFormat::SevenZ);
    assert_eq!(tree.len(), 3);
    assert!(tree.entry("").is_none());
    assert_eq!(
        child_set(&tree, ""),
        BTreeSet::from(["sub/".to_string(), "top.txt".to_string()])
    );
    assert_eq!(child_paths(&tree, "sub/"), vec!["sub/inner.txt"]);
    assert_eq!(tree.entry("top.txt").unwrap().size, 3);

    let rows = TreePresenter::new(&tree).rows_of("");
    assert!(rows.iter().all(|row| !row.id.is_empty() && !row.display_name.is_empty()));
}

#[test]
fn test_index_rar() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("test.rar");

    common::create_rar_archive(
        &archive_path,
        &[
            ("docs/", b""),
            ("docs/note.txt", b"hello rar"),
            ("top.txt", b"0123456789"),
        ],
    )
    .expect("Failed to create RAR");

    let tree = ArchiveTree::index(&archive_path).expect("Failed to index archive");

    assert_eq!(tree.format(), ArchiveFormat::Rar);
    assert_eq!(tree.len(), 3);
    assert_eq!(child_paths(&tree, ""), vec!["docs/", "top.txt"]);
    assert_eq!(child_paths(&tree, "docs/"), vec!["docs/note.txt"]);
    assert!(tree.entry("docs").unwrap().is_directory);
    assert_eq!(tree.entry("docs/note.txt").unwrap().size, 9);
}

#[test]
fn test_index_skips_tar_links() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("links.tar");

    let file = File::create(&archive_path).unwrap();
    let mut tar = tar::Builder::new(file);
    append_tar_files(&mut tar, &[("target.txt", b"target")]).unwrap();

    let mut symlink = tar::Header::new_gnu();
    symlink.set_entry_type(tar::EntryType::Symlink);
    symlink.set_size(0);
    symlink.set_mode(0o777);
    tar.append_link(&mut symlink, "link.txt", "target.txt").unwrap();

    let mut hard_link = tar::Header::new_gnu();
    hard_link.set_entry_type(tar::EntryType::Link);
    hard_link.set_size(0);
    hard_link.set_mode(0o644);
    tar.append_link(&mut hard_link, "hard.txt", "target.txt").unwrap();
    tar.finish().unwrap();

    let tree = ArchiveTree::index(&archive_path).unwrap();

    assert_eq!(tree.len(), 1);
    assert_eq!(child_paths(&tree, ""), vec!["target.txt"]);
    assert!(tree.entry("link.txt").is_none());
    assert!(tree.entry("hard.txt").is_none());
}

#[test]
fn test_index_current_dir_root() {
    let temp_dir = setup_test_dir();
    let archive_path = temp_dir.path().join("dot.tar");

    // The builder normalizes `./` away, so names go into the header directly
    let file = File::create(&archive_path).unwrap();
    let mut tar = tar::Builder::new(file);
    for (name, kind, data) in [
        ("./", tar::EntryType::Directory, &b""[..]),
        ("./a.txt", tar::EntryType::Regular, &b"abc"[..]),
    ] {
        let mut header = tar::Header::new_old();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_entry_type(kind);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append(&header, data).unwrap();
    }
    tar.finish().unwrap();

    let tree = ArchiveTree::index(&archive_path).unwrap();

    assert_eq!(child_paths(&tree, ""), vec!["./"]);
    assert_eq!(child_paths(&tree, "./"), vec!["./a.txt"]);
}
