//! Shared utilities for commands

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use fs_extra::dir::{self, CopyOptions};
use rusqlite::{Connection, OpenFlags};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tar::Builder;
use walkdir::WalkDir;

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Timestamp used in generated file and directory names
pub fn timestamp_slug(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Format a modification time for display
pub fn format_time(time: SystemTime) -> String {
    let dt: DateTime<Local> = DateTime::<Utc>::from(time).with_timezone(&Local);
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Copy a directory recursively using fs_extra
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    let options = CopyOptions::new().copy_inside(true);
    dir::copy(src, dst, &options)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Total size and regular-file count below a path
///
/// Symlinks are not followed. A missing path counts as empty.
pub fn dir_usage(path: &Path) -> (u64, u64) {
    let mut bytes = 0;
    let mut files = 0;

    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            if let Ok(metadata) = entry.metadata() {
                bytes += metadata.len();
                files += 1;
            }
        }
    }

    (bytes, files)
}

/// Calculate total size of a directory
pub fn calculate_dir_size(path: &Path) -> u64 {
    dir_usage(path).0
}

/// Name of the `n`th candidate: `stem` + `ext`, then `stem-1` + `ext`, ...
fn numbered(root: &Path, stem: &str, ext: &str, n: u32) -> PathBuf {
    if n == 0 {
        root.join(format!("{}{}", stem, ext))
    } else {
        root.join(format!("{}-{}{}", stem, n, ext))
    }
}

/// First `root/stem[-N]ext` that does not exist yet
///
/// Only a preview: nothing is created, so another process may take the name.
/// Use [`create_unique_dir`] or [`create_unique_file`] to actually claim it.
pub fn unique_child(root: &Path, stem: &str, ext: &str) -> PathBuf {
    let mut n = 0;
    loop {
        let candidate = numbered(root, stem, ext, n);
        if fs::symlink_metadata(&candidate).is_err() {
            return candidate;
        }
        n += 1;
    }
}

/// Claim the first free `root/stem[-N]ext` with `create`
///
/// `create` must fail with `AlreadyExists` when the name is taken, which makes
/// the check and the creation a single step.
fn reserve_unique<T>(
    root: &Path,
    stem: &str,
    ext: &str,
    mut create: impl FnMut(&Path) -> io::Result<T>,
) -> Result<(PathBuf, T)> {
    fs::create_dir_all(root).with_context(|| format!("Failed to create: {}", root.display()))?;

    let mut n = 0;
    loop {
        let candidate = numbered(root, stem, ext, n);
        match create(&candidate) {
            Ok(value) => return Ok((candidate, value)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create: {}", candidate.display()));
            }
        }
    }
}

/// Create a new directory `root/stem[-N]`, never reusing an existing one
pub fn create_unique_dir(root: &Path, stem: &str) -> Result<PathBuf> {
    let (path, ()) = reserve_unique(root, stem, "", |p: &Path| fs::create_dir(p))?;
    Ok(path)
}

/// Create a new empty file `root/stem[-N]ext`, never truncating an existing one
pub fn create_unique_file(root: &Path, stem: &str, ext: &str) -> Result<(PathBuf, File)> {
    reserve_unique(root, stem, ext, |p| {
        OpenOptions::new().write(true).create_new(true).open(p)
    })
}

/// Count rows in a VS Code style `ItemTable`
///
/// Returns `None` when the file is not a readable SQLite database or has no
/// `ItemTable`.
pub fn count_item_rows(db_path: &Path) -> Option<u64> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .ok()?;

    conn.query_row("SELECT COUNT(*) FROM ItemTable", [], |row| {
        row.get::<_, i64>(0)
    })
    .ok()
    .map(|n| n as u64)
}

/// Write a gzip-compressed tarball of several directories into `out`
///
/// Each `(source, name)` pair lands under `name/` inside the archive.
pub fn write_tar_gz<W: Write>(out: W, sources: &[(PathBuf, String)]) -> Result<()> {
    let encoder = GzEncoder::new(out, Compression::default());
    let mut archive = Builder::new(encoder);

    for (source, name) in sources {
        add_dir_to_archive(&mut archive, source, name)?;
    }

    let encoder = archive.into_inner()?;
    encoder.finish()?;
    Ok(())
}

/// Add a directory recursively to the archive
fn add_dir_to_archive<W: Write>(
    archive: &mut Builder<W>,
    source: &Path,
    prefix: &str,
) -> Result<()> {
    for entry in WalkDir::new(source).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let relative = path
            .strip_prefix(source)
            .with_context(|| format!("Failed to strip prefix from: {}", path.display()))?;

        let archive_path = if relative.as_os_str().is_empty() {
            PathBuf::from(prefix)
        } else {
            PathBuf::from(prefix).join(relative)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            archive.append_dir(&archive_path, path)?;
        } else if file_type.is_file() {
            archive.append_path_with_name(path, &archive_path)?;
        }
    }
    Ok(())
}
