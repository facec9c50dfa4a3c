//! Obsidian flush command - Back up and clear Obsidian's caches
//!
//! Obsidian is an Electron app: its Chromium caches and the IndexedDB
//! metadata cache for every vault live in the application data directory.
//! Deleting them forces a full re-index on next launch.

use anyhow::{Context, Result};
use chrono::Local;
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::utils;
use crate::config;
use crate::system;

/// Cache directories, relative to the Obsidian data directory
pub const CACHE_DIRS: &[&str] = &[
    "Cache",
    "Code Cache",
    "GPUCache",
    "DawnCache",
    "DawnGraphiteCache",
    "IndexedDB",
    "Service Worker/CacheStorage",
    "Service Worker/ScriptCache",
];

/// Lock files left behind by a running or crashed instance
pub const LOCK_FILES: &[&str] = &[
    "SingletonLock",
    "SingletonSocket",
    "SingletonCookie",
    "lockfile",
];

const PROCESS_TOOLS_HINT: &str =
    "pkill and pgrep are part of the base system on macOS and procps on Linux.";

/// How long to wait for Obsidian to exit after SIGTERM
const EXIT_WAIT: Duration = Duration::from_secs(5);
const EXIT_POLL: Duration = Duration::from_millis(250);

/// How cache directories are preserved before deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    /// Copy directories into a timestamped folder
    Copy,
    /// Write a single timestamped .tar.gz
    Archive,
    /// Delete without a backup
    None,
}

/// Options for the flush
#[derive(Debug, Clone)]
pub struct FlushOptions {
    pub backup: BackupMode,
    pub backup_root: PathBuf,
    pub dry_run: bool,
}

/// What a flush did (or would do, in dry-run mode)
#[derive(Debug, Default)]
pub struct FlushSummary {
    pub removed_dirs: Vec<PathBuf>,
    pub removed_locks: Vec<PathBuf>,
    pub bytes_freed: u64,
    pub backup_location: Option<PathBuf>,
}

impl FlushSummary {
    pub fn is_empty(&self) -> bool {
        self.removed_dirs.is_empty() && self.removed_locks.is_empty()
    }
}

/// True if something (including a dangling symlink) exists at `path`
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Cache directories that currently exist under `data_dir`
pub fn existing_caches(data_dir: &Path) -> Vec<(PathBuf, &'static str)> {
    CACHE_DIRS
        .iter()
        .map(|rel| (data_dir.join(rel), *rel))
        .filter(|(path, _)| path.is_dir())
        .collect()
}

/// Lock files that currently exist under `data_dir`
pub fn existing_locks(data_dir: &Path) -> Vec<PathBuf> {
    LOCK_FILES
        .iter()
        .map(|name| data_dir.join(name))
        .filter(|path| entry_exists(path))
        .collect()
}

/// Back up then delete caches and lock files under `data_dir`
///
/// Running it again on a clean directory does nothing and creates no backup.
pub fn flush(data_dir: &Path, options: &FlushOptions) -> Result<FlushSummary> {
    let mut summary = FlushSummary::default();

    if !data_dir.is_dir() {
        debug!(path = %data_dir.display(), "no obsidian data directory");
        return Ok(summary);
    }

    let caches = existing_caches(data_dir);
    let locks = existing_locks(data_dir);

    if caches.is_empty() && locks.is_empty() {
        return Ok(summary);
    }

    summary.bytes_freed = caches
        .iter()
        .map(|(path, _)| utils::calculate_dir_size(path))
        .sum();

    if !caches.is_empty() && options.backup != BackupMode::None {
        summary.backup_location = Some(backup(&caches, options)?);
    }

    for (path, rel) in &caches {
        if !options.dry_run {
            fs::remove_dir_all(path)
                .with_context(|| format!("Failed to remove: {}", path.display()))?;
        }
        info!(cache = rel, "cache removed");
        summary.removed_dirs.push(path.clone());
    }

    for path in &locks {
        if !options.dry_run {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove: {}", path.display()))?;
        }
        summary.removed_locks.push(path.clone());
    }

    Ok(summary)
}

fn backup(caches: &[(PathBuf, &'static str)], options: &FlushOptions) -> Result<PathBuf> {
    let stamp = utils::timestamp_slug(Local::now());
    let root = &options.backup_root;

    match options.backup {
        BackupMode::Archive if options.dry_run => Ok(utils::unique_child(root, &stamp, ".tar.gz")),
        BackupMode::Archive => {
            let (archive, file) = utils::create_unique_file(root, &stamp, ".tar.gz")?;
            let sources: Vec<(PathBuf, String)> = caches
                .iter()
                .map(|(path, rel)| (path.clone(), rel.to_string()))
                .collect();
            utils::write_tar_gz(file, &sources)
                .with_context(|| format!("Failed to write: {}", archive.display()))?;
            Ok(archive)
        }
        _ if options.dry_run => Ok(utils::unique_child(root, &stamp, "")),
        _ => {
            let target = utils::create_unique_dir(root, &stamp)?;
            for (path, rel) in caches {
                let dest = target.join(rel);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create: {}", parent.display()))?;
                }
                utils::copy_dir(path, &dest)?;
            }
            Ok(target)
        }
    }
}

/// Ask Obsidian to quit and wait for it to go away
fn stop_obsidian(dry_run: bool) -> Result<()> {
    if !system::is_process_running(config::OBSIDIAN_PROCESS) {
        return Ok(());
    }

    if dry_run {
        println!("  {} pkill -x {}", "Would run:".blue(), config::OBSIDIAN_PROCESS);
        return Ok(());
    }

    if system::kill_process(config::OBSIDIAN_PROCESS)? {
        println!("{} {}", "Stopped:".green(), config::OBSIDIAN_PROCESS);
    }

    let mut waited = Duration::ZERO;
    while system::is_process_running(config::OBSIDIAN_PROCESS) {
        if waited >= EXIT_WAIT {
            warn!("Obsidian still running after {:?}", EXIT_WAIT);
            println!(
                "{} Obsidian is still running; caches may be recreated",
                "Warning:".yellow()
            );
            break;
        }
        thread::sleep(EXIT_POLL);
        waited += EXIT_POLL;
    }

    Ok(())
}

/// Execute the obsidian-flush command
pub fn execute(
    dry_run: bool,
    no_backup: bool,
    archive: bool,
    backup_dir: Option<PathBuf>,
) -> Result<()> {
    system::require_program("pkill", PROCESS_TOOLS_HINT)?;
    system::require_program("pgrep", PROCESS_TOOLS_HINT)?;

    stop_obsidian(dry_run)?;

    let data_dir = config::obsidian_data_dir()?;
    let backup_root = match backup_dir {
        Some(dir) => dir,
        None => config::obsidian_backup_dir()?,
    };
    let options = FlushOptions {
        backup: if no_backup {
            BackupMode::None
        } else if archive {
            BackupMode::Archive
        } else {
            BackupMode::Copy
        },
        backup_root,
        dry_run,
    };

    let summary = flush(&data_dir, &options)?;

    if summary.is_empty() {
        println!("Nothing to flush in {}", data_dir.display());
        return Ok(());
    }

    let verb = if dry_run { "Would remove:" } else { "Removed:" };
    for path in summary.removed_dirs.iter().chain(&summary.removed_locks) {
        println!("{} {}", verb.green(), path.display());
    }

    if let Some(location) = &summary.backup_location {
        let label = if dry_run { "Would back up to:" } else { "Backup:" };
        println!("{} {}", label.green(), location.display());
    }

    println!(
        "\n{} cache director{}, {} lock file(s), {} freed",
        summary.removed_dirs.len(),
        if summary.removed_dirs.len() == 1 { "y" } else { "ies" },
        summary.removed_locks.len(),
        utils::format_size(summary.bytes_freed)
    );

    Ok(())
}
