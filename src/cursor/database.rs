//! Discovery of Cursor's SQLite databases
//!
//! Cursor (like VS Code) stores key/value state in `state.vscdb` files with a
//! single `ItemTable`. Other SQLite files appear under extensions and caches.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::commands::utils;

/// File extensions treated as databases
pub const DATABASE_EXTENSIONS: &[&str] = &["vscdb", "db", "sqlite", "sqlite3"];

/// A database file found on disk
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    #[serde(with = "super::report::optional_time")]
    pub modified: Option<SystemTime>,
    /// Rows in `ItemTable`, when the file opens as SQLite and has one
    pub item_count: Option<u64>,
}

fn is_database(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            DATABASE_EXTENSIONS
                .iter()
                .any(|ext| ext.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Find database files below `root`, largest first
///
/// A missing root yields an empty list.
pub fn find_databases(root: &Path) -> Vec<DatabaseFile> {
    let mut databases: Vec<DatabaseFile> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_database(e.path()))
        .map(|e| {
            let metadata = e.metadata().ok();
            DatabaseFile {
                path: e.path().to_path_buf(),
                size_bytes: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
                modified: metadata.and_then(|m| m.modified().ok()),
                item_count: utils::count_item_rows(e.path()),
            }
        })
        .collect();

    databases.sort_by(|a, b| {
        b.size_bytes
            .cmp(&a.size_bytes)
            .then_with(|| a.path.cmp(&b.path))
    });

    databases
}
