//! Workspace storage enumeration
//!
//! Cursor keeps per-project state in:
//! workspaceStorage/<hash>/{workspace.json,state.vscdb,...}
//!
//! workspace.json holds either `folder` (single-folder project) or
//! `workspace` (multi-root .code-workspace file) as a URI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;

use super::folder_uri::{self, FolderLocation};
use crate::commands::utils;

/// Contents of workspace.json
#[derive(Debug, Default, Deserialize)]
pub struct WorkspaceJson {
    pub folder: Option<String>,
    pub workspace: Option<String>,
}

impl WorkspaceJson {
    /// Read workspace.json from a workspace storage directory
    pub fn read(workspace_dir: &Path) -> Result<Option<Self>> {
        let path = workspace_dir.join("workspace.json");
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read: {}", path.display()))?;
        let parsed = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse: {}", path.display()))?;
        Ok(Some(parsed))
    }

    /// The folder URI, falling back to the multi-root workspace file URI
    pub fn target_uri(&self) -> Option<&str> {
        self.folder.as_deref().or(self.workspace.as_deref())
    }
}

/// One workspaceStorage/<hash>/ directory
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceEntry {
    /// Directory name (hash)
    pub hash: String,
    pub storage_path: PathBuf,
    /// Raw URI from workspace.json
    pub uri: Option<String>,
    /// Decoded project location
    pub location: Option<FolderLocation>,
    /// Whether workspace.json names a .code-workspace file
    pub multi_root: bool,
    pub size_bytes: u64,
    #[serde(with = "super::report::optional_time")]
    pub last_modified: Option<SystemTime>,
}

/// List every workspace in the storage directory, largest first
///
/// A missing storage directory yields an empty list.
pub fn list_workspaces(workspace_storage_dir: &Path) -> Result<Vec<WorkspaceEntry>> {
    let mut workspaces = Vec::new();

    if !workspace_storage_dir.exists() {
        return Ok(workspaces);
    }

    let entries = fs::read_dir(workspace_storage_dir)
        .with_context(|| format!("Failed to read: {}", workspace_storage_dir.display()))?;

    for entry in entries.flatten() {
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        let dir = entry.path();

        // One unreadable workspace.json should not hide the others
        let ws = match WorkspaceJson::read(&dir) {
            Ok(ws) => ws.unwrap_or_default(),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable workspace.json");
                WorkspaceJson::default()
            }
        };

        let uri = ws.target_uri().map(str::to_string);
        let location = uri.as_deref().and_then(folder_uri::parse_folder_uri);

        workspaces.push(WorkspaceEntry {
            hash: entry.file_name().to_string_lossy().to_string(),
            storage_path: dir.clone(),
            multi_root: ws.folder.is_none() && ws.workspace.is_some(),
            uri,
            location,
            size_bytes: utils::calculate_dir_size(&dir),
            last_modified: entry.metadata().ok().and_then(|m| m.modified().ok()),
        });
    }

    workspaces.sort_by(|a, b| {
        b.size_bytes
            .cmp(&a.size_bytes)
            .then_with(|| a.hash.cmp(&b.hash))
    });

    Ok(workspaces)
}
