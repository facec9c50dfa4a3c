//! Snapshot of where Cursor keeps its data, rendered as text or JSON

use anyhow::Result;
use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use serde::Serialize;
use std::path::Path;

use super::database::{self, DatabaseFile};
use super::locations::{self, LocationEntry};
use super::workspace::{self, WorkspaceEntry};
use crate::commands::utils;
use crate::config;

/// Serialize `Option<SystemTime>` as an RFC 3339 string or null
pub(crate) mod optional_time {
    use chrono::{DateTime, Utc};
    use serde::Serializer;
    use std::time::SystemTime;

    pub fn serialize<S: Serializer>(
        time: &Option<SystemTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_str(&DateTime::<Utc>::from(*t).to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}

/// Report header
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Local>,
    pub tool_version: String,
    pub platform: String,
    pub home: String,
}

/// Aggregate sizes
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageSummary {
    pub workspace_storage_bytes: u64,
    pub global_storage_bytes: u64,
    pub total_bytes: u64,
    pub workspace_count: usize,
    pub database_count: usize,
}

/// Everything the cursor-paths command reports
#[derive(Debug, Clone, Serialize)]
pub struct CursorPathsReport {
    pub metadata: ReportMetadata,
    pub storage: StorageSummary,
    pub locations: Vec<LocationEntry>,
    pub workspaces: Vec<WorkspaceEntry>,
    pub databases: Vec<DatabaseFile>,
}

impl CursorPathsReport {
    /// Probe the machine and build a report
    pub fn collect() -> Result<Self> {
        let locations: Vec<LocationEntry> = locations::known_locations()?
            .iter()
            .map(locations::probe)
            .collect();
        let workspaces = workspace::list_workspaces(&config::workspace_storage_dir()?)?;
        let databases = database::find_databases(&config::cursor_app_support_dir()?);

        let home = config::home_dir()?.display().to_string();

        Ok(Self::assemble(
            ReportMetadata {
                generated_at: Local::now(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                platform: std::env::consts::OS.to_string(),
                home,
            },
            locations,
            workspaces,
            databases,
        ))
    }

    /// Build a report from already probed parts
    pub fn assemble(
        metadata: ReportMetadata,
        locations: Vec<LocationEntry>,
        workspaces: Vec<WorkspaceEntry>,
        databases: Vec<DatabaseFile>,
    ) -> Self {
        let size_of = |label: &str| {
            locations
                .iter()
                .find(|l| l.label == label)
                .map(|l| l.size_bytes)
                .unwrap_or(0)
        };

        let storage = StorageSummary {
            workspace_storage_bytes: size_of("workspaceStorage"),
            global_storage_bytes: size_of("globalStorage"),
            total_bytes: locations::total_size(&locations),
            workspace_count: workspaces.len(),
            database_count: databases.len(),
        };

        Self {
            metadata,
            storage,
            locations,
            workspaces,
            databases,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();

        out.push_str("Cursor Data Locations\n");
        out.push_str("=====================\n");
        out.push_str(&format!(
            "Generated: {}\n",
            self.metadata.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("Platform: {}\n", self.metadata.platform));
        out.push_str(&format!("Home: {}\n\n", self.metadata.home));

        out.push_str("Locations\n---------\n");
        out.push_str(&self.locations_table());
        out.push_str("\n\n");

        out.push_str("Storage\n-------\n");
        out.push_str(&format!(
            "Workspace Storage: {} ({} workspaces)\n",
            utils::format_size(self.storage.workspace_storage_bytes),
            self.storage.workspace_count
        ));
        out.push_str(&format!(
            "Global Storage: {}\n",
            utils::format_size(self.storage.global_storage_bytes)
        ));
        out.push_str(&format!(
            "Total Cursor Data: {}\n\n",
            utils::format_size(self.storage.total_bytes)
        ));

        out.push_str("Workspaces\n----------\n");
        if self.workspaces.is_empty() {
            out.push_str("(none)\n");
        } else {
            out.push_str(&self.workspaces_table());
            out.push('\n');
        }
        out.push('\n');

        out.push_str("Databases\n---------\n");
        if self.databases.is_empty() {
            out.push_str("(none)\n");
        } else {
            out.push_str(&self.databases_table());
            out.push('\n');
        }

        out
    }

    fn locations_table(&self) -> String {
        let mut table = new_table(&["Location", "Path", "Status", "Size", "Files"]);
        for entry in &self.locations {
            let (status, size, files) = if entry.exists {
                (
                    "found",
                    utils::format_size(entry.size_bytes),
                    entry.file_count.to_string(),
                )
            } else {
                ("not found", "-".to_string(), "-".to_string())
            };
            table.add_row(vec![
                Cell::new(&entry.label),
                Cell::new(entry.path.display()),
                Cell::new(status),
                Cell::new(size),
                Cell::new(files),
            ]);
        }
        table.to_string()
    }

    fn workspaces_table(&self) -> String {
        let mut table = new_table(&["Hash", "Project", "Size", "Modified"]);
        for ws in &self.workspaces {
            let project = match (&ws.location, &ws.uri) {
                (Some(loc), _) if ws.multi_root => format!("{} (multi-root)", loc),
                (Some(loc), _) => loc.to_string(),
                (None, Some(uri)) => uri.clone(),
                (None, None) => "-".to_string(),
            };
            table.add_row(vec![
                Cell::new(&ws.hash),
                Cell::new(project),
                Cell::new(utils::format_size(ws.size_bytes)),
                Cell::new(
                    ws.last_modified
                        .map(utils::format_time)
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }
        table.to_string()
    }

    fn databases_table(&self) -> String {
        let mut table = new_table(&["Database", "Size", "Items", "Modified"]);
        for db in &self.databases {
            table.add_row(vec![
                Cell::new(db.path.display()),
                Cell::new(utils::format_size(db.size_bytes)),
                Cell::new(
                    db.item_count
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::new(
                    db.modified
                        .map(utils::format_time)
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }
        table.to_string()
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(Cell::new).collect::<Vec<_>>());
    table
}

/// `cursor_paths_<timestamp>.<ext>` inside `dir`
pub fn output_file(dir: &Path, generated_at: DateTime<Local>, ext: &str) -> std::path::PathBuf {
    dir.join(format!(
        "cursor_paths_{}.{}",
        utils::timestamp_slug(generated_at),
        ext
    ))
}
