//! Cursor paths command - Report where Cursor stores its data

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::utils;
use crate::cursor::report::{self, CursorPathsReport};

/// Which files to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Both,
}

impl OutputFormat {
    /// Parse the numeric selector: 1 = text, 2 = JSON, 3 = both
    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Self::Text),
            2 => Ok(Self::Json),
            3 => Ok(Self::Both),
            other => bail!("Invalid format {}. Use 1 (text), 2 (JSON) or 3 (both)", other),
        }
    }

    fn wants_text(self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    fn wants_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

/// Write the report files and return their paths
pub fn write_report(
    report: &CursorPathsReport,
    format: OutputFormat,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create: {}", output_dir.display()))?;

    let generated_at = report.metadata.generated_at;
    let mut written = Vec::new();

    if format.wants_text() {
        let path = report::output_file(output_dir, generated_at, "txt");
        fs::write(&path, report.to_text())
            .with_context(|| format!("Failed to write: {}", path.display()))?;
        written.push(path);
    }

    if format.wants_json() {
        let path = report::output_file(output_dir, generated_at, "json");
        fs::write(&path, report.to_json()?)
            .with_context(|| format!("Failed to write: {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

/// Execute the cursor-paths command
pub fn execute(format: OutputFormat, output_dir: Option<&Path>) -> Result<()> {
    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    println!("Scanning Cursor data locations...");
    let report = CursorPathsReport::collect()?;

    let found = report.locations.iter().filter(|l| l.exists).count();
    println!(
        "{} {} of {} locations ({})",
        "Found:".green(),
        found,
        report.locations.len(),
        utils::format_size(report.storage.total_bytes)
    );
    if found == 0 {
        println!("{}", "Cursor does not appear to be installed for this user.".yellow());
    }

    for path in write_report(&report, format, &output_dir)? {
        info!(path = %path.display(), "report written");
        println!("{} {}", "Created:".green(), path.display());
    }

    Ok(())
}
