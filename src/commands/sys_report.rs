//! System report command - Enumerate the machine into a single text report

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::utils;
use crate::system;

/// File name of the report inside its directory
pub const REPORT_FILE: &str = "final-report.txt";

/// One read-only introspection command in the report
#[derive(Debug, Clone, Copy)]
pub struct ReportSection {
    pub title: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl ReportSection {
    const fn new(
        title: &'static str,
        program: &'static str,
        args: &'static [&'static str],
    ) -> Self {
        Self {
            title,
            program,
            args,
        }
    }

    /// The command as typed in a shell
    pub fn command_line(&self) -> String {
        std::iter::once(self.program)
            .chain(self.args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Sections of the report, in output order
pub const SECTIONS: &[ReportSection] = &[
    ReportSection::new("Operating System", "sw_vers", &[]),
    ReportSection::new("Kernel", "uname", &["-a"]),
    ReportSection::new("Host Name", "hostname", &[]),
    ReportSection::new("Uptime", "uptime", &[]),
    ReportSection::new("Hardware", "system_profiler", &["SPHardwareDataType"]),
    ReportSection::new("Software", "system_profiler", &["SPSoftwareDataType"]),
    ReportSection::new("Storage", "system_profiler", &["SPStorageDataType"]),
    ReportSection::new("Displays", "system_profiler", &["SPDisplaysDataType"]),
    ReportSection::new("USB Devices", "system_profiler", &["SPUSBDataType"]),
    ReportSection::new("Power", "system_profiler", &["SPPowerDataType"]),
    ReportSection::new("Disks", "diskutil", &["list"]),
    ReportSection::new("Disk Usage", "df", &["-h"]),
    ReportSection::new("Memory", "vm_stat", &[]),
    ReportSection::new("Network Interfaces", "ifconfig", &[]),
    ReportSection::new(
        "Network Services",
        "networksetup",
        &["-listallnetworkservices"],
    ),
    ReportSection::new("Power Settings", "pmset", &["-g"]),
    ReportSection::new("Launch Services", "launchctl", &["list"]),
    ReportSection::new("Applications", "ls", &["-la", "/Applications"]),
    ReportSection::new("Homebrew Packages", "brew", &["list", "--versions"]),
    ReportSection::new("Processes", "ps", &["aux"]),
];

/// What happened when a section's command ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// Exited 0 with this stdout
    Output(String),
    /// Exited non-zero
    Failed {
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// Program not on PATH
    Missing,
}

/// Header information for a report
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub id: Uuid,
    pub generated_at: DateTime<Local>,
}

impl ReportMeta {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Local::now(),
        }
    }

    /// `Final-Report-<timestamp>-<uuid>`
    pub fn dir_name(&self) -> String {
        format!(
            "Final-Report-{}-{}",
            utils::timestamp_slug(self.generated_at),
            self.id
        )
    }
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one section, never failing the report
pub fn run_section(section: &ReportSection) -> SectionOutcome {
    if system::find_program(section.program).is_none() {
        debug!(program = section.program, "skipping section, program missing");
        return SectionOutcome::Missing;
    }

    match system::run(section.program, section.args) {
        Ok(output) if output.success() => SectionOutcome::Output(output.stdout),
        Ok(output) => SectionOutcome::Failed {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        },
        Err(e) => {
            warn!(program = section.program, error = %e, "section command failed to start");
            SectionOutcome::Failed {
                status: None,
                stdout: String::new(),
                stderr: e.to_string(),
            }
        }
    }
}

/// Render the full report text
pub fn render_report(meta: &ReportMeta, results: &[(ReportSection, SectionOutcome)]) -> String {
    let mut out = String::new();

    out.push_str("System Enumeration Report\n");
    out.push_str("=========================\n");
    out.push_str(&format!(
        "Generated: {}\n",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S %Z")
    ));
    out.push_str(&format!("Report ID: {}\n", meta.id));
    out.push_str(&format!("Sections: {}\n\n", results.len()));

    let (mut ok, mut failed, mut skipped) = (0, 0, 0);

    for (section, outcome) in results {
        out.push_str(&format!("=== {} ===\n", section.title));
        out.push_str(&format!("$ {}\n\n", section.command_line()));

        match outcome {
            SectionOutcome::Output(stdout) => {
                ok += 1;
                push_block(&mut out, stdout);
            }
            SectionOutcome::Failed {
                status,
                stdout,
                stderr,
            } => {
                failed += 1;
                let status = status
                    .map(|c| format!("exit code {}", c))
                    .unwrap_or_else(|| "no exit code".to_string());
                out.push_str(&format!("(command failed: {})\n", status));
                push_block(&mut out, stdout);
                push_block(&mut out, stderr);
            }
            SectionOutcome::Missing => {
                skipped += 1;
                out.push_str(&format!("(skipped: {} not found)\n", section.program));
            }
        }
        out.push('\n');
    }

    out.push_str("=== Summary ===\n");
    out.push_str(&format!(
        "{} succeeded, {} failed, {} skipped\n",
        ok, failed, skipped
    ));
    out
}

fn push_block(out: &mut String, text: &str) {
    let text = text.trim_end();
    if !text.is_empty() {
        out.push_str(text);
        out.push('\n');
    }
}

/// Run every section and write the report under `output_dir`
pub fn write_report(output_dir: &Path, sections: &[ReportSection]) -> Result<PathBuf> {
    let meta = ReportMeta::new();
    let report_dir = output_dir.join(meta.dir_name());
    fs::create_dir_all(&report_dir)
        .with_context(|| format!("Failed to create: {}", report_dir.display()))?;

    let mut results = Vec::with_capacity(sections.len());
    for section in sections {
        println!("  {} {}", "Running:".dimmed(), section.command_line());
        results.push((*section, run_section(section)));
    }

    let report_path = report_dir.join(REPORT_FILE);
    fs::write(&report_path, render_report(&meta, &results))
        .with_context(|| format!("Failed to write: {}", report_path.display()))?;

    Ok(report_path)
}

/// Execute the sys-report command
pub fn execute(output_dir: Option<&Path>, list_only: bool) -> Result<()> {
    if list_only {
        println!("{}", sections_table(SECTIONS));
        return Ok(());
    }

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    println!("Collecting system information ({} sections)...", SECTIONS.len());
    let report_path = write_report(&output_dir, SECTIONS)?;

    println!();
    println!("{} {}", "Created:".green(), report_path.display());
    Ok(())
}

fn sections_table(sections: &[ReportSection]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Section"), Cell::new("Command"), Cell::new("Available")]);

    for section in sections {
        let available = if system::find_program(section.program).is_some() {
            "yes"
        } else {
            "no"
        };
        table.add_row(vec![
            Cell::new(section.title),
            Cell::new(section.command_line()),
            Cell::new(available),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_line() {
        assert_eq!(SECTIONS[1].command_line(), "uname -a");
        assert_eq!(SECTIONS[0].command_line(), "sw_vers");
    }

    #[test]
    fn test_dir_name_format() {
        let meta = ReportMeta::new();
        let name = meta.dir_name();
        assert!(name.starts_with("Final-Report-"));
        assert!(name.ends_with(&meta.id.to_string()));
        // Final-Report- + 15 char timestamp + - + 36 char uuid
        assert_eq!(name.len(), 13 + 15 + 1 + 36);
    }

    #[test]
    fn test_render_report_outcomes() {
        let meta = ReportMeta::new();
        let results = vec![
            (
                ReportSection::new("Kernel", "uname", &["-a"]),
                SectionOutcome::Output("Darwin host 23.0\n".to_string()),
            ),
            (
                ReportSection::new("Disks", "diskutil", &["list"]),
                SectionOutcome::Failed {
                    status: Some(1),
                    stdout: String::new(),
                    stderr: "permission denied".to_string(),
                },
            ),
            (
                ReportSection::new("Homebrew Packages", "brew", &["list"]),
                SectionOutcome::Missing,
            ),
        ];

        let report = render_report(&meta, &results);
        assert!(report.starts_with("System Enumeration Report\n"));
        assert!(report.contains(&format!("Report ID: {}", meta.id)));
        assert!(report.contains("=== Kernel ===\n$ uname -a\n\nDarwin host 23.0\n"));
        assert!(report.contains("(command failed: exit code 1)\npermission denied\n"));
        assert!(report.contains("(skipped: brew not found)"));
        assert!(report.ends_with("1 succeeded, 1 failed, 1 skipped\n"));
    }

    #[test]
    fn test_run_section_missing_program() {
        let section = ReportSection::new("Nope", "definitely-not-a-real-program-name", &[]);
        assert_eq!(run_section(&section), SectionOutcome::Missing);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_report() {
        let tmp = TempDir::new().unwrap();
        let sections = [
            ReportSection::new("Echo", "echo", &["hello report"]),
            ReportSection::new("Missing", "definitely-not-a-real-program-name", &[]),
        ];

        let path = write_report(tmp.path(), &sections).unwrap();
        assert_eq!(path.file_name().unwrap(), REPORT_FILE);

        let dir_name = path.parent().unwrap().file_name().unwrap().to_string_lossy();
        assert!(dir_name.starts_with("Final-Report-"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("hello report"));
        assert!(content.contains("(skipped: definitely-not-a-real-program-name not found)"));
    }
}
