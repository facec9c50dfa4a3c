//! CLI commands

pub mod cursor_paths;
pub mod hidden_files;
pub mod obsidian_flush;
pub mod sys_report;
pub mod transcribe;
pub mod utils;
