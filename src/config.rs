//! Platform-specific configuration and paths

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Default whisper model when neither the CLI nor `WHISPER_MODEL` names one
pub const DEFAULT_WHISPER_MODEL: &str = "base";

/// Bundle identifier Cursor ships under on macOS
pub const CURSOR_BUNDLE_ID: &str = "com.todesktop.230313mzl4w4u92";

/// Name of the Obsidian process
pub const OBSIDIAN_PROCESS: &str = "Obsidian";

/// Current user's home directory
pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Could not determine home directory")
}

/// Get the Cursor dot-directory (~/.cursor/)
pub fn cursor_home_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".cursor"))
}

/// Get the Cursor application data directory
/// - macOS: ~/Library/Application Support/Cursor/
/// - Linux: ~/.config/Cursor/
pub fn cursor_app_support_dir() -> Result<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        Ok(home_dir()?
            .join("Library")
            .join("Application Support")
            .join("Cursor"))
    }

    #[cfg(not(target_os = "macos"))]
    {
        let config = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config.join("Cursor"))
    }
}

/// Get the Cursor workspace storage directory
/// - macOS: ~/Library/Application Support/Cursor/User/workspaceStorage/
/// - Linux: ~/.config/Cursor/User/workspaceStorage/
pub fn workspace_storage_dir() -> Result<PathBuf> {
    Ok(cursor_app_support_dir()?
        .join("User")
        .join("workspaceStorage"))
}

/// Get the Cursor global storage directory
/// - macOS: ~/Library/Application Support/Cursor/User/globalStorage/
/// - Linux: ~/.config/Cursor/User/globalStorage/
pub fn global_storage_dir() -> Result<PathBuf> {
    Ok(cursor_app_support_dir()?.join("User").join("globalStorage"))
}

/// Get the per-user cache root
/// - macOS: ~/Library/Caches/
/// - Linux: ~/.cache/
pub fn user_cache_dir() -> Result<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        Ok(home_dir()?.join("Library").join("Caches"))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir().context("Could not determine cache directory")
    }
}

/// Get the Obsidian application data directory
/// - macOS: ~/Library/Application Support/obsidian/
/// - Linux: ~/.config/obsidian/
pub fn obsidian_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        Ok(home_dir()?
            .join("Library")
            .join("Application Support")
            .join("obsidian"))
    }

    #[cfg(not(target_os = "macos"))]
    {
        let config = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config.join("obsidian"))
    }
}

/// Get the default Obsidian cache backup root (~/obsidian_cache_backup/)
pub fn obsidian_backup_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join("obsidian_cache_backup"))
}
