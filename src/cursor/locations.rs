//! Well-known Cursor data locations
//!
//! Cursor spreads its state over several directories. Paths here are probed
//! read-only; a missing location is reported, not treated as an error.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::utils;
use crate::config;

/// What was found at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Directory,
    File,
    Missing,
}

/// A named location that may hold Cursor data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownLocation {
    pub label: &'static str,
    pub path: PathBuf,
}

/// Result of probing one known location
#[derive(Debug, Clone, Serialize)]
pub struct LocationEntry {
    pub label: String,
    pub path: PathBuf,
    pub exists: bool,
    pub kind: LocationKind,
    pub size_bytes: u64,
    pub file_count: u64,
}

/// All locations Cursor is known to write to on this platform
pub fn known_locations() -> Result<Vec<KnownLocation>> {
    let app = config::cursor_app_support_dir()?;
    let user = app.join("User");
    let dot = config::cursor_home_dir()?;
    let caches = config::user_cache_dir()?;

    let mut locations = vec![
        KnownLocation {
            label: "Application Support",
            path: app.clone(),
        },
        KnownLocation {
            label: "User Settings",
            path: user.clone(),
        },
        KnownLocation {
            label: "workspaceStorage",
            path: config::workspace_storage_dir()?,
        },
        KnownLocation {
            label: "globalStorage",
            path: config::global_storage_dir()?,
        },
        KnownLocation {
            label: "Local History",
            path: user.join("History"),
        },
        KnownLocation {
            label: "Logs",
            path: app.join("logs"),
        },
        KnownLocation {
            label: "Cached Data",
            path: app.join("CachedData"),
        },
        KnownLocation {
            label: "Cache",
            path: caches.join("Cursor"),
        },
    ];

    locations.extend(platform_locations(&caches)?);

    locations.extend([
        KnownLocation {
            label: "Cursor Home",
            path: dot.clone(),
        },
        KnownLocation {
            label: "Extensions",
            path: dot.join("extensions"),
        },
        KnownLocation {
            label: "Projects",
            path: dot.join("projects"),
        },
    ]);

    Ok(locations)
}

#[cfg(target_os = "macos")]
fn platform_locations(caches: &Path) -> Result<Vec<KnownLocation>> {
    let library = config::home_dir()?.join("Library");
    let bundle = config::CURSOR_BUNDLE_ID;

    Ok(vec![
        KnownLocation {
            label: "Bundle Cache",
            path: caches.join(bundle),
        },
        KnownLocation {
            label: "Updater Cache",
            path: caches.join(format!("{}.ShipIt", bundle)),
        },
        KnownLocation {
            label: "Preferences",
            path: library.join("Preferences").join(format!("{}.plist", bundle)),
        },
        KnownLocation {
            label: "Saved State",
            path: library
                .join("Saved Application State")
                .join(format!("{}.savedState", bundle)),
        },
    ])
}

#[cfg(not(target_os = "macos"))]
fn platform_locations(caches: &Path) -> Result<Vec<KnownLocation>> {
    Ok(vec![KnownLocation {
        label: "Updater Cache",
        path: caches.join("cursor-updater"),
    }])
}

/// Stat a location and measure what it holds
pub fn probe(location: &KnownLocation) -> LocationEntry {
    let (kind, size_bytes, file_count) = match fs::metadata(&location.path) {
        Ok(meta) if meta.is_dir() => {
            let (bytes, files) = utils::dir_usage(&location.path);
            (LocationKind::Directory, bytes, files)
        }
        Ok(meta) => (LocationKind::File, meta.len(), 1),
        Err(_) => (LocationKind::Missing, 0, 0),
    };

    LocationEntry {
        label: location.label.to_string(),
        path: location.path.clone(),
        exists: kind != LocationKind::Missing,
        kind,
        size_bytes,
        file_count,
    }
}

/// Total bytes across locations, not double counting nested paths
pub fn total_size(entries: &[LocationEntry]) -> u64 {
    entries
        .iter()
        .filter(|e| e.exists)
        .filter(|e| {
            !entries.iter().any(|other| {
                other.exists && other.path != e.path && e.path.starts_with(&other.path)
            })
        })
        .map(|e| e.size_bytes)
        .sum()
}
