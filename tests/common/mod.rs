#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated HOME plus a PATH holding only the fake tools a test installs
pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub bin: PathBuf,
    pub work: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let bin = tmp.path().join("bin");
        let work = tmp.path().join("work");
        for dir in [&home, &bin, &work] {
            fs::create_dir_all(dir).expect("create test dir");
        }

        Self {
            _tmp: tmp,
            home,
            bin,
            work,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("mac-helper");
        cmd.env("HOME", &self.home)
            .env("PATH", &self.bin)
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("XDG_CACHE_HOME")
            .env_remove("WHISPER_MODEL")
            .env_remove("RUST_LOG")
            .current_dir(&self.work);
        cmd
    }

    /// Install an executable `/bin/sh` script under the fake PATH
    pub fn fake_tool(&self, name: &str, body: &str) {
        let path = self.bin.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write fake tool");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    }

    /// Application data root the binary resolves under this HOME
    pub fn app_data_dir(&self) -> PathBuf {
        if cfg!(target_os = "macos") {
            self.home.join("Library").join("Application Support")
        } else {
            self.home.join(".config")
        }
    }

    pub fn obsidian_dir(&self) -> PathBuf {
        self.app_data_dir().join("obsidian")
    }

    pub fn cursor_dir(&self) -> PathBuf {
        self.app_data_dir().join("Cursor")
    }
}

/// Single entry in a directory, panicking if there is not exactly one
pub fn only_entry(dir: &Path) -> PathBuf {
    let entries: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    assert_eq!(entries.len(), 1, "expected one entry in {}", dir.display());
    entries.into_iter().next().unwrap()
}
