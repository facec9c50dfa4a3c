#![cfg(unix)]

mod common;

use common::{only_entry, TestEnv};
use predicates::str::contains;
use serde_json::Value;
use std::fs;

const FAKE_WHISPER: &str = r#"audio="$1"
outdir="."
while [ $# -gt 0 ]; do
  case "$1" in
    --output_dir) outdir="$2"; shift ;;
  esac
  shift
done
base="${audio##*/}"
stem="${base%.*}"
printf 'hello world\nsecond line\n' > "$outdir/$stem.txt""#;

fn with_whisper(env: &TestEnv) {
    env.fake_tool("whisper", FAKE_WHISPER);
    env.fake_tool("ffmpeg", "exit 0");
}

#[test]
fn transcribe_without_whisper_exits_1() {
    let env = TestEnv::new();
    fs::write(env.work.join("talk.m4a"), b"audio").unwrap();

    env.cmd()
        .args(["transcribe", "talk.m4a"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("whisper"))
        .stderr(contains("pip install"));
}

#[test]
fn transcribe_without_ffmpeg_exits_1() {
    let env = TestEnv::new();
    env.fake_tool("whisper", FAKE_WHISPER);
    fs::write(env.work.join("talk.m4a"), b"audio").unwrap();

    env.cmd()
        .args(["transcribe", "talk.m4a"])
        .assert()
        .code(1)
        .stderr(contains("ffmpeg"));
}

#[test]
fn transcribe_missing_audio_exits_1() {
    let env = TestEnv::new();
    with_whisper(&env);

    env.cmd()
        .args(["transcribe", "nope.m4a"])
        .assert()
        .code(1)
        .stderr(contains("does not exist"));
}

#[test]
fn transcribe_writes_rst_next_to_audio() {
    let env = TestEnv::new();
    with_whisper(&env);
    fs::write(env.work.join("talk.m4a"), b"audio").unwrap();

    env.cmd()
        .args(["transcribe", "talk.m4a"])
        .assert()
        .success()
        .stdout(contains("talk.rst"));

    let rst = fs::read_to_string(env.work.join("talk.rst")).unwrap();
    assert_eq!(rst, "talk\n====\n\nhello world\n\nsecond line\n");
}

#[test]
fn transcribe_clean_variant() {
    let env = TestEnv::new();
    with_whisper(&env);
    fs::write(env.work.join("memo.m4a"), b"audio").unwrap();

    env.cmd()
        .args(["transcribe", "memo.m4a", "small", "--clean", "-o", "out.rst"])
        .assert()
        .success();

    let rst = fs::read_to_string(env.work.join("out.rst")).unwrap();
    let lines: Vec<&str> = rst.lines().collect();
    assert_eq!(&lines[..3], &["====", "memo", "===="]);
    assert!(rst.contains(":Source: memo.m4a\n"));
    assert!(rst.contains(":Model: small\n"));
    assert!(rst.contains("Hello world second line\n"));
}

#[test]
fn transcribe_model_from_env() {
    let env = TestEnv::new();
    with_whisper(&env);
    fs::write(env.work.join("memo.m4a"), b"audio").unwrap();

    env.cmd()
        .env("WHISPER_MODEL", "tiny")
        .args(["transcribe", "memo.m4a", "--clean"])
        .assert()
        .success()
        .stdout(contains("model 'tiny'"));
}

#[test]
fn transcribe_whisper_failure_reports_stderr() {
    let env = TestEnv::new();
    env.fake_tool("whisper", "echo 'model not found' >&2; exit 2");
    env.fake_tool("ffmpeg", "exit 0");
    fs::write(env.work.join("talk.m4a"), b"audio").unwrap();

    env.cmd()
        .args(["transcribe", "talk.m4a"])
        .assert()
        .code(1)
        .stderr(contains("model not found"));
    assert!(!env.work.join("talk.rst").exists());
}

#[test]
fn sys_report_without_tools_still_writes_report() {
    let env = TestEnv::new();

    env.cmd()
        .args(["sys-report"])
        .assert()
        .success()
        .stdout(contains("final-report.txt"));

    let report_dir = only_entry(&env.work);
    let name = report_dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Final-Report-"));

    let report = fs::read_to_string(report_dir.join("final-report.txt")).unwrap();
    assert!(report.contains("=== Operating System ==="));
    assert!(report.contains("(skipped: sw_vers not found)"));
    assert!(report.contains("0 succeeded, 0 failed, 20 skipped"));
}

#[test]
fn sys_report_runs_available_tools() {
    let env = TestEnv::new();
    env.fake_tool("uname", "echo 'Darwin test-host 23.4.0'");
    env.fake_tool("df", "echo 'disk failure' >&2; exit 1");
    let out = env.home.join("reports");

    env.cmd()
        .args(["sys-report", "--output-dir"])
        .arg(&out)
        .assert()
        .success();

    let report = fs::read_to_string(only_entry(&out).join("final-report.txt")).unwrap();
    assert!(report.contains("$ uname -a\n\nDarwin test-host 23.4.0\n"));
    assert!(report.contains("(command failed: exit code 1)\ndisk failure\n"));
    assert!(report.contains("1 succeeded, 1 failed, 18 skipped"));
}

#[test]
fn sys_report_list_writes_nothing() {
    let env = TestEnv::new();

    env.cmd()
        .args(["sys-report", "--list"])
        .assert()
        .success()
        .stdout(contains("system_profiler SPHardwareDataType"));

    assert_eq!(fs::read_dir(&env.work).unwrap().count(), 0);
}

#[test]
fn cursor_paths_json_report() {
    let env = TestEnv::new();
    let ws = env.cursor_dir().join("User/workspaceStorage/abc123");
    fs::create_dir_all(&ws).unwrap();
    fs::write(
        ws.join("workspace.json"),
        r#"{"folder": "file:///Users/me/my%20app"}"#,
    )
    .unwrap();
    fs::create_dir_all(env.cursor_dir().join("User/globalStorage")).unwrap();
    fs::write(
        env.cursor_dir().join("User/globalStorage/storage.json"),
        b"{}",
    )
    .unwrap();

    env.cmd()
        .args(["cursor-paths", "-f", "2", "-o", "out"])
        .assert()
        .success()
        .stdout(contains(".json"));

    let json_path = only_entry(&env.work.join("out"));
    let name = json_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("cursor_paths_") && name.ends_with(".json"));

    let report: Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(report["storage"]["workspace_count"], 1);
    assert_eq!(report["storage"]["global_storage_bytes"], 2);
    assert_eq!(report["workspaces"][0]["hash"], "abc123");
    assert_eq!(report["workspaces"][0]["location"]["path"], "/Users/me/my app");

    let locations = report["locations"].as_array().unwrap();
    let extensions = locations
        .iter()
        .find(|l| l["label"] == "Extensions")
        .unwrap();
    assert_eq!(extensions["exists"], false);
}

#[test]
fn cursor_paths_both_formats_without_cursor() {
    let env = TestEnv::new();

    env.cmd()
        .args(["cursor-paths", "-f", "3"])
        .assert()
        .success()
        .stdout(contains("does not appear to be installed"));

    let mut names: Vec<String> = fs::read_dir(&env.work)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2);
    assert!(names[0].ends_with(".json"));
    assert!(names[1].ends_with(".txt"));

    let text = fs::read_to_string(env.work.join(&names[1])).unwrap();
    assert!(text.contains("not found"));
}

#[test]
fn cursor_paths_rejects_unknown_format() {
    let env = TestEnv::new();

    env.cmd()
        .args(["cursor-paths", "-f", "4"])
        .assert()
        .failure();
}

#[test]
fn hidden_files_without_defaults_exits_1() {
    let env = TestEnv::new();

    env.cmd()
        .args(["hidden-files"])
        .assert()
        .code(1)
        .stderr(contains("defaults"));
}

#[test]
fn hidden_files_writes_keys_and_restarts() {
    let env = TestEnv::new();
    env.fake_tool("defaults", r#"echo "defaults $*" >> "$HOME/calls.log""#);
    env.fake_tool(
        "killall",
        r#"echo "killall $*" >> "$HOME/calls.log"
[ "$1" = "Dock" ] && exit 1
exit 0"#,
    );

    env.cmd()
        .args(["hidden-files"])
        .assert()
        .success()
        .stdout(contains("Dock (not running)"))
        .stdout(contains("now shown"));

    let log = fs::read_to_string(env.home.join("calls.log")).unwrap();
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(
        calls,
        vec![
            "defaults write com.apple.finder AppleShowAllFiles -bool true",
            "defaults write NSGlobalDomain AppleShowAllExtensions -bool true",
            "killall Finder",
            "killall Dock",
            "killall SystemUIServer",
        ]
    );
}

#[test]
fn hidden_files_dry_run_runs_nothing() {
    let env = TestEnv::new();
    env.fake_tool("defaults", r#"echo called >> "$HOME/calls.log""#);
    env.fake_tool("killall", r#"echo called >> "$HOME/calls.log""#);

    env.cmd()
        .args(["hidden-files", "--hide", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("AppleShowAllFiles -bool false"));

    assert!(!env.home.join("calls.log").exists());
}

#[test]
fn hidden_files_status_reports_each_key() {
    let env = TestEnv::new();
    env.fake_tool(
        "defaults",
        r#"echo "defaults $*" >> "$HOME/calls.log"
[ "$3" = "AppleShowAllFiles" ] && echo 1 && exit 0
echo "The domain/default pair does not exist" >&2
exit 1"#,
    );
    env.fake_tool("killall", r#"echo "killall $*" >> "$HOME/calls.log""#);

    env.cmd()
        .args(["hidden-files", "--status"])
        .assert()
        .success()
        .stdout(contains("com.apple.finder AppleShowAllFiles: shown"))
        .stdout(contains("NSGlobalDomain AppleShowAllExtensions: not set"));

    let log = fs::read_to_string(env.home.join("calls.log")).unwrap();
    assert_eq!(
        log.lines().collect::<Vec<_>>(),
        vec![
            "defaults read com.apple.finder AppleShowAllFiles",
            "defaults read NSGlobalDomain AppleShowAllExtensions",
        ]
    );
}

#[test]
fn hidden_files_failed_write_exits_1() {
    let env = TestEnv::new();
    env.fake_tool("defaults", "echo 'Could not write domain' >&2; exit 1");
    env.fake_tool("killall", "exit 0");

    env.cmd()
        .args(["hidden-files"])
        .assert()
        .code(1)
        .stderr(contains("Could not write domain"));
}

fn with_process_tools(env: &TestEnv) {
    // No Obsidian process is ever running
    env.fake_tool("pgrep", "exit 1");
    env.fake_tool("pkill", "exit 1");
}

#[test]
fn obsidian_flush_without_pkill_exits_1() {
    let env = TestEnv::new();

    env.cmd()
        .args(["obsidian-flush"])
        .assert()
        .code(1)
        .stderr(contains("pkill"));
}

#[test]
fn obsidian_flush_is_idempotent() {
    let env = TestEnv::new();
    with_process_tools(&env);

    let data = env.obsidian_dir();
    fs::create_dir_all(data.join("GPUCache")).unwrap();
    fs::write(data.join("GPUCache/data_1"), b"gpu").unwrap();
    fs::create_dir_all(data.join("IndexedDB/app_obsidian.md_0.indexeddb.leveldb")).unwrap();
    fs::write(data.join("SingletonCookie"), b"42").unwrap();
    fs::write(data.join("obsidian.json"), b"{}").unwrap();

    env.cmd()
        .args(["obsidian-flush"])
        .assert()
        .success()
        .stdout(contains("Removed:"))
        .stdout(contains("2 cache directories, 1 lock file(s)"));

    assert!(!data.join("GPUCache").exists());
    assert!(!data.join("IndexedDB").exists());
    assert!(!data.join("SingletonCookie").exists());
    assert!(data.join("obsidian.json").exists());

    let backup = only_entry(&env.home.join("obsidian_cache_backup"));
    assert!(backup.join("GPUCache/data_1").exists());

    env.cmd()
        .args(["obsidian-flush"])
        .assert()
        .success()
        .stdout(contains("Nothing to flush"));

    // Second run left the single backup alone
    only_entry(&env.home.join("obsidian_cache_backup"));
}

#[test]
fn obsidian_flush_without_data_dir() {
    let env = TestEnv::new();
    with_process_tools(&env);

    env.cmd()
        .args(["obsidian-flush"])
        .assert()
        .success()
        .stdout(contains("Nothing to flush"));

    assert!(!env.home.join("obsidian_cache_backup").exists());
}

#[test]
fn obsidian_flush_dry_run_keeps_everything() {
    let env = TestEnv::new();
    with_process_tools(&env);

    let data = env.obsidian_dir();
    fs::create_dir_all(data.join("Cache")).unwrap();

    env.cmd()
        .args(["obsidian-flush", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("Would remove:"));

    assert!(data.join("Cache").exists());
    assert!(!env.home.join("obsidian_cache_backup").exists());
}

#[test]
fn obsidian_flush_archive_to_custom_dir() {
    let env = TestEnv::new();
    with_process_tools(&env);

    let data = env.obsidian_dir();
    fs::create_dir_all(data.join("Code Cache/js")).unwrap();
    fs::write(data.join("Code Cache/js/index"), b"js").unwrap();
    let backups = env.home.join("backups");

    env.cmd()
        .args(["obsidian-flush", "--archive", "--backup-dir"])
        .arg(&backups)
        .assert()
        .success();

    let archive = only_entry(&backups);
    assert!(archive.to_string_lossy().ends_with(".tar.gz"));
    assert!(!data.join("Code Cache").exists());
}
