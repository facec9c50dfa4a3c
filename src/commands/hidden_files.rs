//! Hidden files command - Toggle Finder's display of hidden files

use anyhow::Result;
use owo_colors::OwoColorize;
use tracing::warn;

use crate::system;

const MACOS_HINT: &str = "This command needs macOS, where it ships with the system.";

/// A preference key written with `defaults write <domain> <key> -bool ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceKey {
    pub domain: &'static str,
    pub key: &'static str,
}

/// Keys toggled together
pub const PREFERENCE_KEYS: &[PreferenceKey] = &[
    PreferenceKey {
        domain: "com.apple.finder",
        key: "AppleShowAllFiles",
    },
    PreferenceKey {
        domain: "NSGlobalDomain",
        key: "AppleShowAllExtensions",
    },
];

/// UI processes restarted so the change takes effect
pub const RESTART_PROCESSES: &[&str] = &["Finder", "Dock", "SystemUIServer"];

/// One external command the toggle will run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `defaults write` that must succeed
    Write { program: String, args: Vec<String> },
    /// `killall` whose failure only means the process was not running
    Restart { program: String, args: Vec<String> },
}

impl Step {
    pub fn command_line(&self) -> String {
        let (program, args) = match self {
            Step::Write { program, args } | Step::Restart { program, args } => (program, args),
        };
        std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Commands that show (or hide) hidden files, in order
pub fn plan(show: bool) -> Vec<Step> {
    let value = if show { "true" } else { "false" };

    let writes = PREFERENCE_KEYS.iter().map(|pref| Step::Write {
        program: "defaults".to_string(),
        args: vec![
            "write".to_string(),
            pref.domain.to_string(),
            pref.key.to_string(),
            "-bool".to_string(),
            value.to_string(),
        ],
    });

    let restarts = RESTART_PROCESSES.iter().map(|name| Step::Restart {
        program: "killall".to_string(),
        args: vec![name.to_string()],
    });

    writes.chain(restarts).collect()
}

/// Interpret `defaults read` output for a boolean key
pub fn describe_value(output: Option<&str>) -> &'static str {
    match output.map(str::trim) {
        Some("1") | Some("true") | Some("YES") | Some("yes") => "shown",
        Some("0") | Some("false") | Some("NO") | Some("no") => "hidden",
        Some(_) => "unrecognised value",
        None => "not set",
    }
}

/// Execute the hidden-files command
pub fn execute(hide: bool, dry_run: bool, status: bool) -> Result<()> {
    system::require_program("defaults", MACOS_HINT)?;

    if status {
        for pref in PREFERENCE_KEYS {
            let output = system::run("defaults", ["read", pref.domain, pref.key])?;
            let value = output.success().then_some(output.stdout.as_str());
            println!("{} {}: {}", pref.domain, pref.key, describe_value(value));
        }
        return Ok(());
    }

    system::require_program("killall", MACOS_HINT)?;

    let steps = plan(!hide);

    if dry_run {
        for step in &steps {
            println!("  {} {}", "Would run:".blue(), step.command_line());
        }
        return Ok(());
    }

    for step in &steps {
        match step {
            Step::Write { program, args } => {
                system::run_checked(program, args)?;
                println!("{} {}", "Set:".green(), args[1..4].join(" "));
            }
            Step::Restart { program, args } => {
                let output = system::run(program, args)?;
                if output.success() {
                    println!("{} {}", "Restarted:".green(), args[0]);
                } else {
                    warn!(process = %args[0], "killall found nothing to restart");
                    println!("{} {} (not running)", "Skipped:".yellow(), args[0]);
                }
            }
        }
    }

    let state = if hide { "hidden" } else { "shown" };
    println!("\nHidden files are now {}.", state);
    Ok(())
}
