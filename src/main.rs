//! mac-helper: CLI for macOS maintenance chores

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mac_helper::commands;
use mac_helper::config;

#[derive(Parser)]
#[command(name = "mac-helper")]
#[command(about = "CLI helper for macOS maintenance chores", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe an audio file with whisper into a reStructuredText document
    Transcribe {
        /// Audio file (m4a, mp3, wav, ...)
        audio_file: PathBuf,

        /// Whisper model: tiny, base, small, medium, large, turbo
        #[arg(env = "WHISPER_MODEL", default_value = config::DEFAULT_WHISPER_MODEL)]
        model: String,

        /// Tidy the text: drop filler words, split into sentences and paragraphs
        #[arg(long)]
        clean: bool,

        /// Spoken language (passed to whisper, e.g. en)
        #[arg(long, short)]
        language: Option<String>,

        /// Output file (defaults to <audio-file without extension>.rst)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Write a timestamped report of read-only system introspection commands
    SysReport {
        /// Directory to create the report folder in (default: current directory)
        #[arg(long, short)]
        output_dir: Option<PathBuf>,

        /// List the report sections instead of running them
        #[arg(long)]
        list: bool,
    },

    /// Find where Cursor stores its data and summarise sizes
    CursorPaths {
        /// Output format: 1 = text, 2 = JSON, 3 = both
        #[arg(
            short = 'f',
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u8).range(1..=3)
        )]
        format: u8,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show hidden files in Finder (and all file extensions)
    HiddenFiles {
        /// Hide them again instead
        #[arg(long)]
        hide: bool,

        /// Show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print the current settings and exit
        #[arg(long, conflicts_with_all = ["hide", "dry_run"])]
        status: bool,
    },

    /// Quit Obsidian, back up and delete its caches and lock files
    ObsidianFlush {
        /// Show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Delete without keeping a backup
        #[arg(long, conflicts_with = "archive")]
        no_backup: bool,

        /// Store the backup as a single .tar.gz
        #[arg(long)]
        archive: bool,

        /// Backup root (default: ~/obsidian_cache_backup)
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Transcribe {
            audio_file,
            model,
            clean,
            language,
            output,
        } => {
            let options = commands::transcribe::TranscribeOptions {
                audio: audio_file,
                model,
                clean,
                language,
                output,
            };
            commands::transcribe::execute(&options)?;
        }

        Commands::SysReport { output_dir, list } => {
            commands::sys_report::execute(output_dir.as_deref(), list)?;
        }

        Commands::CursorPaths { format, output } => {
            let format = commands::cursor_paths::OutputFormat::from_number(format)?;
            commands::cursor_paths::execute(format, output.as_deref())?;
        }

        Commands::HiddenFiles {
            hide,
            dry_run,
            status,
        } => {
            if dry_run {
                println!("{}", "(DRY-RUN MODE - no changes will be made)".blue());
            }
            commands::hidden_files::execute(hide, dry_run, status)?;
        }

        Commands::ObsidianFlush {
            dry_run,
            no_backup,
            archive,
            backup_dir,
        } => {
            if dry_run {
                println!("{}", "(DRY-RUN MODE - no changes will be made)".blue());
            }
            commands::obsidian_flush::execute(dry_run, no_backup, archive, backup_dir)?;
        }
    }

    Ok(())
}
