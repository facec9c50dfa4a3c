//! Transcribe command - Turn an audio recording into a reStructuredText document

use anyhow::{Context, Result};
use chrono::Local;
use owo_colors::OwoColorize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::HelperError;
use crate::system;
use crate::transcript::{self, DocInfo};

const WHISPER_HINT: &str = "Install it with: pip install -U openai-whisper";
const FFMPEG_HINT: &str = "Install it with: brew install ffmpeg";

/// Options for the transcribe command
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// Audio file to transcribe
    pub audio: PathBuf,
    /// Whisper model name (tiny, base, small, medium, large, turbo)
    pub model: String,
    /// Tidy the transcript into sentences and paragraphs
    pub clean: bool,
    /// Spoken language hint passed through to whisper
    pub language: Option<String>,
    /// Output file (defaults to the audio path with an .rst extension)
    pub output: Option<PathBuf>,
}

/// Execute the transcribe command and return the written path
pub fn execute(options: &TranscribeOptions) -> Result<PathBuf> {
    if !options.audio.is_file() {
        return Err(HelperError::NotFound(options.audio.clone()).into());
    }

    let whisper = system::require_program("whisper", WHISPER_HINT)?;
    system::require_program("ffmpeg", FFMPEG_HINT)?;

    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;

    println!(
        "Transcribing {} with model '{}'...",
        options.audio.display(),
        options.model
    );
    let text = run_whisper(&whisper, options, scratch.path())?;
    debug!(chars = text.len(), "transcript read");

    let title = audio_stem(&options.audio);
    let document = if options.clean {
        let info = DocInfo {
            source: options
                .audio
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            model: options.model.clone(),
            date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        };
        transcript::render_clean(&title, &text, &info)
    } else {
        transcript::render_plain(&title, &text)
    };

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&options.audio));

    fs::write(&output, document)
        .with_context(|| format!("Failed to write: {}", output.display()))?;
    info!(path = %output.display(), "transcript written");

    println!("{} {}", "Created:".green(), output.display());
    Ok(output)
}

/// Run whisper into a scratch directory and read back its text output
fn run_whisper(whisper: &Path, options: &TranscribeOptions, out_dir: &Path) -> Result<String> {
    let args = whisper_args(options, out_dir);
    let program = whisper.to_string_lossy();
    let output = system::run(&program, &args)?;

    if !output.success() {
        return Err(HelperError::command_failed("whisper", output.status, &output.stderr).into());
    }

    let text_path = out_dir.join(format!("{}.txt", audio_stem(&options.audio)));
    if !text_path.exists() {
        return Err(HelperError::OutputMissing(text_path).into());
    }

    fs::read_to_string(&text_path)
        .with_context(|| format!("Failed to read: {}", text_path.display()))
}

fn whisper_args(options: &TranscribeOptions, out_dir: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        options.audio.clone().into_os_string(),
        "--model".into(),
        options.model.clone().into(),
        "--output_format".into(),
        "txt".into(),
        "--output_dir".into(),
        out_dir.as_os_str().to_owned(),
    ];
    if let Some(language) = &options.language {
        args.push("--language".into());
        args.push(language.into());
    }
    args
}

fn audio_stem(audio: &Path) -> String {
    audio
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "transcript".to_string())
}

/// `<dir>/<stem>.rst` next to the audio file
pub fn default_output_path(audio: &Path) -> PathBuf {
    audio.with_extension("rst")
}
