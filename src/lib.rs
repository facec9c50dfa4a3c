//! mac-helper library
//!
//! Small macOS maintenance chores behind one CLI: audio transcription via
//! whisper, system enumeration reports, Cursor data discovery, Finder hidden
//! file toggling and Obsidian cache flushing.
//!
//! Every command shells out to stock system tools or reads files in place.
//! A missing required tool is reported with an install hint.

pub mod commands;
pub mod config;
pub mod cursor;
pub mod error;
pub mod system;
pub mod transcript;

pub use error::HelperError;
