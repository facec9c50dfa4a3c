//! Read-only inspection of Cursor IDE data on disk

pub mod database;
pub mod folder_uri;
pub mod locations;
pub mod report;
pub mod workspace;

pub use report::CursorPathsReport;
