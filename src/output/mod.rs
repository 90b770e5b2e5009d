//! Output rendering and writers for trace results.
//!
//! This module handles:
//! - Number formatting for text renders
//! - Tab-separated (CSV) export of the rollup
//! - Text summaries
//! - Writing renders to disk

pub mod csv;
pub mod format;
pub mod summary;
pub mod writer;

// Re-export main functions
pub use self::csv::{csv_header, render_csv, render_metric_range, summary_headers};
pub use format::NumberFormat;
pub use summary::generate_text_summary;
pub use writer::write_text;

use crate::utils::error::OutputError;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
