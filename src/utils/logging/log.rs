//! Logging utilities
//!
//! This module provides standardized logging functions for pipeline stages.

use std::path::Path;
use std::time::Duration;

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file that was operated on
/// * `items` - Number of rows processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    items: usize,
    elapsed: Option<Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!(
            "Successfully {} {} rows from {} in {:?}",
            operation,
            items,
            path.display(),
            duration
        );
    } else {
        log::info!(
            "Successfully {} {} rows from {}",
            operation,
            items,
            path.display()
        );
    }
}

/// Log the row counts entering and leaving an in-memory stage
///
/// # Arguments
/// * `stage` - Name of the stage
/// * `rows_in` - Rows handed to the stage
/// * `rows_out` - Rows the stage kept
/// * `elapsed` - Time spent in the stage
pub fn log_stage_complete(stage: &str, rows_in: usize, rows_out: usize, elapsed: Duration) {
    if rows_in == rows_out {
        log::info!("{stage}: {rows_out} rows in {elapsed:?}");
    } else {
        log::info!(
            "{stage}: kept {rows_out} of {rows_in} rows ({} excluded) in {elapsed:?}",
            rows_in - rows_out
        );
    }
}
