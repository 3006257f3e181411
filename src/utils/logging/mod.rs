//! Logging utilities for output and progress tracking

pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use log::{log_operation_complete, log_operation_start, log_stage_complete};
pub use progress::{create_stage_progress_bar, finish_progress_bar};
