//! Error handling for the employee metrics pipeline.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Specialized error type for the pipeline
#[derive(Debug, Error)]
pub enum EmpMetricsError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Error building or converting Arrow data
    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),

    /// Error reading Parquet data
    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),

    /// Error converting between record batches and rows
    #[error("Conversion error: {0}")]
    ConversionError(#[from] serde_arrow::Error),

    /// Error serializing a report
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The input file type is not supported
    #[error("Unsupported input format: {}", path.display())]
    UnsupportedFormat {
        /// Path of the rejected input
        path: PathBuf,
    },

    /// One or more expected columns are absent from the source
    #[error("Schema mismatch in {source_name}: missing column(s) {}", missing.join(", "))]
    SchemaMismatch {
        /// Name of the source that was loaded
        source_name: String,
        /// Canonical names of the missing columns
        missing: Vec<String>,
    },

    /// The identifier column contains repeated values
    #[error("Duplicate emp_id value(s): {}", ids.join(", "))]
    DuplicateKey {
        /// Offending identifiers
        ids: Vec<String>,
    },

    /// A categorical column required for grouping is empty
    #[error("Row {row} (emp_id '{emp_id}'): missing required field {field}")]
    MissingField {
        /// Zero-based row index in the source
        row: usize,
        /// Identifier of the offending row, possibly empty
        emp_id: String,
        /// Name of the empty column
        field: &'static str,
    },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, EmpMetricsError>;
