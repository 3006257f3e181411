//! A Rust library for cleaning employee records and computing workforce
//! headcount and turnover metrics from CSV or Parquet exports.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod utils;
pub mod validate;

// Re-export the most common types for easier use
// Core types
pub use config::{AgeBucketPolicy, DuplicatePolicy, PipelineConfig};
pub use error::{EmpMetricsError, Result};
pub use models::{AgeBucket, Employee, Location, RawRecord};

// Stages
pub use aggregate::{MetricsReport, compute_metrics};
pub use loader::{RawTable, load_table};
pub use normalize::{EmployeeTable, NormalizationReport, normalize};
pub use validate::{ValidationReport, Violation, enforce, validate};

// Running and rendering
pub use pipeline::{CheckReport, Pipeline, run_pipeline};
pub use report::{OutputFormat, PipelineReport, render_text, write_csv_dir, write_json};
