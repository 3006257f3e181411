//! End-to-end pipeline: load, normalize, validate, aggregate.
//!
//! Each stage takes the previous stage's output by value or reference; no
//! state is shared between runs.

use std::path::Path;

use indicatif::ProgressBar;
use log::info;
use serde::Serialize;

use crate::aggregate::compute_metrics;
use crate::config::{DuplicatePolicy, PipelineConfig};
use crate::error::Result;
use crate::loader::{RawTable, load_table};
use crate::normalize::{NormalizationReport, normalize};
use crate::report::PipelineReport;
use crate::validate::{ValidationReport, enforce, validate};

/// Number of stages a full run advances a progress bar by
pub const PIPELINE_STAGES: u64 = 4;

/// Number of stages a check advances a progress bar by
pub const CHECK_STAGES: u64 = 3;

/// Normalization and validation outcome without metrics
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub source: String,
    /// Policy the violations were judged against
    pub duplicate_policy: DuplicatePolicy,
    pub normalization: NormalizationReport,
    pub validation: ValidationReport,
}

impl CheckReport {
    /// Whether a full run over the same input would abort
    #[must_use]
    pub fn has_fatal_violations(&self) -> bool {
        let missing = self.validation.missing_fields().next().is_some();
        let duplicates = !self.validation.duplicate_ids().is_empty();
        missing || (duplicates && self.duplicate_policy == DuplicatePolicy::Reject)
    }
}

/// A configured pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    /// Create a pipeline with the given configuration
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Advance the given bar once per completed stage
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The configuration this pipeline runs with
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a file and run every stage over it
    pub fn run(&self, path: &Path) -> Result<PipelineReport> {
        self.config.validate()?;
        let raw = self.load(path)?;
        self.run_table(&raw)
    }

    /// Run normalization, validation and aggregation over a loaded table.
    ///
    /// A fatal validation error aborts the run before any metric is computed.
    pub fn run_table(&self, raw: &RawTable) -> Result<PipelineReport> {
        self.config.validate()?;

        self.stage("Normalizing");
        let (table, normalization) = normalize(raw, &self.config);
        self.advance();

        self.stage("Validating");
        let validation = validate(&table);
        info!(
            "Enforcing validation with duplicate policy '{}'",
            self.config.duplicate_policy
        );
        let table = enforce(table, &validation, self.config.duplicate_policy)?;
        self.advance();

        self.stage("Aggregating");
        let metrics = compute_metrics(&table, &self.config)?;
        self.advance();

        Ok(PipelineReport {
            source: raw.source.clone(),
            as_of: table.as_of,
            normalization,
            validation,
            metrics,
        })
    }

    /// Load, normalize and validate without enforcing or aggregating
    pub fn check(&self, path: &Path) -> Result<CheckReport> {
        self.config.validate()?;
        let raw = self.load(path)?;

        self.stage("Normalizing");
        let (table, normalization) = normalize(&raw, &self.config);
        self.advance();

        self.stage("Validating");
        let validation = validate(&table);
        self.advance();

        Ok(CheckReport {
            source: raw.source,
            duplicate_policy: self.config.duplicate_policy,
            normalization,
            validation,
        })
    }

    fn load(&self, path: &Path) -> Result<RawTable> {
        self.stage("Loading");
        let raw = load_table(path, self.config.batch_size)?;
        self.advance();
        Ok(raw)
    }

    fn stage(&self, name: &'static str) {
        if let Some(pb) = &self.progress {
            pb.set_message(name);
        }
    }

    fn advance(&self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }
}

/// Run the whole pipeline over a file with the given configuration
pub fn run_pipeline(path: &Path, config: &PipelineConfig) -> Result<PipelineReport> {
    Pipeline::new(config.clone()).run(path)
}
