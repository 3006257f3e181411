//! Configuration for the employee metrics pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::EmpMetricsError;
use crate::normalize::date::DateFormatConfig;

/// What to do when two records share an `emp_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Abort the run before any metric is computed
    #[default]
    Reject,
    /// Keep the first occurrence of each id and drop the rest
    KeepFirst,
}

impl FromStr for DuplicatePolicy {
    type Err = EmpMetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "keep-first" | "keep_first" | "first" => Ok(Self::KeepFirst),
            other => Err(EmpMetricsError::ConfigError(format!(
                "unknown duplicate policy '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::KeepFirst => write!(f, "keep-first"),
        }
    }
}

/// How ages outside the four decade buckets are classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeBucketPolicy {
    /// Ages outside 20..=59 fall into `50-59`, matching the source dashboard
    #[default]
    SourceFallthrough,
    /// Ages outside 20..=59 get their own `under 20` and `60+` buckets
    Explicit,
}

impl FromStr for AgeBucketPolicy {
    type Err = EmpMetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" | "source-fallthrough" | "fallthrough" => Ok(Self::SourceFallthrough),
            "explicit" => Ok(Self::Explicit),
            other => Err(EmpMetricsError::ConfigError(format!(
                "unknown age bucket policy '{other}'"
            ))),
        }
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Accepted birth/hire date formats and the two-digit-year pivot
    pub date_formats: DateFormatConfig,
    /// Reference timestamp used wherever the pipeline needs "now"
    pub as_of: NaiveDateTime,
    /// Handling of repeated identifiers
    pub duplicate_policy: DuplicatePolicy,
    /// Handling of ages outside the decade buckets
    pub age_bucket_policy: AgeBucketPolicy,
    /// Ages below this are counted as a data-quality signal
    pub under_age_threshold: i32,
    /// Number of job titles kept by the top job titles metric
    pub top_job_titles: usize,
    /// Compute metrics on a rayon pool
    pub parallel: bool,
    /// Size of the aggregation pool, `None` for one thread per CPU
    pub threads: Option<usize>,
    /// Rows per record batch when reading CSV
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            date_formats: DateFormatConfig::default(),
            as_of: Local::now().naive_local(),
            duplicate_policy: DuplicatePolicy::default(),
            age_bucket_policy: AgeBucketPolicy::default(),
            under_age_threshold: 18,
            top_job_titles: 10,
            parallel: true,
            threads: None,
            batch_size: 8192,
        }
    }
}

impl PipelineConfig {
    /// Pin the reference timestamp
    #[must_use]
    pub fn with_as_of(mut self, as_of: NaiveDateTime) -> Self {
        self.as_of = as_of;
        self
    }

    /// Pin the reference timestamp to the end of the given day
    #[must_use]
    pub fn with_as_of_date(self, date: NaiveDate) -> Self {
        let end_of_day = date.and_hms_opt(23, 59, 59).unwrap_or_default();
        self.with_as_of(end_of_day)
    }

    /// Set the duplicate identifier policy
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Set the age bucket policy
    #[must_use]
    pub fn with_age_bucket_policy(mut self, policy: AgeBucketPolicy) -> Self {
        self.age_bucket_policy = policy;
        self
    }

    /// Set the two-digit-year pivot
    #[must_use]
    pub fn with_pivot_year(mut self, pivot: u32) -> Self {
        self.date_formats.two_digit_year_pivot = pivot;
        self
    }

    /// Enable or disable parallel aggregation
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the aggregation pool size
    #[must_use]
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.date_formats.formats.is_empty() {
            return Err(EmpMetricsError::ConfigError(
                "at least one date format is required".to_string(),
            ));
        }
        if self.date_formats.two_digit_year_pivot > 99 {
            return Err(EmpMetricsError::ConfigError(format!(
                "two-digit-year pivot must be within 0..=99, got {}",
                self.date_formats.two_digit_year_pivot
            )));
        }
        if self.batch_size == 0 {
            return Err(EmpMetricsError::ConfigError(
                "batch size must be positive".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(EmpMetricsError::ConfigError(
                "thread count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
