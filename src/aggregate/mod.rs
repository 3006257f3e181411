//! Workforce metrics over the cleaned employee table
//!
//! Every metric is an independent, read-only reduction over the same slice
//! of employees. [`compute_metrics`] runs them on a rayon pool; with
//! `parallel` disabled the pool has a single thread.

pub mod headcount;
pub mod tenure;
pub mod turnover;

use std::hash::Hash;
use std::time::Instant;

use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{AgeBucketPolicy, PipelineConfig};
use crate::error::{EmpMetricsError, Result};
use crate::models::Employee;
use crate::normalize::EmployeeTable;

/// Headcount of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub group: String,
    pub count: u64,
}

/// Headcount of one gender within one department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentGenderRow {
    pub department: String,
    pub gender: String,
    pub count: u64,
}

/// Turnover of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverRow {
    pub group: String,
    pub total: u64,
    pub terminated: u64,
    /// `terminated / total * 100`, one decimal, 0 for an empty group
    pub turnover_percent: f64,
}

/// Average tenure of terminated employees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureRow {
    pub group: String,
    pub terminated: u64,
    /// Rounded average in whole years, `None` when nobody was terminated
    pub average_tenure_years: Option<i64>,
}

/// Hires and terminations in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadcountChangeRow {
    pub year: i32,
    pub hires: u64,
    pub terminations: u64,
    pub net_change: i64,
    /// `net_change / hires * 100`, two decimals, 0 when nobody was hired
    pub net_change_percent: f64,
}

/// All metrics of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsReport {
    pub total_employees: u64,
    pub gender_breakdown: Vec<CountRow>,
    pub race_breakdown: Vec<CountRow>,
    pub age_distribution: Vec<CountRow>,
    pub location_breakdown: Vec<CountRow>,
    pub average_tenure: Option<TenureRow>,
    pub gender_by_department: Vec<DepartmentGenderRow>,
    pub top_job_titles: Vec<CountRow>,
    pub highest_turnover_department: Option<TurnoverRow>,
    pub turnover_by_job_title: Vec<TurnoverRow>,
    pub turnover_by_hire_year: Vec<TurnoverRow>,
    pub distribution_by_state: Vec<CountRow>,
    pub headcount_change_by_year: Vec<HeadcountChangeRow>,
    pub tenure_by_department: Vec<TenureRow>,
    pub location_by_city: Vec<CountRow>,
}

/// Settings the metrics depend on
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    pub age_bucket_policy: AgeBucketPolicy,
    pub top_job_titles: usize,
}

impl From<&PipelineConfig> for AggregateOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            age_bucket_policy: config.age_bucket_policy,
            top_job_titles: config.top_job_titles,
        }
    }
}

/// Compute every metric over a validated table
pub fn compute_metrics(table: &EmployeeTable, config: &PipelineConfig) -> Result<MetricsReport> {
    let start = Instant::now();
    let threads = if config.parallel {
        config.threads.unwrap_or_else(num_cpus::get)
    } else {
        1
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| EmpMetricsError::ConfigError(format!("cannot build thread pool: {e}")))?;

    let report = pool.install(|| metrics_for(&table.employees, AggregateOptions::from(config)));

    info!(
        "Computed metrics over {} employees on {} thread(s) in {:?}",
        report.total_employees,
        threads,
        start.elapsed()
    );
    Ok(report)
}

/// Compute every metric in the current rayon pool
#[must_use]
pub fn metrics_for(employees: &[Employee], options: AggregateOptions) -> MetricsReport {
    let mut report = MetricsReport {
        total_employees: employees.len() as u64,
        ..MetricsReport::default()
    };

    let MetricsReport {
        gender_breakdown,
        race_breakdown,
        age_distribution,
        location_breakdown,
        average_tenure,
        gender_by_department,
        top_job_titles,
        highest_turnover_department,
        turnover_by_job_title,
        turnover_by_hire_year,
        distribution_by_state,
        headcount_change_by_year,
        tenure_by_department,
        location_by_city,
        ..
    } = &mut report;

    rayon::scope(|s| {
        s.spawn(move |_| *gender_breakdown = headcount::gender_breakdown(employees));
        s.spawn(move |_| *race_breakdown = headcount::race_breakdown(employees));
        s.spawn(move |_| {
            *age_distribution = headcount::age_distribution(employees, options.age_bucket_policy);
        });
        s.spawn(move |_| *location_breakdown = headcount::location_breakdown(employees));
        s.spawn(move |_| *average_tenure = tenure::average_tenure(employees));
        s.spawn(move |_| *gender_by_department = headcount::gender_by_department(employees));
        s.spawn(move |_| {
            *top_job_titles = headcount::top_job_titles(employees, options.top_job_titles);
        });
        s.spawn(move |_| {
            *highest_turnover_department = turnover::highest_turnover_department(employees);
        });
        s.spawn(move |_| *turnover_by_job_title = turnover::turnover_by_job_title(employees));
        s.spawn(move |_| *turnover_by_hire_year = turnover::turnover_by_hire_year(employees));
        s.spawn(move |_| *distribution_by_state = headcount::distribution_by_state(employees));
        s.spawn(move |_| {
            *headcount_change_by_year = turnover::headcount_change_by_year(employees);
        });
        s.spawn(move |_| *tenure_by_department = tenure::tenure_by_department(employees));
        s.spawn(move |_| *location_by_city = headcount::location_by_city(employees));
    });

    report
}

/// Count employees per key
pub(crate) fn count_by<'a, K, F>(employees: &'a [Employee], key: F) -> FxHashMap<K, u64>
where
    K: Eq + Hash,
    F: Fn(&'a Employee) -> K,
{
    employees.iter().fold(FxHashMap::default(), |mut counts, e| {
        *counts.entry(key(e)).or_insert(0) += 1;
        counts
    })
}

/// Round half away from zero to the given number of decimals
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
