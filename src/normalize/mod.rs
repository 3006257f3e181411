//! Record normalization
//!
//! Turns loaded [`RawRecord`]s into typed [`Employee`]s: dates are parsed,
//! `age` is derived and rows with unusable dates are excluded and counted.
//! Exclusions never abort the run.

pub mod date;

use std::fmt;
use std::time::Instant;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::loader::RawTable;
use crate::models::employee::{non_blank, text_or_empty};
use crate::models::{Employee, Location, RawRecord};
use crate::normalize::date::{
    DateFormatConfig, FormatAttempt, parse_calendar_date, parse_term_timestamp,
};
use crate::schema::{BIRTH_DATE, HIRE_DATE, TERM_DATE};
use crate::utils::logging::log_stage_complete;

/// Why a row was left out of the working set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// A date matched none of the accepted layouts
    UnparseableDate {
        column: &'static str,
        value: String,
    },
    /// A birth or termination date lies after the reference time
    FutureDate {
        column: &'static str,
        value: String,
    },
    /// The termination date precedes the hire date
    TermBeforeHire,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparseableDate { column, value } => {
                write!(f, "unparseable {column} '{value}'")
            }
            Self::FutureDate { column, value } => write!(f, "{column} {value} is in the future"),
            Self::TermBeforeHire => write!(f, "term_date precedes hire_date"),
        }
    }
}

/// A row removed by normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedRow {
    /// Zero-based row index in the source
    pub row_index: usize,
    /// Identifier of the row, empty when missing
    pub emp_id: String,
    pub reason: ExclusionReason,
}

/// Counts describing what normalization did to the table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub input_rows: usize,
    pub kept_rows: usize,
    pub excluded: Vec<ExcludedRow>,
    pub unparseable_dates: usize,
    pub future_dates: usize,
    pub term_before_hire: usize,
    /// Kept rows whose age is below the configured threshold
    pub under_age: usize,
}

impl NormalizationReport {
    /// Number of excluded rows
    #[must_use]
    pub fn excluded_rows(&self) -> usize {
        self.excluded.len()
    }

    fn record_exclusion(&mut self, row: ExcludedRow) {
        match row.reason {
            ExclusionReason::UnparseableDate { .. } => self.unparseable_dates += 1,
            ExclusionReason::FutureDate { .. } => self.future_dates += 1,
            ExclusionReason::TermBeforeHire => self.term_before_hire += 1,
        }
        self.excluded.push(row);
    }
}

/// The cleaned, immutable working table
#[derive(Debug, Clone)]
pub struct EmployeeTable {
    pub employees: Vec<Employee>,
    /// Reference time the table was normalized against
    pub as_of: NaiveDateTime,
}

impl EmployeeTable {
    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Re-derive every `age` from `birth_date` and the reference year
    pub fn refresh_ages(&mut self) {
        let year = self.as_of.year();
        for employee in &mut self.employees {
            employee.refresh_age(year);
        }
    }
}

/// Normalize a loaded table.
///
/// Rows with unparseable dates, future birth or termination dates, or a
/// termination before hire are excluded and counted in the report.
#[must_use]
pub fn normalize(raw: &RawTable, config: &PipelineConfig) -> (EmployeeTable, NormalizationReport) {
    let start = Instant::now();
    let mut report = NormalizationReport {
        input_rows: raw.len(),
        ..NormalizationReport::default()
    };
    let mut employees = Vec::with_capacity(raw.len());

    for (row_index, record) in raw.iter() {
        match normalize_record(row_index, record, config) {
            Ok(employee) => {
                if employee.age < config.under_age_threshold {
                    debug!(
                        "Row {row_index}: emp_id '{}' is {} years old",
                        employee.emp_id, employee.age
                    );
                    report.under_age += 1;
                }
                employees.push(employee);
            }
            Err(reason) => {
                debug!("Row {row_index}: excluded, {reason}");
                report.record_exclusion(ExcludedRow {
                    row_index,
                    emp_id: record.id_for_report(),
                    reason,
                });
            }
        }
    }

    report.kept_rows = employees.len();

    if report.excluded_rows() > 0 {
        warn!(
            "Excluded {} of {} rows: {} unparseable date(s), {} future date(s), {} termination(s) before hire",
            report.excluded_rows(),
            report.input_rows,
            report.unparseable_dates,
            report.future_dates,
            report.term_before_hire
        );
    }
    if report.under_age > 0 {
        warn!(
            "{} employee(s) younger than {}",
            report.under_age, config.under_age_threshold
        );
    }
    log_stage_complete("Normalization", report.input_rows, report.kept_rows, start.elapsed());

    let table = EmployeeTable {
        employees,
        as_of: config.as_of,
    };
    (table, report)
}

/// Normalize a single record, or say why it must be excluded
pub fn normalize_record(
    row_index: usize,
    record: &RawRecord,
    config: &PipelineConfig,
) -> Result<Employee, ExclusionReason> {
    let formats = &config.date_formats;
    let birth_date = parse_record_date(BIRTH_DATE, record.birth_date.as_deref(), formats)?;
    let hire_date = parse_record_date(HIRE_DATE, record.hire_date.as_deref(), formats)?;
    let term_date = parse_record_term_date(record.term_date.as_deref())?;

    if birth_date > config.as_of.date() {
        return Err(ExclusionReason::FutureDate {
            column: BIRTH_DATE,
            value: birth_date.to_string(),
        });
    }
    if let Some(term) = term_date {
        if term > config.as_of {
            return Err(ExclusionReason::FutureDate {
                column: TERM_DATE,
                value: term.to_string(),
            });
        }
        if term.date() < hire_date {
            return Err(ExclusionReason::TermBeforeHire);
        }
    }

    let mut employee = Employee {
        row_index,
        emp_id: text_or_empty(record.emp_id.as_deref()),
        first_name: text_or_empty(record.first_name.as_deref()),
        last_name: text_or_empty(record.last_name.as_deref()),
        birth_date,
        gender: text_or_empty(record.gender.as_deref()),
        race: text_or_empty(record.race.as_deref()),
        department: text_or_empty(record.department.as_deref()),
        job_title: text_or_empty(record.job_title.as_deref()),
        location: Location::from(non_blank(record.location.as_deref()).unwrap_or_default()),
        hire_date,
        term_date,
        location_city: text_or_empty(record.location_city.as_deref()),
        location_state: text_or_empty(record.location_state.as_deref()),
        age: 0,
    };
    employee.refresh_age(config.as_of.year());
    Ok(employee)
}

/// Parse a birth or hire date cell; blank cells are unparseable
pub fn parse_record_date(
    column: &'static str,
    value: Option<&str>,
    formats: &DateFormatConfig,
) -> Result<NaiveDate, ExclusionReason> {
    let text = non_blank(value).unwrap_or_default();
    match parse_calendar_date(text, formats) {
        FormatAttempt::Matched(date) => Ok(date),
        FormatAttempt::NoMatch | FormatAttempt::Malformed => Err(ExclusionReason::UnparseableDate {
            column,
            value: text.to_string(),
        }),
    }
}

/// Parse a termination cell; blank cells mean still employed
pub fn parse_record_term_date(
    value: Option<&str>,
) -> Result<Option<NaiveDateTime>, ExclusionReason> {
    let Some(text) = non_blank(value) else {
        return Ok(None);
    };
    parse_term_timestamp(text)
        .map(Some)
        .ok_or_else(|| ExclusionReason::UnparseableDate {
            column: TERM_DATE,
            value: text.to_string(),
        })
}
