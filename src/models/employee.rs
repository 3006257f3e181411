//! Employee entity model
//!
//! A [`RawRecord`] is one source row exactly as loaded, every field optional
//! text. The normalizer turns it into an [`Employee`] with parsed dates and
//! the derived age.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::types::Location;

/// One source row, all fields as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub emp_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub hire_date: Option<String>,
    pub term_date: Option<String>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
}

impl RawRecord {
    /// Identifier used in diagnostics, empty when missing
    #[must_use]
    pub fn id_for_report(&self) -> String {
        text_or_empty(self.emp_id.as_deref())
    }
}

/// Trim a text cell, mapping blank cells to `None`
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Trimmed text of a cell, empty when the cell is null or blank
#[must_use]
pub fn text_or_empty(value: Option<&str>) -> String {
    non_blank(value).unwrap_or_default().to_string()
}

/// A cleaned employee record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    /// Zero-based position of the row in the source
    pub row_index: usize,
    pub emp_id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub race: String,
    pub department: String,
    pub job_title: String,
    pub location: Location,
    pub hire_date: NaiveDate,
    /// `None` while the employee is still employed
    pub term_date: Option<NaiveDateTime>,
    pub location_city: String,
    pub location_state: String,
    /// Derived from `birth_date` and the reference year
    pub age: i32,
}

impl Employee {
    /// Age in whole calendar years at the given reference year
    #[must_use]
    pub fn derive_age(birth_date: NaiveDate, reference_year: i32) -> i32 {
        reference_year - birth_date.year()
    }

    /// Recompute `age` from `birth_date`; applying it twice changes nothing
    pub fn refresh_age(&mut self, reference_year: i32) {
        self.age = Self::derive_age(self.birth_date, reference_year);
    }

    /// Whether the employee has left the company
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.term_date.is_some()
    }

    /// Whole years between hire year and termination year
    #[must_use]
    pub fn tenure_years(&self) -> Option<i32> {
        self.term_date
            .map(|term| term.date().year() - self.hire_date.year())
    }
}
