//! Validation of the normalized table
//!
//! [`validate`] is a pure check that lists every violation it finds;
//! [`enforce`] applies the run policy to that list.

use std::time::Instant;

use log::{error, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;

use crate::config::DuplicatePolicy;
use crate::error::{EmpMetricsError, Result};
use crate::models::Employee;
use crate::normalize::EmployeeTable;
use crate::schema::{EMP_ID, GENDER, RACE};
use crate::utils::logging::log_stage_complete;

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The same identifier appears on several rows
    DuplicateKey {
        emp_id: String,
        /// Source row indices carrying the identifier, in table order
        rows: Vec<usize>,
    },
    /// A required categorical field is empty
    MissingField {
        row_index: usize,
        emp_id: String,
        field: &'static str,
    },
}

/// Every violation found in a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Whether the table passed every check
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Identifiers that occur more than once
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<&str> {
        self.violations
            .iter()
            .filter_map(|v| match v {
                Violation::DuplicateKey { emp_id, .. } => Some(emp_id.as_str()),
                Violation::MissingField { .. } => None,
            })
            .collect()
    }

    /// Missing-field violations
    pub fn missing_fields(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::MissingField { .. }))
    }
}

/// Check identifier uniqueness and categorical completeness
#[must_use]
pub fn validate(table: &EmployeeTable) -> ValidationReport {
    let mut violations: Vec<Violation> = table
        .employees
        .iter()
        .flat_map(missing_field_violations)
        .collect();
    violations.extend(duplicate_key_violations(&table.employees));
    ValidationReport { violations }
}

fn missing_field_violations(employee: &Employee) -> SmallVec<[Violation; 1]> {
    [
        (EMP_ID, &employee.emp_id),
        (GENDER, &employee.gender),
        (RACE, &employee.race),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| Violation::MissingField {
        row_index: employee.row_index,
        emp_id: employee.emp_id.clone(),
        field,
    })
    .collect()
}

fn duplicate_key_violations(employees: &[Employee]) -> Vec<Violation> {
    let mut rows_by_id: FxHashMap<&str, SmallVec<[usize; 2]>> = FxHashMap::default();
    let mut first_seen: Vec<&str> = Vec::new();

    for employee in employees.iter().filter(|e| !e.emp_id.is_empty()) {
        let rows = rows_by_id.entry(employee.emp_id.as_str()).or_default();
        if rows.is_empty() {
            first_seen.push(employee.emp_id.as_str());
        }
        rows.push(employee.row_index);
    }

    first_seen
        .into_iter()
        .filter_map(|id| {
            let rows = &rows_by_id[id];
            (rows.len() > 1).then(|| Violation::DuplicateKey {
                emp_id: id.to_string(),
                rows: rows.to_vec(),
            })
        })
        .collect()
}

/// Apply the run policy to a validation report.
///
/// Missing fields are always fatal. Duplicates are fatal under
/// [`DuplicatePolicy::Reject`]; under [`DuplicatePolicy::KeepFirst`] every
/// later occurrence of an identifier is dropped.
pub fn enforce(
    mut table: EmployeeTable,
    report: &ValidationReport,
    policy: DuplicatePolicy,
) -> Result<EmployeeTable> {
    let start = Instant::now();
    let rows_in = table.len();

    let mut missing = report.missing_fields();
    if let Some(Violation::MissingField {
        row_index,
        emp_id,
        field,
    }) = missing.next()
    {
        let others = missing.count();
        error!("Row {row_index}: missing {field}, {others} more missing field(s)");
        return Err(EmpMetricsError::MissingField {
            row: *row_index,
            emp_id: emp_id.clone(),
            field: *field,
        });
    }

    let duplicates = report.duplicate_ids();
    if !duplicates.is_empty() {
        match policy {
            DuplicatePolicy::Reject => {
                error!("{} duplicated emp_id value(s)", duplicates.len());
                return Err(EmpMetricsError::DuplicateKey {
                    ids: duplicates.iter().map(|id| (*id).to_string()).collect(),
                });
            }
            DuplicatePolicy::KeepFirst => {
                let mut seen: FxHashSet<String> = FxHashSet::default();
                table.employees.retain(|e| seen.insert(e.emp_id.clone()));
                warn!(
                    "Kept first occurrence of {} duplicated emp_id value(s), dropped {} row(s)",
                    duplicates.len(),
                    rows_in - table.len()
                );
            }
        }
    }

    log_stage_complete("Validation", rows_in, table.len(), start.elapsed());
    Ok(table)
}
