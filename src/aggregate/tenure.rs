//! Tenure of terminated employees
//!
//! Tenure is the difference between termination year and hire year; the
//! averages are rounded half away from zero to whole years.

use std::collections::BTreeMap;

use crate::aggregate::TenureRow;
use crate::models::Employee;

/// Group label of the company-wide tenure row
pub const ALL_EMPLOYEES: &str = "all";

/// Average tenure over every terminated employee
#[must_use]
pub fn average_tenure(employees: &[Employee]) -> Option<TenureRow> {
    let tenures: Vec<i32> = employees.iter().filter_map(Employee::tenure_years).collect();
    if tenures.is_empty() {
        return None;
    }
    Some(tenure_row(ALL_EMPLOYEES, &tenures))
}

/// Average tenure of terminated employees per department, by department
#[must_use]
pub fn tenure_by_department(employees: &[Employee]) -> Vec<TenureRow> {
    let mut departments: BTreeMap<&str, Vec<i32>> = BTreeMap::new();
    for employee in employees {
        if let Some(years) = employee.tenure_years() {
            departments
                .entry(employee.department.as_str())
                .or_default()
                .push(years);
        }
    }

    departments
        .into_iter()
        .map(|(department, tenures)| tenure_row(department, &tenures))
        .collect()
}

/// Rounded mean of whole-year tenures, `None` for an empty slice
#[must_use]
pub fn rounded_mean(tenures: &[i32]) -> Option<i64> {
    if tenures.is_empty() {
        return None;
    }
    let sum: i64 = tenures.iter().map(|&t| i64::from(t)).sum();
    let mean = sum as f64 / tenures.len() as f64;
    Some(mean.round() as i64)
}

fn tenure_row(group: &str, tenures: &[i32]) -> TenureRow {
    TenureRow {
        group: group.to_string(),
        terminated: tenures.len() as u64,
        average_tenure_years: rounded_mean(tenures),
    }
}
