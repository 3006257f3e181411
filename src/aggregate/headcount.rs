//! Headcount distributions
//!
//! Ties in count are broken by the group label so every ordering is
//! deterministic.

use std::cmp::Reverse;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::aggregate::{CountRow, DepartmentGenderRow, count_by};
use crate::config::AgeBucketPolicy;
use crate::models::{AgeBucket, Employee};

/// Employees per gender, ordered by gender
#[must_use]
pub fn gender_breakdown(employees: &[Employee]) -> Vec<CountRow> {
    by_group(count_by(employees, |e| e.gender.as_str()))
}

/// Employees per race, largest first
#[must_use]
pub fn race_breakdown(employees: &[Employee]) -> Vec<CountRow> {
    by_count_desc(count_by(employees, |e| e.race.as_str()))
}

/// Employees per age bucket, largest first
#[must_use]
pub fn age_distribution(employees: &[Employee], policy: AgeBucketPolicy) -> Vec<CountRow> {
    by_count_desc(count_by(employees, |e| age_bucket(e.age, policy).label()))
}

/// Employees per work location, ordered by location
#[must_use]
pub fn location_breakdown(employees: &[Employee]) -> Vec<CountRow> {
    by_group(count_by(employees, |e| e.location.label()))
}

/// Employees per gender within each department.
///
/// Ordered by department, then count descending, then gender.
#[must_use]
pub fn gender_by_department(employees: &[Employee]) -> Vec<DepartmentGenderRow> {
    count_by(employees, |e| (e.department.as_str(), e.gender.as_str()))
        .into_iter()
        .sorted_by_key(|&((department, gender), count)| (department, Reverse(count), gender))
        .map(|((department, gender), count)| DepartmentGenderRow {
            department: department.to_string(),
            gender: gender.to_string(),
            count,
        })
        .collect()
}

/// The `limit` most common job titles, largest first
#[must_use]
pub fn top_job_titles(employees: &[Employee], limit: usize) -> Vec<CountRow> {
    let mut rows = job_title_distribution(employees);
    rows.truncate(limit);
    rows
}

/// Employees per job title, largest first
#[must_use]
pub fn job_title_distribution(employees: &[Employee]) -> Vec<CountRow> {
    by_count_desc(count_by(employees, |e| e.job_title.as_str()))
}

/// Employees per state, largest first
#[must_use]
pub fn distribution_by_state(employees: &[Employee]) -> Vec<CountRow> {
    by_count_desc(count_by(employees, |e| e.location_state.as_str()))
}

/// Employees per city, largest first
#[must_use]
pub fn location_by_city(employees: &[Employee]) -> Vec<CountRow> {
    by_count_desc(count_by(employees, |e| e.location_city.as_str()))
}

/// Classify an age.
///
/// Under [`AgeBucketPolicy::SourceFallthrough`] every age outside 20..=59
/// lands in `50-59`.
#[must_use]
pub fn age_bucket(age: i32, policy: AgeBucketPolicy) -> AgeBucket {
    match (age, policy) {
        (20..=29, _) => AgeBucket::Twenties,
        (30..=39, _) => AgeBucket::Thirties,
        (40..=49, _) => AgeBucket::Forties,
        (_, AgeBucketPolicy::SourceFallthrough) | (50..=59, AgeBucketPolicy::Explicit) => {
            AgeBucket::Fifties
        }
        (young, AgeBucketPolicy::Explicit) if young < 20 => AgeBucket::Under20,
        (_, AgeBucketPolicy::Explicit) => AgeBucket::SixtyPlus,
    }
}

fn by_group(counts: FxHashMap<&str, u64>) -> Vec<CountRow> {
    counts
        .into_iter()
        .sorted_by_key(|&(group, _)| group)
        .map(count_row)
        .collect()
}

fn by_count_desc(counts: FxHashMap<&str, u64>) -> Vec<CountRow> {
    counts
        .into_iter()
        .sorted_by_key(|&(group, count)| (Reverse(count), group))
        .map(count_row)
        .collect()
}

fn count_row((group, count): (&str, u64)) -> CountRow {
    CountRow {
        group: group.to_string(),
        count,
    }
}
