//! Turnover metrics
//!
//! Turnover of a group is the share of its employees that carry a
//! termination date, in percent with one decimal.

use std::collections::BTreeMap;
use std::hash::Hash;

use chrono::Datelike;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::aggregate::{HeadcountChangeRow, TurnoverRow, round_to};
use crate::models::Employee;

/// Turnover in percent; a group without employees has zero turnover
#[must_use]
pub fn turnover_percent(terminated: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(terminated as f64 / total as f64 * 100.0, 1)
}

/// The department with the highest turnover, ties broken by name
#[must_use]
pub fn highest_turnover_department(employees: &[Employee]) -> Option<TurnoverRow> {
    turnover_by(employees, |e| e.department.clone())
        .into_iter()
        .next()
}

/// Turnover per job title, highest first
#[must_use]
pub fn turnover_by_job_title(employees: &[Employee]) -> Vec<TurnoverRow> {
    turnover_by(employees, |e| e.job_title.clone())
}

/// Turnover per hire year, highest first
#[must_use]
pub fn turnover_by_hire_year(employees: &[Employee]) -> Vec<TurnoverRow> {
    turnover_by(employees, |e| e.hire_date.year())
}

/// Turnover per group, highest first, ties broken by ascending key
pub fn turnover_by<K, F>(employees: &[Employee], key: F) -> Vec<TurnoverRow>
where
    K: Eq + Hash + Ord + ToString,
    F: Fn(&Employee) -> K,
{
    let mut groups: FxHashMap<K, (u64, u64)> = FxHashMap::default();
    for employee in employees {
        let (total, terminated) = groups.entry(key(employee)).or_insert((0, 0));
        *total += 1;
        if employee.is_terminated() {
            *terminated += 1;
        }
    }

    groups
        .into_iter()
        .map(|(group, (total, terminated))| {
            let percent = turnover_percent(terminated, total);
            (group, total, terminated, percent)
        })
        .sorted_by(|a, b| b.3.total_cmp(&a.3).then_with(|| a.0.cmp(&b.0)))
        .map(|(group, total, terminated, turnover_percent)| TurnoverRow {
            group: group.to_string(),
            total,
            terminated,
            turnover_percent,
        })
        .collect()
}

/// Hires, terminations and net change per calendar year, oldest first
#[must_use]
pub fn headcount_change_by_year(employees: &[Employee]) -> Vec<HeadcountChangeRow> {
    let mut years: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
    for employee in employees {
        years.entry(employee.hire_date.year()).or_default().0 += 1;
        if let Some(term) = employee.term_date {
            years.entry(term.year()).or_default().1 += 1;
        }
    }

    years
        .into_iter()
        .map(|(year, (hires, terminations))| {
            let net_change = hires as i64 - terminations as i64;
            let net_change_percent = if hires == 0 {
                0.0
            } else {
                round_to(net_change as f64 / hires as f64 * 100.0, 2)
            };
            HeadcountChangeRow {
                year,
                hires,
                terminations,
                net_change,
                net_change_percent,
            }
        })
        .collect()
}
