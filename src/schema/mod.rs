//! Column layout of the employee dataset.
//!
//! Every column is read as text. Source headers are matched against the
//! canonical names and a small set of aliases used by the raw HR export.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

pub const EMP_ID: &str = "emp_id";
pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const BIRTH_DATE: &str = "birth_date";
pub const GENDER: &str = "gender";
pub const RACE: &str = "race";
pub const DEPARTMENT: &str = "department";
pub const JOB_TITLE: &str = "job_title";
pub const LOCATION: &str = "location";
pub const HIRE_DATE: &str = "hire_date";
pub const TERM_DATE: &str = "term_date";
pub const LOCATION_CITY: &str = "location_city";
pub const LOCATION_STATE: &str = "location_state";

/// Canonical column names in schema order
pub const EMPLOYEE_COLUMNS: [&str; 13] = [
    EMP_ID,
    FIRST_NAME,
    LAST_NAME,
    BIRTH_DATE,
    GENDER,
    RACE,
    DEPARTMENT,
    JOB_TITLE,
    LOCATION,
    HIRE_DATE,
    TERM_DATE,
    LOCATION_CITY,
    LOCATION_STATE,
];

/// Header spellings found in raw exports, mapped to canonical names
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("id", EMP_ID),
    ("employee_id", EMP_ID),
    ("birthdate", BIRTH_DATE),
    ("jobtitle", JOB_TITLE),
    ("hiredate", HIRE_DATE),
    ("termdate", TERM_DATE),
];

/// The all-text Arrow schema of a loaded employee table
#[must_use]
pub fn employee_schema() -> SchemaRef {
    let fields: Vec<Field> = EMPLOYEE_COLUMNS
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Map a source header to its canonical column name.
///
/// Matching trims whitespace and a leading byte-order mark and ignores case.
/// Returns `None` for headers that are not part of the employee schema.
#[must_use]
pub fn canonical_column_name(header: &str) -> Option<&'static str> {
    let cleaned = header.trim().trim_start_matches('\u{feff}').trim();
    // Spreadsheet exports sometimes carry the BOM decoded as Latin-1
    let cleaned = cleaned.trim_start_matches("ï»¿").to_lowercase();

    EMPLOYEE_COLUMNS
        .iter()
        .copied()
        .find(|name| *name == cleaned)
        .or_else(|| {
            COLUMN_ALIASES
                .iter()
                .find(|(alias, _)| *alias == cleaned)
                .map(|(_, canonical)| *canonical)
        })
}

/// Resolve the source position of every canonical column.
///
/// Returns the source index for each entry of [`EMPLOYEE_COLUMNS`], or the
/// list of canonical names that could not be found. When several headers map
/// to the same column the first one wins.
pub fn resolve_columns<'a, I>(headers: I) -> Result<Vec<usize>, Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut positions: [Option<usize>; 13] = [None; 13];
    for (idx, header) in headers.into_iter().enumerate() {
        if let Some(canonical) = canonical_column_name(header) {
            if let Some(slot) = EMPLOYEE_COLUMNS.iter().position(|c| *c == canonical) {
                positions[slot].get_or_insert(idx);
            }
        }
    }

    let missing: Vec<String> = EMPLOYEE_COLUMNS
        .iter()
        .zip(positions.iter())
        .filter(|(_, pos)| pos.is_none())
        .map(|(name, _)| (*name).to_string())
        .collect();

    if missing.is_empty() {
        Ok(positions.iter().flatten().copied().collect())
    } else {
        Err(missing)
    }
}
