use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use emp_metrics::PipelineConfig;
use parquet::arrow::ArrowWriter;

/// Header of a canonical employee export
pub const HEADER: &str = "emp_id,first_name,last_name,birth_date,gender,race,department,job_title,location,hire_date,term_date,location_city,location_state";

/// One employee row of a fixture file
#[derive(Debug, Clone)]
pub struct FixtureRow {
    pub emp_id: &'static str,
    pub birth_date: &'static str,
    pub gender: &'static str,
    pub race: &'static str,
    pub department: &'static str,
    pub job_title: &'static str,
    pub location: &'static str,
    pub hire_date: &'static str,
    pub term_date: &'static str,
    pub location_city: &'static str,
    pub location_state: &'static str,
}

impl Default for FixtureRow {
    fn default() -> Self {
        Self {
            emp_id: "00-0000001",
            birth_date: "06/04/85",
            gender: "Female",
            race: "White",
            department: "Engineering",
            job_title: "Software Engineer",
            location: "Headquarters",
            hire_date: "01/15/2004",
            term_date: "",
            location_city: "Cleveland",
            location_state: "Ohio",
        }
    }
}

impl FixtureRow {
    /// Render the row in canonical column order
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        [
            self.emp_id,
            "Jane",
            "Doe",
            self.birth_date,
            self.gender,
            self.race,
            self.department,
            self.job_title,
            self.location,
            self.hire_date,
            self.term_date,
            self.location_city,
            self.location_state,
        ]
        .join(",")
    }
}

/// A small workforce with two departments and two terminations
#[must_use]
pub fn sample_rows() -> Vec<FixtureRow> {
    vec![
        FixtureRow {
            emp_id: "00-0000001",
            ..FixtureRow::default()
        },
        FixtureRow {
            emp_id: "00-0000002",
            gender: "Male",
            race: "Asian",
            birth_date: "11/23/90",
            hire_date: "03-02-2006",
            term_date: "2012-09-30 00:00:00 UTC",
            ..FixtureRow::default()
        },
        FixtureRow {
            emp_id: "00-0000003",
            gender: "Male",
            department: "Sales",
            job_title: "Account Executive",
            location: "Remote",
            location_city: "Detroit",
            location_state: "Michigan",
            hire_date: "07/01/2010",
            ..FixtureRow::default()
        },
        FixtureRow {
            emp_id: "00-0000004",
            department: "Sales",
            job_title: "Account Executive",
            birth_date: "02/14/1978",
            hire_date: "09/09/2001",
            term_date: "2005-03-15 00:00:00 UTC",
            ..FixtureRow::default()
        },
        FixtureRow {
            emp_id: "00-0000005",
            gender: "Non-Conforming",
            race: "Hispanic or Latino",
            department: "Sales",
            job_title: "Sales Manager",
            hire_date: "05/20/2015",
            ..FixtureRow::default()
        },
    ]
}

/// Write rows as a CSV file with the given header
pub fn write_csv(dir: &Path, name: &str, header: &str, rows: &[FixtureRow]) -> PathBuf {
    let mut content = String::from(header);
    content.push('\n');
    for row in rows {
        content.push_str(&row.to_csv_line());
        content.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, content).expect("write csv fixture");
    path
}

/// Parquet fixture row: id, birth date, hire date, optional termination date
pub type ParquetRow<'a> = (&'a str, NaiveDate, NaiveDate, Option<NaiveDate>);

/// Write rows as a Parquet file; every date column is stored as `Date32`
pub fn write_parquet(dir: &Path, name: &str, rows: &[ParquetRow<'_>]) -> PathBuf {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");
    let days = |d: &NaiveDate| i32::try_from((*d - epoch).num_days()).expect("days fit");

    let text = |value: &str| -> ArrayRef {
        Arc::new(StringArray::from(vec![Some(value); rows.len()]))
    };
    let ids: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|(id, _, _, _)| Some(*id)).collect::<Vec<_>>(),
    ));
    let births: ArrayRef = Arc::new(Date32Array::from(
        rows.iter().map(|(_, b, _, _)| days(b)).collect::<Vec<_>>(),
    ));
    let hires: ArrayRef = Arc::new(Date32Array::from(
        rows.iter().map(|(_, _, h, _)| days(h)).collect::<Vec<_>>(),
    ));
    let terms: ArrayRef = Arc::new(Date32Array::from(
        rows.iter().map(|(_, _, _, t)| t.as_ref().map(days)).collect::<Vec<_>>(),
    ));

    let schema = Arc::new(Schema::new(vec![
        Field::new("emp_id", DataType::Utf8, true),
        Field::new("first_name", DataType::Utf8, true),
        Field::new("last_name", DataType::Utf8, true),
        Field::new("birthdate", DataType::Date32, true),
        Field::new("gender", DataType::Utf8, true),
        Field::new("race", DataType::Utf8, true),
        Field::new("department", DataType::Utf8, true),
        Field::new("jobtitle", DataType::Utf8, true),
        Field::new("location", DataType::Utf8, true),
        Field::new("hire_date", DataType::Date32, true),
        Field::new("termdate", DataType::Date32, true),
        Field::new("location_city", DataType::Utf8, true),
        Field::new("location_state", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            ids,
            text("Jane"),
            text("Doe"),
            births,
            text("Female"),
            text("White"),
            text("Engineering"),
            text("Analyst"),
            text("Remote"),
            hires,
            terms,
            text("Columbus"),
            text("Ohio"),
        ],
    )
    .expect("fixture batch");

    let path = dir.join(name);
    let file = File::create(&path).expect("create parquet fixture");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("parquet writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");
    path
}

/// Configuration pinned to a fixed reference date
#[must_use]
pub fn test_config() -> PipelineConfig {
    let as_of = NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid date");
    PipelineConfig::default().with_as_of_date(as_of)
}
