use chrono::NaiveDate;
use emp_metrics::{EmpMetricsError, load_table, normalize, run_pipeline};

use crate::utils::{FixtureRow, HEADER, sample_rows, test_config, write_csv, write_parquet};

#[test]
fn test_load_csv_keeps_every_row_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "hr.csv", HEADER, &sample_rows());

    let table = load_table(&path, 2).unwrap();
    assert_eq!(table.len(), 5);

    let first = table.get(0).unwrap();
    assert_eq!(first.emp_id.as_deref(), Some("00-0000001"));
    assert_eq!(first.birth_date.as_deref(), Some("06/04/85"));
    let second = table.get(1).unwrap();
    assert_eq!(second.term_date.as_deref(), Some("2012-09-30 00:00:00 UTC"));
}

#[test]
fn test_load_csv_with_raw_export_headers() {
    let dir = tempfile::tempdir().unwrap();
    let header = "\u{feff}id,first_name,last_name,birthdate,gender,race,department,jobtitle,location,hiredate,termdate,location_city,location_state";
    let path = write_csv(dir.path(), "raw.csv", header, &sample_rows()[..2]);

    let table = load_table(&path, 1024).unwrap();
    assert_eq!(table.len(), 2);
    let record = table.get(1).unwrap();
    assert_eq!(record.emp_id.as_deref(), Some("00-0000002"));
    assert_eq!(record.job_title.as_deref(), Some("Software Engineer"));
    assert_eq!(record.hire_date.as_deref(), Some("03-02-2006"));
}

#[test]
fn test_missing_column_is_a_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let header = HEADER.replace(",race", "");
    let row = FixtureRow::default().to_csv_line().replace(",White", "");
    let path = dir.path().join("no_race.csv");
    std::fs::write(&path, format!("{header}\n{row}\n")).unwrap();

    match load_table(&path, 1024) {
        Err(EmpMetricsError::SchemaMismatch { missing, .. }) => {
            assert_eq!(missing, vec!["race".to_string()]);
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "hr.xlsx", HEADER, &sample_rows());
    assert!(matches!(
        load_table(&path, 1024),
        Err(EmpMetricsError::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_load_parquet_with_typed_dates() {
    let dir = tempfile::tempdir().unwrap();
    let birth = NaiveDate::from_ymd_opt(1988, 3, 9).unwrap();
    let hire = NaiveDate::from_ymd_opt(2011, 10, 3).unwrap();
    let path = write_parquet(dir.path(), "hr.parquet", &[("00-0000042", birth, hire, None)]);

    let raw = load_table(&path, 1024).unwrap();
    assert_eq!(raw.len(), 1);
    let record = raw.get(0).unwrap();
    assert_eq!(record.birth_date.as_deref(), Some("03/09/1988"));
    assert_eq!(record.job_title.as_deref(), Some("Analyst"));
    assert!(record.term_date.is_none());

    let (table, report) = normalize(&raw, &test_config());
    assert_eq!(report.excluded_rows(), 0);
    assert_eq!(table.employees[0].birth_date, birth);
    assert_eq!(table.employees[0].hire_date, hire);
    assert_eq!(table.employees[0].age, 2023 - 1988);
}

#[test]
fn test_parquet_typed_term_dates_keep_terminated_rows() {
    let dir = tempfile::tempdir().unwrap();
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let rows = [
        ("00-0000001", date(1985, 6, 4), date(2004, 1, 15), None),
        ("00-0000002", date(1990, 11, 23), date(2002, 3, 2), Some(date(2008, 5, 1))),
        ("00-0000003", date(1978, 2, 14), date(2001, 9, 9), Some(date(2005, 3, 15))),
    ];
    let path = write_parquet(dir.path(), "hr.parquet", &rows);

    let raw = load_table(&path, 1024).unwrap();
    assert_eq!(raw.get(1).unwrap().term_date.as_deref(), Some("2008-05-01"));

    let report = run_pipeline(&path, &test_config()).unwrap();
    assert_eq!(report.normalization.excluded_rows(), 0);
    assert_eq!(report.metrics.total_employees, 3);

    let tenure = report.metrics.average_tenure.unwrap();
    assert_eq!(tenure.terminated, 2);
    // (2008 - 2002 + 2005 - 2001) / 2
    assert_eq!(tenure.average_tenure_years, Some(5));

    let turnover = report.metrics.highest_turnover_department.unwrap();
    assert_eq!(turnover.terminated, 2);
    assert_eq!(turnover.turnover_percent, 66.7);
}
