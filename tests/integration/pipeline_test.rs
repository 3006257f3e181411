use emp_metrics::{
    DuplicatePolicy, EmpMetricsError, Pipeline, load_table, normalize, run_pipeline,
};

use crate::utils::{FixtureRow, HEADER, sample_rows, test_config, write_csv};

#[test]
fn test_end_to_end_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "hr.csv", HEADER, &sample_rows());

    let report = run_pipeline(&path, &test_config()).unwrap();
    let metrics = &report.metrics;
    assert_eq!(metrics.total_employees, 5);

    let genders: Vec<(&str, u64)> = metrics
        .gender_breakdown
        .iter()
        .map(|r| (r.group.as_str(), r.count))
        .collect();
    assert_eq!(genders, vec![("Female", 2), ("Male", 2), ("Non-Conforming", 1)]);
    assert_eq!(
        metrics.gender_by_department.iter().map(|r| r.count).sum::<u64>(),
        5
    );

    let tenure = metrics.average_tenure.as_ref().unwrap();
    assert_eq!(tenure.terminated, 2);
    assert_eq!(tenure.average_tenure_years, Some(5));

    let top = metrics.highest_turnover_department.as_ref().unwrap();
    assert_eq!(top.group, "Engineering");
    assert_eq!(top.turnover_percent, 50.0);

    let titles: Vec<&str> = metrics.top_job_titles.iter().map(|r| r.group.as_str()).collect();
    assert_eq!(titles, vec!["Account Executive", "Software Engineer", "Sales Manager"]);

    assert_eq!(metrics.distribution_by_state[0].group, "Ohio");
    assert_eq!(metrics.distribution_by_state[0].count, 4);
    assert_eq!(metrics.location_breakdown[0].group, "Headquarters");
    assert!(
        metrics
            .turnover_by_job_title
            .iter()
            .all(|r| (0.0..=100.0).contains(&r.turnover_percent))
    );
}

#[test]
fn test_sequential_and_parallel_runs_agree() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "hr.csv", HEADER, &sample_rows());

    let sequential = run_pipeline(&path, &test_config().with_parallel(false)).unwrap();
    let parallel = run_pipeline(&path, &test_config().with_threads(Some(4))).unwrap();
    assert_eq!(sequential.metrics, parallel.metrics);
}

#[test]
fn test_unparseable_birth_date_excludes_the_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample_rows();
    rows[2].birth_date = "13/45/99";
    let path = write_csv(dir.path(), "hr.csv", HEADER, &rows);

    let report = run_pipeline(&path, &test_config()).unwrap();
    assert_eq!(report.normalization.input_rows, 5);
    assert_eq!(report.normalization.unparseable_dates, 1);
    assert_eq!(report.normalization.excluded[0].emp_id, "00-0000003");
    assert_eq!(report.metrics.total_employees, 4);
}

#[test]
fn test_future_and_inverted_dates_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample_rows();
    rows[0].term_date = "2030-01-01 00:00:00 UTC";
    rows[2].term_date = "2009-01-01 00:00:00 UTC";
    let path = write_csv(dir.path(), "hr.csv", HEADER, &rows);

    let report = run_pipeline(&path, &test_config()).unwrap();
    assert_eq!(report.normalization.future_dates, 1);
    assert_eq!(report.normalization.term_before_hire, 1);
    assert_eq!(report.metrics.total_employees, 3);
}

#[test]
fn test_average_tenure_over_single_termination() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        FixtureRow {
            emp_id: "a",
            ..FixtureRow::default()
        },
        FixtureRow {
            emp_id: "b",
            ..FixtureRow::default()
        },
        FixtureRow {
            emp_id: "c",
            term_date: "2010-05-01",
            ..FixtureRow::default()
        },
    ];
    let path = write_csv(dir.path(), "hr.csv", HEADER, &rows);

    let report = run_pipeline(&path, &test_config()).unwrap();
    let tenure = report.metrics.average_tenure.unwrap();
    assert_eq!(tenure.terminated, 1);
    assert_eq!(tenure.average_tenure_years, Some(6));
}

#[test]
fn test_duplicate_ids_follow_the_policy() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample_rows();
    rows[4].emp_id = "00-0000001";
    let path = write_csv(dir.path(), "hr.csv", HEADER, &rows);

    match run_pipeline(&path, &test_config()) {
        Err(EmpMetricsError::DuplicateKey { ids }) => {
            assert_eq!(ids, vec!["00-0000001".to_string()]);
        }
        other => panic!("expected duplicate key error, got {other:?}"),
    }

    let config = test_config().with_duplicate_policy(DuplicatePolicy::KeepFirst);
    let report = run_pipeline(&path, &config).unwrap();
    assert_eq!(report.metrics.total_employees, 4);
    assert_eq!(report.validation.duplicate_ids(), vec!["00-0000001"]);
    // The first occurrence is the one kept
    assert!(
        report
            .metrics
            .gender_breakdown
            .iter()
            .all(|r| r.group != "Non-Conforming")
    );
}

#[test]
fn test_missing_gender_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample_rows();
    rows[3].gender = "";
    let path = write_csv(dir.path(), "hr.csv", HEADER, &rows);

    match run_pipeline(&path, &test_config()) {
        Err(EmpMetricsError::MissingField { row, field, .. }) => {
            assert_eq!(row, 3);
            assert_eq!(field, "gender");
        }
        other => panic!("expected missing field error, got {other:?}"),
    }
}

#[test]
fn test_check_reports_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample_rows();
    rows[1].emp_id = "00-0000001";
    rows[2].birth_date = "not a date";
    let path = write_csv(dir.path(), "hr.csv", HEADER, &rows);

    let report = Pipeline::new(test_config()).check(&path).unwrap();
    assert_eq!(report.normalization.unparseable_dates, 1);
    assert_eq!(report.validation.duplicate_ids(), vec!["00-0000001"]);
    assert!(!report.validation.is_clean());
    assert!(report.has_fatal_violations());

    let pipeline =
        Pipeline::new(test_config().with_duplicate_policy(DuplicatePolicy::KeepFirst));
    assert_eq!(pipeline.config().duplicate_policy, DuplicatePolicy::KeepFirst);
    let report = pipeline.check(&path).unwrap();
    assert_eq!(report.duplicate_policy, DuplicatePolicy::KeepFirst);
    assert!(!report.has_fatal_violations());
}

#[test]
fn test_check_flags_missing_fields_under_any_policy() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = sample_rows();
    rows[0].race = "";
    let path = write_csv(dir.path(), "hr.csv", HEADER, &rows);

    let config = test_config().with_duplicate_policy(DuplicatePolicy::KeepFirst);
    let report = Pipeline::new(config).check(&path).unwrap();
    assert!(report.has_fatal_violations());
}

#[test]
fn test_ages_follow_reference_year() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "hr.csv", HEADER, &sample_rows());

    let raw = load_table(&path, 1024).unwrap();
    let (mut table, _) = normalize(&raw, &test_config());
    let ages: Vec<i32> = table.employees.iter().map(|e| e.age).collect();
    assert_eq!(ages, vec![38, 33, 38, 45, 38]);

    table.refresh_ages();
    let again: Vec<i32> = table.employees.iter().map(|e| e.age).collect();
    assert_eq!(ages, again);
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "hr.csv", HEADER, &sample_rows());

    let config = test_config().with_threads(Some(0));
    assert!(matches!(
        run_pipeline(&path, &config),
        Err(EmpMetricsError::ConfigError(_))
    ));
}
