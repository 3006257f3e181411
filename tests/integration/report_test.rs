use std::fs::{self, File};
use std::io::BufWriter;

use emp_metrics::{render_text, run_pipeline, write_csv_dir, write_json};

use crate::utils::{HEADER, sample_rows, test_config, write_csv};

#[test]
fn test_json_report_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "hr.csv", HEADER, &sample_rows());
    let report = run_pipeline(&input, &test_config()).unwrap();

    let output = dir.path().join("metrics.json");
    write_json(&report, BufWriter::new(File::create(&output).unwrap())).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["metrics"]["total_employees"], 5);
    assert_eq!(value["metrics"]["average_tenure"]["average_tenure_years"], 5);
    assert_eq!(value["normalization"]["kept_rows"], 5);
    assert!(value["validation"]["violations"].as_array().unwrap().is_empty());
}

#[test]
fn test_csv_directory_has_one_file_per_metric() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "hr.csv", HEADER, &sample_rows());
    let report = run_pipeline(&input, &test_config()).unwrap();

    let out = dir.path().join("metrics");
    let written = write_csv_dir(&report.metrics, &out).unwrap();
    assert_eq!(written.len(), 14);
    assert!(written.iter().all(|p| p.exists()));

    let turnover = fs::read_to_string(out.join("08_highest_turnover_department.csv")).unwrap();
    let lines: Vec<&str> = turnover.lines().collect();
    assert_eq!(lines[0], "group,total,terminated,turnover_percent");
    assert!(lines[1].starts_with("Engineering,2,1,50"));

    let states = fs::read_to_string(out.join("11_distribution_by_state.csv")).unwrap();
    assert_eq!(states.lines().count(), 3);
}

#[test]
fn test_text_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "hr.csv", HEADER, &sample_rows());
    let report = run_pipeline(&input, &test_config()).unwrap();

    let text = render_text(&report);
    assert!(text.contains("Employees analysed: 5"));
    assert!(text.contains("Engineering: 50.0% (1 of 2)"));
    assert!(text.contains("Ohio: 4"));
}
