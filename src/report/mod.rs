//! Rendering of pipeline results
//!
//! A finished run is written as one JSON document, as one CSV file per
//! metric, or as a plain-text summary.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use arrow::csv::Writer as CsvWriter;
use arrow::record_batch::RecordBatch;
use arrow_schema::FieldRef;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::aggregate::{CountRow, MetricsReport, TenureRow, TurnoverRow};
use crate::error::Result;
use crate::normalize::NormalizationReport;
use crate::validate::ValidationReport;

/// Everything a completed run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Name of the loaded source
    pub source: String,
    /// Reference time the run used for "now"
    pub as_of: NaiveDateTime,
    pub normalization: NormalizationReport,
    pub validation: ValidationReport,
    pub metrics: MetricsReport,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Text,
}

/// Write the report as pretty-printed JSON
pub fn write_json<W: Write>(report: &PipelineReport, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Write one CSV file per metric into `dir`, creating it when needed.
///
/// Returns the paths of the written files in metric order.
pub fn write_csv_dir(metrics: &MetricsReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let batches = [
        ("01_gender_breakdown", rows_to_batch(&metrics.gender_breakdown)?),
        ("02_race_breakdown", rows_to_batch(&metrics.race_breakdown)?),
        ("03_age_distribution", rows_to_batch(&metrics.age_distribution)?),
        ("04_location_breakdown", rows_to_batch(&metrics.location_breakdown)?),
        ("05_average_tenure", rows_to_batch(metrics.average_tenure.as_slice())?),
        ("06_gender_by_department", rows_to_batch(&metrics.gender_by_department)?),
        ("07_top_job_titles", rows_to_batch(&metrics.top_job_titles)?),
        (
            "08_highest_turnover_department",
            rows_to_batch(metrics.highest_turnover_department.as_slice())?,
        ),
        ("09_turnover_by_job_title", rows_to_batch(&metrics.turnover_by_job_title)?),
        ("10_turnover_by_hire_year", rows_to_batch(&metrics.turnover_by_hire_year)?),
        ("11_distribution_by_state", rows_to_batch(&metrics.distribution_by_state)?),
        ("12_headcount_change_by_year", rows_to_batch(&metrics.headcount_change_by_year)?),
        ("13_tenure_by_department", rows_to_batch(&metrics.tenure_by_department)?),
        ("14_location_by_city", rows_to_batch(&metrics.location_by_city)?),
    ];

    let mut written = Vec::with_capacity(batches.len());
    for (name, batch) in &batches {
        let path = dir.join(format!("{name}.csv"));
        let mut writer = CsvWriter::new(File::create(&path)?);
        writer.write(batch)?;
        log::debug!("Wrote {} rows to {}", batch.num_rows(), path.display());
        written.push(path);
    }
    Ok(written)
}

/// Convert metric rows into a record batch with a schema traced from the row type
pub fn rows_to_batch<'de, T>(rows: &[T]) -> Result<RecordBatch>
where
    T: Serialize + Deserialize<'de>,
{
    let fields = Vec::<FieldRef>::from_type::<T>(TracingOptions::default())?;
    Ok(serde_arrow::to_record_batch(&fields, &rows)?)
}

/// Render a human-readable summary of the run
#[must_use]
pub fn render_text(report: &PipelineReport) -> String {
    let norm = &report.normalization;
    let metrics = &report.metrics;

    let mut summary = String::new();
    summary.push_str("Workforce Summary:\n");
    summary.push_str(&format!("  Source: {}\n", report.source));
    summary.push_str(&format!("  As of: {}\n", report.as_of));
    summary.push_str(&format!("  Rows loaded: {}\n", norm.input_rows));
    summary.push_str(&format!(
        "  Rows excluded: {} ({} unparseable, {} future-dated, {} terminated before hire)\n",
        norm.excluded_rows(),
        norm.unparseable_dates,
        norm.future_dates,
        norm.term_before_hire
    ));
    summary.push_str(&format!("  Employees analysed: {}\n", metrics.total_employees));
    if norm.under_age > 0 {
        summary.push_str(&format!("  Under-age records: {}\n", norm.under_age));
    }
    if !report.validation.duplicate_ids().is_empty() {
        summary.push_str(&format!(
            "  Duplicate ids kept once: {}\n",
            report.validation.duplicate_ids().join(", ")
        ));
    }

    push_counts(&mut summary, "Gender", &metrics.gender_breakdown);
    push_counts(&mut summary, "Race", &metrics.race_breakdown);
    push_counts(&mut summary, "Age", &metrics.age_distribution);
    push_counts(&mut summary, "Location", &metrics.location_breakdown);

    summary.push_str("\nAverage Tenure of Terminated Employees:\n");
    match &metrics.average_tenure {
        Some(TenureRow {
            terminated,
            average_tenure_years: Some(years),
            ..
        }) => summary.push_str(&format!("  {years} years over {terminated} employees\n")),
        _ => summary.push_str("  no terminated employees\n"),
    }

    summary.push_str("\nGender by Department:\n");
    for row in &metrics.gender_by_department {
        summary.push_str(&format!("  {} / {}: {}\n", row.department, row.gender, row.count));
    }

    push_counts(&mut summary, "Top Job Titles", &metrics.top_job_titles);

    summary.push_str("\nHighest Turnover Department:\n");
    match &metrics.highest_turnover_department {
        Some(row) => push_turnover_row(&mut summary, row),
        None => summary.push_str("  none\n"),
    }
    push_turnover(&mut summary, "Turnover by Job Title", &metrics.turnover_by_job_title);
    push_turnover(&mut summary, "Turnover by Hire Year", &metrics.turnover_by_hire_year);
    push_counts(&mut summary, "State", &metrics.distribution_by_state);

    summary.push_str("\nHeadcount Change by Year:\n");
    for row in &metrics.headcount_change_by_year {
        summary.push_str(&format!(
            "  {}: +{} / -{} (net {}, {:.2}%)\n",
            row.year, row.hires, row.terminations, row.net_change, row.net_change_percent
        ));
    }

    summary.push_str("\nTenure by Department:\n");
    for row in &metrics.tenure_by_department {
        if let Some(years) = row.average_tenure_years {
            summary.push_str(&format!(
                "  {}: {} years ({} terminated)\n",
                row.group, years, row.terminated
            ));
        }
    }

    push_counts(&mut summary, "City", &metrics.location_by_city);
    summary
}

fn push_counts(summary: &mut String, title: &str, rows: &[CountRow]) {
    summary.push_str(&format!("\n{title}:\n"));
    for row in rows {
        summary.push_str(&format!("  {}: {}\n", row.group, row.count));
    }
}

fn push_turnover(summary: &mut String, title: &str, rows: &[TurnoverRow]) {
    summary.push_str(&format!("\n{title}:\n"));
    for row in rows {
        push_turnover_row(summary, row);
    }
}

fn push_turnover_row(summary: &mut String, row: &TurnoverRow) {
    summary.push_str(&format!(
        "  {}: {:.1}% ({} of {})\n",
        row.group, row.turnover_percent, row.terminated, row.total
    ));
}
