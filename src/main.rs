use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use emp_metrics::pipeline::{CHECK_STAGES, PIPELINE_STAGES};
use emp_metrics::utils::logging::{create_stage_progress_bar, finish_progress_bar};
use emp_metrics::{
    AgeBucketPolicy, DuplicatePolicy, OutputFormat, Pipeline, PipelineConfig, render_text,
    write_csv_dir, write_json,
};

#[derive(Parser)]
#[command(name = "emp-metrics")]
#[command(about = "Clean an employee export and compute workforce metrics", long_about = None)]
#[command(version)]
struct Cli {
    /// Hide the stage progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline and write the metrics
    Run {
        /// CSV or Parquet file to read
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,

        /// Output file for json, output directory for csv
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: RunOptions,
    },
    /// Load, normalize and validate without computing metrics
    Check {
        /// CSV or Parquet file to read
        input: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(Args)]
struct RunOptions {
    /// Reference date used as "today" (YYYY-MM-DD)
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<NaiveDate>,

    /// Two-digit years at or above this pivot fall in the 1900s
    #[arg(long)]
    pivot_year: Option<u32>,

    /// What to do with repeated employee ids
    #[arg(long, value_enum, default_value_t = DuplicatesArg::Reject)]
    duplicates: DuplicatesArg,

    /// How ages outside 20-59 are bucketed
    #[arg(long, value_enum, default_value_t = AgeBucketsArg::Source)]
    age_buckets: AgeBucketsArg,

    /// Compute metrics on a single thread
    #[arg(long)]
    sequential: bool,

    /// Size of the aggregation thread pool
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
    Text,
}

#[derive(Clone, Copy, ValueEnum)]
enum DuplicatesArg {
    Reject,
    KeepFirst,
}

#[derive(Clone, Copy, ValueEnum)]
enum AgeBucketsArg {
    Source,
    Explicit,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
            FormatArg::Text => Self::Text,
        }
    }
}

impl RunOptions {
    fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default()
            .with_duplicate_policy(match self.duplicates {
                DuplicatesArg::Reject => DuplicatePolicy::Reject,
                DuplicatesArg::KeepFirst => DuplicatePolicy::KeepFirst,
            })
            .with_age_bucket_policy(match self.age_buckets {
                AgeBucketsArg::Source => AgeBucketPolicy::SourceFallthrough,
                AgeBucketsArg::Explicit => AgeBucketPolicy::Explicit,
            })
            .with_parallel(!self.sequential)
            .with_threads(self.threads);
        if let Some(date) = self.as_of {
            config = config.with_as_of_date(date);
        }
        if let Some(pivot) = self.pivot_year {
            config = config.with_pivot_year(pivot);
        }
        config
    }
}

fn parse_as_of(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

fn main() -> ExitCode {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Run {
            input,
            format,
            output,
            options,
        } => run(&input, format.into(), output.as_deref(), &options, cli.quiet),
        Commands::Check { input, options } => check(&input, &options, cli.quiet),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    options: &RunOptions,
    quiet: bool,
) -> Result<ExitCode> {
    let mut pipeline = Pipeline::new(options.to_config());
    let progress = (!quiet).then(|| create_stage_progress_bar(PIPELINE_STAGES, Some("Loading")));
    if let Some(pb) = &progress {
        pipeline = pipeline.with_progress(pb.clone());
    }

    let result = pipeline.run(input);
    if let Some(pb) = &progress {
        finish_progress_bar(pb, Some(if result.is_ok() { "Done" } else { "Failed" }));
    }
    let report = result.with_context(|| format!("Pipeline failed for {}", input.display()))?;

    match format {
        OutputFormat::Json => match output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Cannot create {}", path.display()))?;
                write_json(&report, BufWriter::new(file))?;
                info!("Wrote metrics to {}", path.display());
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                write_json(&report, &mut handle)?;
                writeln!(handle)?;
            }
        },
        OutputFormat::Csv => {
            let dir = output.unwrap_or_else(|| Path::new("metrics"));
            let written = write_csv_dir(&report.metrics, dir)
                .with_context(|| format!("Cannot write metrics to {}", dir.display()))?;
            info!("Wrote {} metric files to {}", written.len(), dir.display());
        }
        OutputFormat::Text => {
            let text = render_text(&report);
            match output {
                Some(path) => std::fs::write(path, text)
                    .with_context(|| format!("Cannot write {}", path.display()))?,
                None => print!("{text}"),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn check(input: &Path, options: &RunOptions, quiet: bool) -> Result<ExitCode> {
    let mut pipeline = Pipeline::new(options.to_config());
    let progress = (!quiet).then(|| create_stage_progress_bar(CHECK_STAGES, Some("Loading")));
    if let Some(pb) = &progress {
        pipeline = pipeline.with_progress(pb.clone());
    }

    let result = pipeline.check(input);
    if let Some(pb) = &progress {
        finish_progress_bar(pb, Some("Checked"));
    }
    let report = result.with_context(|| format!("Check failed for {}", input.display()))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &report)?;
    writeln!(handle)?;

    if report.has_fatal_violations() {
        log::error!(
            "{} has violations that abort a run under duplicate policy '{}'",
            input.display(),
            pipeline.config().duplicate_policy
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
