//! Employee table loading
//!
//! Reads CSV or Parquet sources into record batches whose columns are all
//! text, maps the source headers onto the canonical employee columns and
//! converts the rows into [`RawRecord`]s.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, ArrayRef, Date32Array, StringArray};
use arrow::compute::cast;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{EmpMetricsError, Result};
use crate::models::RawRecord;
use crate::schema::{EMPLOYEE_COLUMNS, TERM_DATE, employee_schema, resolve_columns};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Typed birth and hire dates are rendered in the export's own layout
const TYPED_DATE_FORMAT: &str = "%m/%d/%Y";
/// Typed termination dates are rendered as ISO dates
const TYPED_TERM_DATE_FORMAT: &str = "%Y-%m-%d";

/// The loaded source: raw records indexed by their source row position
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Name of the source, used in diagnostics
    pub source: String,
    /// Rows in source order; a record's index is its row index
    pub records: Vec<RawRecord>,
}

impl RawTable {
    /// Number of loaded rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no rows were loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at the given source row index
    #[must_use]
    pub fn get(&self, row_index: usize) -> Option<&RawRecord> {
        self.records.get(row_index)
    }

    /// Iterate over `(row_index, record)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RawRecord)> {
        self.records.iter().enumerate()
    }
}

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Parquet,
}

impl SourceFormat {
    /// Detect the format from the file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// Load an employee table from a CSV or Parquet file
pub fn load_table(path: &Path, batch_size: usize) -> Result<RawTable> {
    let format = SourceFormat::from_path(path).ok_or_else(|| EmpMetricsError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    log_operation_start("Loading employee table from", path);
    let start = Instant::now();

    let (schema, batches) = match format {
        SourceFormat::Csv => read_csv(path, batch_size)?,
        SourceFormat::Parquet => read_parquet(path)?,
    };
    let table = load_batches(&path.display().to_string(), &schema, &batches)?;

    log_operation_complete("loaded", path, table.len(), Some(start.elapsed()));
    Ok(table)
}

/// Read a CSV file with a header row, every column as text
pub fn read_csv(path: &Path, batch_size: usize) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let mut file = File::open(path)?;

    // Only the header names matter; every column is re-declared as text
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(1))?;
    file.rewind()?;

    let text_fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(text_fields));

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_batch_size(batch_size)
        .build(BufReader::new(file))?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

/// Read a Parquet file as-is; columns are converted to text later
pub fn read_parquet(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

/// Convert in-memory record batches into a [`RawTable`].
///
/// Fails with [`EmpMetricsError::SchemaMismatch`] when any canonical column
/// cannot be found among the schema's fields (aliases included).
pub fn load_batches(source: &str, schema: &Schema, batches: &[RecordBatch]) -> Result<RawTable> {
    let positions = resolve_columns(schema.fields().iter().map(|f| f.name().as_str())).map_err(
        |missing| EmpMetricsError::SchemaMismatch {
            source_name: source.to_string(),
            missing,
        },
    )?;

    let mut records = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    for batch in batches {
        let canonical = to_canonical_batch(batch, &positions)?;
        let rows: Vec<RawRecord> = serde_arrow::from_record_batch(&canonical)?;
        records.extend(rows);
    }

    Ok(RawTable {
        source: source.to_string(),
        records,
    })
}

/// Project the canonical columns in schema order and turn each into text
fn to_canonical_batch(batch: &RecordBatch, positions: &[usize]) -> Result<RecordBatch> {
    let columns = positions
        .iter()
        .zip(EMPLOYEE_COLUMNS)
        .map(|(&idx, canonical)| column_as_text(batch.column(idx), canonical))
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(employee_schema(), columns)?)
}

/// Render a column as text in the layout its canonical column is parsed with.
///
/// Typed dates become `mm/dd/yyyy` for birth and hire dates and `yyyy-mm-dd`
/// for termination dates. Termination timestamps keep their time of day.
fn column_as_text(column: &ArrayRef, canonical: &str) -> Result<ArrayRef> {
    let is_term = canonical == TERM_DATE;
    let date_format = if is_term {
        TYPED_TERM_DATE_FORMAT
    } else {
        TYPED_DATE_FORMAT
    };

    match column.data_type() {
        DataType::Utf8 => Ok(Arc::clone(column)),
        DataType::Date32 => format_dates(column, date_format),
        DataType::Date64 | DataType::Timestamp(..) if !is_term => {
            let dates = cast(column, &DataType::Date32)?;
            format_dates(&dates, date_format)
        }
        _ => Ok(cast(column, &DataType::Utf8)?),
    }
}

fn format_dates(column: &ArrayRef, date_format: &str) -> Result<ArrayRef> {
    let dates = column
        .as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| {
            EmpMetricsError::ArrowError(arrow::error::ArrowError::CastError(
                "Date32 column could not be downcast".to_string(),
            ))
        })?;
    let text: StringArray = (0..dates.len())
        .map(|i| {
            dates
                .value_as_date(i)
                .filter(|_| dates.is_valid(i))
                .map(|d| d.format(date_format).to_string())
        })
        .collect();
    Ok(Arc::new(text))
}
