use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{
    RawRow, COL_CO2, COL_CO2_PER_CAPITA, COL_COUNTRY, COL_GDP, COL_ISO_CODE, COL_POPULATION,
    COL_YEAR, REQUIRED_COLUMNS,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load raw rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with (at least) the columns in [`REQUIRED_COLUMNS`]
/// * `.parquet` – the same columns as flat primitive columns
/// * `.json`    – `[{ "country": "...", "year": 1990, ... }, ...]`
pub fn load_file(path: &Path) -> Result<Vec<RawRow>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            read_csv(file)
        }
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }?;

    log::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Cell parsing shared by the text formats
// ---------------------------------------------------------------------------

fn is_null_marker(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("na")
        || s.eq_ignore_ascii_case("nan")
        || s.eq_ignore_ascii_case("null")
}

fn parse_f64_cell(raw: &str, row: usize, column: &str) -> Result<Option<f64>, LoadError> {
    let s = raw.trim();
    if is_null_marker(s) {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| invalid(row, column, s, "number"))
}

/// Years may be written as `1990` or `1990.0` (pandas float columns).
fn parse_year_cell(raw: &str, row: usize) -> Result<Option<i32>, LoadError> {
    let s = raw.trim();
    if is_null_marker(s) {
        return Ok(None);
    }
    if let Ok(y) = s.parse::<i32>() {
        return Ok(Some(y));
    }
    match s.parse::<f64>() {
        Ok(f) => float_to_year(f)
            .map(Some)
            .ok_or_else(|| invalid(row, COL_YEAR, s, "year")),
        Err(_) => Err(invalid(row, COL_YEAR, s, "year")),
    }
}

fn float_to_year(f: f64) -> Option<i32> {
    if f.is_finite() && f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn invalid(row: usize, column: &str, value: &str, expected: &'static str) -> LoadError {
    LoadError::InvalidValue {
        row,
        column: column.to_string(),
        value: value.to_string(),
        expected,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Positions of the required columns in a header row.
struct ColumnIndex {
    country: usize,
    iso_code: usize,
    year: usize,
    co2: usize,
    co2_per_capita: usize,
    gdp: usize,
    population: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        Ok(ColumnIndex {
            country: find(COL_COUNTRY)?,
            iso_code: find(COL_ISO_CODE)?,
            year: find(COL_YEAR)?,
            co2: find(COL_CO2)?,
            co2_per_capita: find(COL_CO2_PER_CAPITA)?,
            gdp: find(COL_GDP)?,
            population: find(COL_POPULATION)?,
        })
    }
}

/// Parse CSV bytes (header row first) into raw rows, in input order.
///
/// Row numbers in errors are 0-based data rows (the header is not counted).
pub fn read_csv<R: Read>(input: R) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let idx = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |i: usize| record.get(i).unwrap_or("");

        rows.push(RawRow {
            entity_name: cell(idx.country).trim().to_string(),
            entity_code: cell(idx.iso_code).trim().to_string(),
            year: parse_year_cell(cell(idx.year), row_no)?,
            co2: parse_f64_cell(cell(idx.co2), row_no, COL_CO2)?,
            co2_per_capita: parse_f64_cell(cell(idx.co2_per_capita), row_no, COL_CO2_PER_CAPITA)?,
            gdp: parse_f64_cell(cell(idx.gdp), row_no, COL_GDP)?,
            population: parse_f64_cell(cell(idx.population), row_no, COL_POPULATION)?,
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "country": "France", "iso_code": "FRA", "year": 1990,
///     "co2": 390.1, "co2_per_capita": 6.9, "gdp": 1.4e12, "population": 56700000 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Parse a records-oriented JSON document into raw rows.
///
/// Every object must carry all of [`REQUIRED_COLUMNS`] (a `null` value is fine).
pub fn parse_json(text: &str) -> Result<Vec<RawRow>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or(LoadError::NotAnObject(i))?;
        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !obj.contains_key(**c)) {
            return Err(LoadError::MissingColumn(missing.to_string()))
                .with_context(|| format!("JSON row {i}"));
        }

        rows.push(RawRow {
            entity_name: json_string(obj.get(COL_COUNTRY)),
            entity_code: json_string(obj.get(COL_ISO_CODE)),
            year: json_year(obj.get(COL_YEAR), i)?,
            co2: json_f64(obj.get(COL_CO2), i, COL_CO2)?,
            co2_per_capita: json_f64(obj.get(COL_CO2_PER_CAPITA), i, COL_CO2_PER_CAPITA)?,
            gdp: json_f64(obj.get(COL_GDP), i, COL_GDP)?,
            population: json_f64(obj.get(COL_POPULATION), i, COL_POPULATION)?,
        });
    }

    Ok(rows)
}

fn json_string(val: Option<&JsonValue>) -> String {
    match val {
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn json_f64(val: Option<&JsonValue>, row: usize, column: &str) -> Result<Option<f64>, LoadError> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(JsonValue::String(s)) => parse_f64_cell(s, row, column),
        Some(other) => Err(invalid(row, column, &other.to_string(), "number")),
    }
}

fn json_year(val: Option<&JsonValue>, row: usize) -> Result<Option<i32>, LoadError> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .and_then(float_to_year)
            .map(Some)
            .ok_or_else(|| invalid(row, COL_YEAR, &n.to_string(), "year")),
        Some(JsonValue::String(s)) => parse_year_cell(s, row),
        Some(other) => Err(invalid(row, COL_YEAR, &other.to_string(), "year")),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the dataset's columns.
///
/// Expected schema:
/// - `country`, `iso_code`: Utf8 / LargeUtf8
/// - `year`: Int32 / Int64 / Float64
/// - `co2`, `co2_per_capita`, `gdp`, `population`: Float64 / Float32 / Int64 / Int32
///
/// Nulls map to `None`; any other column is ignored.
fn load_parquet(path: &Path) -> Result<Vec<RawRow>> {
    read_parquet(path, PARQUET_BATCH_SIZE)
}

const PARQUET_BATCH_SIZE: usize = 1024;

/// Row numbers in errors count from the start of the file, across batches.
fn read_parquet(path: &Path, batch_size: usize) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder
        .with_batch_size(batch_size)
        .build()
        .context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let first_row = rows.len();

        let names = string_column(column(&batch, COL_COUNTRY)?, COL_COUNTRY)?;
        let codes = string_column(column(&batch, COL_ISO_CODE)?, COL_ISO_CODE)?;
        let years = year_column(column(&batch, COL_YEAR)?, first_row)?;
        let co2 = f64_column(column(&batch, COL_CO2)?, COL_CO2)?;
        let co2_per_capita =
            f64_column(column(&batch, COL_CO2_PER_CAPITA)?, COL_CO2_PER_CAPITA)?;
        let gdp = f64_column(column(&batch, COL_GDP)?, COL_GDP)?;
        let population = f64_column(column(&batch, COL_POPULATION)?, COL_POPULATION)?;

        for row in 0..batch.num_rows() {
            rows.push(RawRow {
                entity_name: names[row].clone(),
                entity_code: codes[row].clone(),
                year: years[row],
                co2: co2[row],
                co2_per_capita: co2_per_capita[row],
                gdp: gdp[row],
                population: population[row],
            });
        }
    }

    Ok(rows)
}

// -- Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, LoadError> {
    batch
        .schema()
        .index_of(name)
        .map(|i| batch.column(i))
        .map_err(|_| LoadError::MissingColumn(name.to_string()))
}

fn unsupported(column: &str, data_type: &DataType) -> LoadError {
    LoadError::UnsupportedColumnType {
        column: column.to_string(),
        data_type: format!("{data_type:?}"),
    }
}

/// Read a Utf8 / LargeUtf8 column; nulls become empty strings.
fn string_column(col: &ArrayRef, name: &str) -> Result<Vec<String>, LoadError> {
    let values: Vec<String> = match col.data_type() {
        DataType::Utf8 => col
            .as_string::<i32>()
            .iter()
            .map(|v| v.unwrap_or("").trim().to_string())
            .collect(),
        DataType::LargeUtf8 => col
            .as_string::<i64>()
            .iter()
            .map(|v| v.unwrap_or("").trim().to_string())
            .collect(),
        other => return Err(unsupported(name, other)),
    };
    Ok(values)
}

/// Read a numeric column as nullable `f64`.
fn f64_column(col: &ArrayRef, name: &str) -> Result<Vec<Option<f64>>, LoadError> {
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.iter().collect())
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.map(f64::from)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.iter().map(|v| v.map(|i| i as f64)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.iter().map(|v| v.map(f64::from)).collect())
    } else {
        Err(unsupported(name, col.data_type()))
    }
}

/// Read the year column; integral floats are accepted, anything else is an error.
///
/// `first_row` is the file row of the column's first element.
fn year_column(col: &ArrayRef, first_row: usize) -> Result<Vec<Option<i32>>, LoadError> {
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Int32Array>() {
        return Ok(arr.iter().collect());
    }
    if let Some(arr) = any.downcast_ref::<Int64Array>() {
        return arr
            .iter()
            .enumerate()
            .map(|(row, v)| match v {
                None => Ok(None),
                Some(y) => i32::try_from(y)
                    .map(Some)
                    .map_err(|_| invalid(first_row + row, COL_YEAR, &y.to_string(), "year")),
            })
            .collect();
    }
    if matches!(col.data_type(), DataType::Float64 | DataType::Float32) {
        let arr = f64_column(col, COL_YEAR)?;
        return arr
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v {
                None => Ok(None),
                Some(f) => float_to_year(f)
                    .map(Some)
                    .ok_or_else(|| invalid(first_row + row, COL_YEAR, &f.to_string(), "year")),
            })
            .collect();
    }
    Err(unsupported(COL_YEAR, col.data_type()))
}
