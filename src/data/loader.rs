use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{is_null_marker, ColumnNames, MetadataValue, Paper, RawTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("could not parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("input is missing required column '{column}'")]
    MissingColumn { column: String },
}

impl LoadError {
    fn parse(path: &Path, message: impl ToString) -> Self {
        LoadError::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a paper metadata table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`            – comma-delimited with a header row (default)
/// * `.tsv` / `.tab`   – tab-delimited with a header row
/// * `.json`           – `[{ "title": ..., "abstract": ..., ... }, ...]`
/// * `.parquet` / `.pq` – one row per paper, any column types
///
/// Rows are kept in file order. Cells that do not fit are null-filled, never
/// rejected; only structural damage to the file is an error.
pub fn load_file(path: &Path, columns: &ColumnNames) -> Result<RawTable, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, columns),
        "json" => load_json(path, columns),
        "tsv" | "tab" => load_delimited(path, b'\t', columns),
        _ => load_delimited(path, b',', columns),
    }?;

    log::info!(
        "Loaded {} papers with {} columns from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

/// Fail with `MissingColumn` for the first required column not in `names`.
fn check_required(names: &[String], columns: &ColumnNames) -> Result<(), LoadError> {
    for required in columns.required() {
        if !names.iter().any(|n| n == required) {
            return Err(LoadError::MissingColumn {
                column: required.to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

/// Header row with column names, one paper per record.
/// Empty cells and the usual null markers (`NA`, `N/A`, `NaN`, `null`, ...)
/// are missing. Core columns are kept as text; all other columns are
/// type-inferred.
/// Records shorter than the header are null-filled; extra trailing cells
/// are ignored.
fn load_delimited(path: &Path, delimiter: u8, columns: &ColumnNames) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| LoadError::parse(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::parse(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    check_required(&headers, columns)?;

    let mut papers = Vec::new();
    let mut short_rows = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| LoadError::parse(path, format!("row {row_no}: {e}")))?;

        if record.len() < headers.len() {
            short_rows += 1;
        }

        let cells = headers
            .iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let raw = record.get(col_idx).unwrap_or("");
                let value = if columns.is_core(name) {
                    if raw.trim().is_empty() || is_null_marker(raw) {
                        MetadataValue::Null
                    } else {
                        MetadataValue::String(raw.to_string())
                    }
                } else {
                    MetadataValue::infer(raw)
                };
                (name.clone(), value)
            })
            .collect();

        papers.push(Paper::from_cells(cells, columns));
    }

    if short_rows > 0 {
        log::warn!("{short_rows} rows had fewer cells than the header; missing cells set to null");
    }

    Ok(RawTable {
        papers,
        column_names: headers,
        columns: columns.clone(),
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema, one object per paper:
///
/// ```json
/// [
///   { "title": "...", "abstract": "...", "journal": "...",
///     "publish_time": "2020-03-01", "source_x": "PMC" },
///   ...
/// ]
/// ```
///
/// The column set is the union of all record keys; keys absent from a
/// record are null for that paper.
fn load_json(path: &Path, columns: &ColumnNames) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::parse(path, e))?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| LoadError::parse(path, e))?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::parse(path, "expected top-level JSON array"))?;

    let mut column_names: Vec<String> = Vec::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if !column_names.contains(key) {
                    column_names.push(key.clone());
                }
            }
        }
    }
    check_required(&column_names, columns)?;

    let mut papers = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::parse(path, format!("row {i} is not a JSON object")))?;

        let cells = column_names
            .iter()
            .map(|name| {
                let value = obj.get(name).map_or(MetadataValue::Null, json_to_metadata);
                (name.clone(), value)
            })
            .collect();
        papers.push(Paper::from_cells(cells, columns));
    }

    Ok(RawTable {
        papers,
        column_names,
        columns: columns.clone(),
    })
}

fn json_to_metadata(val: &JsonValue) -> MetadataValue {
    match val {
        JsonValue::String(s) if s.is_empty() => MetadataValue::Null,
        JsonValue::String(s) => MetadataValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetadataValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                MetadataValue::Float(f)
            } else {
                MetadataValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => MetadataValue::Bool(*b),
        JsonValue::Null => MetadataValue::Null,
        other => MetadataValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of paper metadata.
///
/// Any column types are accepted: strings, integers, floats, booleans and
/// dates map onto [`MetadataValue`]; anything else is rendered as text.
fn load_parquet(path: &Path, columns: &ColumnNames) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::parse(path, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| LoadError::parse(path, e))?;

    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    check_required(&column_names, columns)?;

    let reader = builder.build().map_err(|e| LoadError::parse(path, e))?;

    let mut papers = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| LoadError::parse(path, e))?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let cells = schema
                .fields()
                .iter()
                .enumerate()
                .map(|(col_idx, field)| {
                    let value = extract_metadata_value(batch.column(col_idx), row);
                    (field.name().clone(), value)
                })
                .collect::<BTreeMap<_, _>>();
            papers.push(Paper::from_cells(cells, columns));
        }
    }

    Ok(RawTable {
        papers,
        column_names,
        columns: columns.clone(),
    })
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_metadata_value(col: &Arc<dyn Array>, row: usize) -> MetadataValue {
    if col.is_null(row) {
        return MetadataValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => MetadataValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => MetadataValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => MetadataValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => MetadataValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => MetadataValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => MetadataValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => {
            MetadataValue::Float(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => MetadataValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => MetadataValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 => array_value_to_string(col, row)
            .map(MetadataValue::Date)
            .unwrap_or(MetadataValue::Null),
        _ => array_value_to_string(col, row)
            .map(MetadataValue::String)
            .unwrap_or(MetadataValue::Null),
    }
}
