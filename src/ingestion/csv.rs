//! CSV ingestion with per-cell type inference.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Record, Value};

/// Ingest a CSV file (with a header row) into an in-memory [`DataSet`].
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
///
/// Rules:
///
/// - The first record is the header row; headers must be unique.
/// - Short rows read as null for the missing trailing cells.
/// - Each cell is typed by [`infer_value`].
pub fn ingest_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if let Some(dup) = headers.iter().enumerate().find_map(|(i, h)| headers[..i].contains(h).then_some(h)) {
        return Err(IngestionError::SchemaMismatch {
            message: format!("duplicate column '{dup}' in csv header"),
        });
    }

    let mut records: Vec<Record> = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let record = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).map_or(Value::Null, infer_value)))
            .collect();
        records.push(record);
    }

    let mut ds = DataSet::from_records(records);
    if ds.schema.fields.is_empty() {
        // Header-only files still describe their columns.
        ds.schema = crate::types::Schema::new(
            headers.into_iter().map(|h| crate::types::Field::new(h, None)).collect(),
        );
    }
    Ok(ds)
}

/// Type a raw text cell.
///
/// Blank is null; integers and finite floats are numbers (except zero-padded codes such as
/// `00123`, which stay text); `true`/`false` in any case are booleans; anything else is text.
pub fn infer_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    let digits = trimmed.trim_start_matches(['-', '+']);
    let zero_padded = digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.");
    if !zero_padded {
        if let Ok(v) = trimmed.parse::<i64>() {
            return Value::Int64(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            if v.is_finite() {
                return Value::Float64(v);
            }
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Utf8(trimmed.to_owned()),
    }
}
