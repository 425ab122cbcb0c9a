//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested objects are flattened into dot-path columns (e.g. `user.name`). Arrays are kept as
//! their JSON text.

use std::fs;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Record, Value};

/// Ingest a JSON file into an in-memory `DataSet`.
pub fn ingest_json_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text)
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
///
/// The schema is the union of (flattened) keys in first-seen order; keys within one object come
/// in `serde_json`'s map order (sorted).
pub fn ingest_json_from_str(input: &str) -> IngestionResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => ingest_json_values(&items),
            serde_json::Value::Object(_) => ingest_json_values(std::slice::from_ref(&v)),
            _ => Err(IngestionError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                IngestionError::SchemaMismatch {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            values.push(v);
        }
        ingest_json_values(&values)
    }
}

fn ingest_json_values(values: &[serde_json::Value]) -> IngestionResult<DataSet> {
    let mut records: Vec<Record> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let obj = v.as_object().ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("row {} is not a json object", idx0 + 1),
        })?;
        let mut record = Record::with_capacity(obj.len());
        flatten_into(&mut record, None, obj);
        records.push(record);
    }

    Ok(DataSet::from_records(records))
}

fn flatten_into(record: &mut Record, prefix: Option<&str>, obj: &serde_json::Map<String, serde_json::Value>) {
    for (key, value) in obj {
        let name = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            serde_json::Value::Object(inner) if !inner.is_empty() => flatten_into(record, Some(&name), inner),
            other => {
                record.insert(name, Value::from_json(other));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_objects_with_varying_keys() {
        let ds = ingest_json_from_str(r#"[{"Region":"West","Sales":10},{"Region":"East","Profit":2.5}]"#).unwrap();
        assert_eq!(ds.column_names(), vec!["Region", "Sales", "Profit"]);
        assert_eq!(ds.rows[0][2], Value::Null);
        assert_eq!(ds.rows[1][2], Value::Float64(2.5));
    }

    #[test]
    fn ndjson_and_nested_paths() {
        let input = "{\"id\":1,\"user\":{\"name\":\"Ada\"}}\n\n{\"id\":2,\"user\":{\"name\":\"Lin\"},\"tags\":[1,2]}\n";
        let ds = ingest_json_from_str(input).unwrap();
        assert_eq!(ds.column_names(), vec!["id", "user.name", "tags"]);
        assert_eq!(ds.rows[1][1], Value::from("Lin"));
        assert_eq!(ds.rows[1][2], Value::from("[1,2]"));
    }

    #[test]
    fn single_object_is_one_row() {
        let ds = ingest_json_from_str(r#"{"a":true}"#).unwrap();
        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.rows[0][0], Value::Bool(true));
    }

    #[test]
    fn rejects_scalars_and_bad_lines() {
        assert!(matches!(ingest_json_from_str("42"), Err(IngestionError::SchemaMismatch { .. })));
        assert!(matches!(ingest_json_from_str("   "), Err(IngestionError::SchemaMismatch { .. })));
        let err = ingest_json_from_str("{\"a\":1}\n{oops}\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(matches!(ingest_json_from_str("[1,2]"), Err(IngestionError::SchemaMismatch { .. })));
    }
}
