//! Core data model types.
//!
//! Analysis runs over an in-memory [`DataSet`]: a [`Schema`] (ordered column names with an
//! inferred [`DataType`] hint) plus row-major [`Value`] storage. The schema is descriptive only;
//! rows may be shorter than the schema, and a missing cell reads as [`Value::Null`].
//!
//! Analysis output rows are [`Record`]s: ordered `column -> value` maps.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

/// A single named field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name (case-sensitive).
    pub name: String,
    /// Type of the first non-null value seen for this column, if any.
    pub data_type: Option<DataType>,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: Option<DataType>) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of fields describing the columns of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

const NULL: &Value = &Value::Null;

impl Value {
    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of this value.
    ///
    /// Strings are parsed with [`parse_number`]; booleans and nulls are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) if v.is_nan() => None,
            Value::Float64(v) => Some(*v),
            Value::Utf8(s) => parse_number(s),
            Value::Bool(_) | Value::Null => None,
        }
    }

    /// Numeric view of this value, with anything non-numeric contributing `0.0`.
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Truthiness used when collecting "present" values (e.g. distinct customer ids).
    ///
    /// Null, `false`, `0`, NaN and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int64(v) => *v != 0,
            Value::Float64(v) => *v != 0.0 && !v.is_nan(),
            Value::Utf8(s) => !s.is_empty(),
        }
    }

    /// Data type of this value, or `None` for null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Utf8(_) => Some(DataType::Utf8),
        }
    }

    /// Convert a JSON scalar into a [`Value`].
    ///
    /// Nested arrays/objects are kept as their JSON text.
    pub fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int64(i),
                None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Utf8(s.clone()),
            other => Value::Utf8(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) if v.fract() == 0.0 && v.is_finite() && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Parse the longest leading decimal number in `s` (after leading whitespace).
///
/// `"12.5kg"` parses as `12.5`; `"$12"` and `""` do not parse.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Round to `places` decimal places, half away from zero.
pub fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

/// An ordered `column -> value` row, as produced by analysis results.
pub type Record = IndexMap<String, Value>;

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Build a dataset from records whose keys may differ from row to row.
    ///
    /// The schema is the union of keys in first-seen order; keys absent from a record read as
    /// [`Value::Null`].
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut fields: Vec<Field> = Vec::new();
        for record in &records {
            for (name, value) in record {
                match fields.iter_mut().find(|f| &f.name == name) {
                    Some(field) => {
                        if field.data_type.is_none() {
                            field.data_type = value.data_type();
                        }
                    }
                    None => fields.push(Field::new(name.clone(), value.data_type())),
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                fields
                    .iter()
                    .map(|f| record.swap_remove(&f.name).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self {
            schema: Schema::new(fields),
            rows,
        }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema.field_names().map(str::to_string).collect()
    }

    /// Cell at `idx` of `row`, reading missing cells and unknown columns as null.
    pub fn cell<'a>(row: &'a [Value], idx: Option<usize>) -> &'a Value {
        idx.and_then(|i| row.get(i)).unwrap_or(NULL)
    }

    /// Iterate the values of `column` (nulls for an unknown column).
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let idx = self.schema.index_of(column);
        self.rows.iter().map(move |row| Self::cell(row, idx))
    }

    /// Convert one row into a [`Record`] keyed by schema field names.
    pub fn record(&self, row: &[Value]) -> Record {
        self.schema
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), Self::cell(row, Some(i)).clone()))
            .collect()
    }

    /// The first `n` rows as records, each prefixed with a 1-based `rank`.
    pub fn ranked_records(&self, n: usize) -> Vec<Record> {
        self.rows
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, row)| {
                let mut out = Record::new();
                out.insert("rank".to_string(), Value::Int64(i as i64 + 1));
                out.extend(self.record(row));
                out
            })
            .collect()
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}
