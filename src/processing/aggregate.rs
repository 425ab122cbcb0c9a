//! Aggregation operations over a group of rows.

use serde::Serialize;

use crate::types::{DataSet, Value, round_to};

/// Pseudo-column meaning "count the rows themselves".
pub const RECORDS: &str = "records";

/// Output key always emitted by group-by with the partition size.
pub const RECORD_COUNT: &str = "RECORD_COUNT";

/// Built-in aggregation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggOp {
    /// Sum of numeric values; non-numeric cells contribute 0.
    Sum,
    /// Number of rows in the group.
    Count,
    /// Sum divided by the number of rows in the group.
    Mean,
}

impl AggOp {
    /// Parse a pandas-style operation name (`sum`, `count`, `size`, `mean`, `avg`, `average`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sum" | "total" => Some(AggOp::Sum),
            "count" | "size" => Some(AggOp::Count),
            "mean" | "avg" | "average" => Some(AggOp::Mean),
            _ => None,
        }
    }
}

/// A `(column, operation)` pair describing how to summarize a group of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub column: String,
    pub operation: AggOp,
}

impl Aggregation {
    pub fn new(column: impl Into<String>, operation: AggOp) -> Self {
        Self {
            column: column.into(),
            operation,
        }
    }

    /// `{column: "records", operation: count}`.
    pub fn record_count() -> Self {
        Self::new(RECORDS, AggOp::Count)
    }

    /// Key under which this aggregation appears in a group-by row.
    ///
    /// `sum` → `UPPERCASE(column)`, `mean` → `AVG_<COLUMN>`, `count` → `RECORD_COUNT` for
    /// `records`, else `<column>_COUNT`.
    pub fn output_key(&self) -> String {
        match self.operation {
            AggOp::Sum => self.column.to_uppercase(),
            AggOp::Mean => format!("AVG_{}", self.column.to_uppercase()),
            AggOp::Count if self.column == RECORDS => RECORD_COUNT.to_string(),
            AggOp::Count => format!("{}_COUNT", self.column),
        }
    }

    /// Apply this aggregation to one group of rows; `idx` is the column's schema index.
    pub fn apply(&self, rows: &[&[Value]], idx: Option<usize>) -> Value {
        match self.operation {
            AggOp::Count => Value::Int64(rows.len() as i64),
            AggOp::Sum => Value::Float64(round_to(sum(rows, idx), 2)),
            AggOp::Mean if rows.is_empty() => Value::Float64(0.0),
            AggOp::Mean => Value::Float64(round_to(sum(rows, idx) / rows.len() as f64, 2)),
        }
    }
}

fn sum(rows: &[&[Value]], idx: Option<usize>) -> f64 {
    rows.iter()
        .map(|row| DataSet::cell(row, idx).number_or_zero())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<Value>> {
        vec![
            vec![Value::Int64(10)],
            vec![Value::Utf8("2.25".into())],
            vec![Value::Null],
            vec![Value::Utf8("n/a".into())],
        ]
    }

    #[test]
    fn output_keys_follow_naming_rules() {
        assert_eq!(Aggregation::new("Sales", AggOp::Sum).output_key(), "SALES");
        assert_eq!(Aggregation::new("Discount", AggOp::Mean).output_key(), "AVG_DISCOUNT");
        assert_eq!(Aggregation::new("Order_ID", AggOp::Count).output_key(), "Order_ID_COUNT");
        assert_eq!(Aggregation::record_count().output_key(), RECORD_COUNT);
    }

    #[test]
    fn sum_treats_non_numeric_as_zero_and_rounds() {
        let data = rows();
        let refs: Vec<&[Value]> = data.iter().map(Vec::as_slice).collect();
        assert_eq!(
            Aggregation::new("x", AggOp::Sum).apply(&refs, Some(0)),
            Value::Float64(12.25)
        );
    }

    #[test]
    fn mean_divides_by_group_size() {
        let data = rows();
        let refs: Vec<&[Value]> = data.iter().map(Vec::as_slice).collect();
        // 12.25 / 4 = 3.0625
        assert_eq!(
            Aggregation::new("x", AggOp::Mean).apply(&refs, Some(0)),
            Value::Float64(3.06)
        );
        assert_eq!(Aggregation::new("x", AggOp::Mean).apply(&[], Some(0)), Value::Float64(0.0));
    }

    #[test]
    fn count_is_group_size() {
        let data = rows();
        let refs: Vec<&[Value]> = data.iter().map(Vec::as_slice).collect();
        assert_eq!(Aggregation::record_count().apply(&refs, None), Value::Int64(4));
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(AggOp::parse("SUM"), Some(AggOp::Sum));
        assert_eq!(AggOp::parse("avg"), Some(AggOp::Mean));
        assert_eq!(AggOp::parse("size"), Some(AggOp::Count));
        assert_eq!(AggOp::parse("median"), None);
    }
}
