//! Row ordering.

use std::cmp::Ordering;

use crate::result::{AnalysisResult, SortedResult};
use crate::types::{DataSet, Value};

/// Compare two cells: numerically when both parse as numbers, else by their text.
///
/// Nulls compare greater than everything, so they land last in ascending order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// A copy of `dataset` with rows stably ordered by `column`.
///
/// Nulls stay last in both directions.
pub fn sort_rows(dataset: &DataSet, column: &str, ascending: bool) -> DataSet {
    let idx = dataset.schema.index_of(column);
    let mut rows = dataset.rows.clone();
    rows.sort_by(|a, b| {
        let (x, y) = (DataSet::cell(a, idx), DataSet::cell(b, idx));
        match (x.is_null(), y.is_null(), ascending) {
            (false, false, false) => compare_values(y, x),
            _ => compare_values(x, y),
        }
    });
    DataSet::new(dataset.schema.clone(), rows)
}

/// Sort and return the first `limit` rows, ranked.
pub fn sort(dataset: &DataSet, column: &str, ascending: bool, limit: usize) -> AnalysisResult {
    if dataset.schema.index_of(column).is_none() {
        tracing::warn!(column, "sort column not present in dataset; keeping input order");
    }
    let sorted = sort_rows(dataset, column, ascending);
    AnalysisResult::Sorted(SortedResult {
        column: column.to_string(),
        ascending,
        total: sorted.row_count(),
        data: sorted.ranked_records(limit),
    })
}
