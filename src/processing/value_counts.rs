//! Distinct-value frequencies.

use indexmap::IndexMap;

use crate::result::{AnalysisResult, ValueCountsResult};
use crate::types::{DataSet, Record, Value, round_to};

/// Count occurrences of each distinct non-null value of `column`.
///
/// Rows are `{<column>: value, count, percentage}` sorted by `count` descending (ties keep
/// first-seen order). `percentage` is relative to the number of non-null values and rounded to
/// one decimal.
pub fn value_counts(dataset: &DataSet, column: &str) -> AnalysisResult {
    let mut counts: IndexMap<String, (Value, usize)> = IndexMap::new();
    for value in dataset.column_values(column) {
        if value.is_null() {
            continue;
        }
        counts
            .entry(value.to_string())
            .or_insert_with(|| (value.clone(), 0))
            .1 += 1;
    }

    let total: usize = counts.values().map(|(_, n)| n).sum();
    let mut rows: Vec<(Value, usize)> = counts.into_values().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));

    let data = rows
        .into_iter()
        .map(|(value, count)| {
            let percentage = round_to(count as f64 / total as f64 * 100.0, 1);
            Record::from([
                (column.to_string(), value),
                ("count".to_string(), Value::Int64(count as i64)),
                ("percentage".to_string(), Value::Float64(percentage)),
            ])
        })
        .collect();

    AnalysisResult::ValueCounts(ValueCountsResult {
        column: column.to_string(),
        data,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modes(values: &[Option<&str>]) -> DataSet {
        DataSet::from_records(
            values
                .iter()
                .map(|v| {
                    Record::from([(
                        "Ship_Mode".to_string(),
                        v.map(Value::from).unwrap_or(Value::Null),
                    )])
                })
                .collect(),
        )
    }

    #[test]
    fn counts_and_percentages() {
        let result = value_counts(&modes(&[Some("Air"), Some("Air"), Some("Ground")]), "Ship_Mode");
        let AnalysisResult::ValueCounts(vc) = result else {
            panic!("expected value_counts");
        };
        assert_eq!(vc.total, 3);
        assert_eq!(vc.data[0]["Ship_Mode"], Value::from("Air"));
        assert_eq!(vc.data[0]["count"], Value::Int64(2));
        assert_eq!(vc.data[0]["percentage"], Value::Float64(66.7));
        assert_eq!(vc.data[1]["Ship_Mode"], Value::from("Ground"));
        assert_eq!(vc.data[1]["percentage"], Value::Float64(33.3));
    }

    #[test]
    fn nulls_are_excluded_from_total() {
        let result = value_counts(&modes(&[Some("Air"), None, Some("Rail"), None]), "Ship_Mode");
        let AnalysisResult::ValueCounts(vc) = result else {
            panic!("expected value_counts");
        };
        assert_eq!(vc.total, 2);
        assert_eq!(vc.data.len(), 2);
        assert_eq!(vc.data[0]["percentage"], Value::Float64(50.0));
    }

    #[test]
    fn missing_column_has_no_rows() {
        let result = value_counts(&modes(&[Some("Air")]), "Region");
        assert!(result.data().is_empty());
    }
}
