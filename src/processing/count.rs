//! Scalar counts.

use std::collections::HashSet;

use crate::result::{AnalysisResult, CountMetric, CountResult};
use crate::types::{DataSet, Record, Value};

/// Number of distinct truthy values of `column` (see [`Value::is_truthy`]).
///
/// Values are compared by their display form, so `Int64(7)` and `Utf8("7")` are the same id.
pub fn distinct_count(dataset: &DataSet, column: &str) -> usize {
    dataset
        .column_values(column)
        .filter(|v| v.is_truthy())
        .map(Value::to_string)
        .collect::<HashSet<_>>()
        .len()
}

/// Everything needed to build a [`CountResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct CountSummary {
    pub metric: CountMetric,
    /// Column counted distinctly, if any.
    pub column: Option<String>,
    /// Row label, e.g. `Total Orders`.
    pub label: String,
    pub value: usize,
    /// What `value` is a share of; the summary row carries `value / population` as a whole
    /// percentage.
    pub population: usize,
    /// Extra `total_records` field for the summary row.
    pub total_records: Option<usize>,
    pub filter: Option<String>,
}

impl CountSummary {
    pub fn new(metric: CountMetric, label: impl Into<String>, value: usize, population: usize) -> Self {
        Self {
            metric,
            column: None,
            label: label.into(),
            value,
            population,
            total_records: None,
            filter: None,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_total_records(mut self, total: usize) -> Self {
        self.total_records = Some(total);
        self
    }

    /// Whole-number percentage of `value` in `population` (0 for an empty population).
    pub fn percentage(&self) -> i64 {
        if self.population == 0 {
            return 0;
        }
        (self.value as f64 / self.population as f64 * 100.0).round() as i64
    }

    pub fn into_result(self) -> AnalysisResult {
        let mut row = Record::new();
        row.insert("metric".to_string(), Value::from(self.label.as_str()));
        row.insert("value".to_string(), Value::Int64(self.value as i64));
        if let Some(total) = self.total_records {
            row.insert("total_records".to_string(), Value::Int64(total as i64));
        }
        row.insert("percentage".to_string(), Value::Int64(self.percentage()));

        AnalysisResult::Count(CountResult {
            metric: self.metric,
            column: self.column,
            value: self.value,
            filter: self.filter,
            data: vec![row],
        })
    }
}
