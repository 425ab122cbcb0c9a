//! The tagged analysis result consumed by [`crate::presentation`].
//!
//! Every variant's `data` is fully materialized and already capped (see
//! [`crate::config::AnalysisLimits`]).

use serde::Serialize;

use crate::error::AnalysisError;
use crate::processing::Aggregation;
use crate::types::Record;

/// Discriminant of an [`AnalysisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    #[serde(rename = "groupby")]
    GroupBy,
    ValueCounts,
    Count,
    Filtered,
    Sorted,
    Sample,
    Error,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::GroupBy => "groupby",
            ResultKind::ValueCounts => "value_counts",
            ResultKind::Count => "count",
            ResultKind::Filtered => "filtered",
            ResultKind::Sorted => "sorted",
            ResultKind::Sample => "sample",
            ResultKind::Error => "error",
        }
    }
}

/// Grouped aggregation output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupByResult {
    pub group_column: String,
    pub aggregations: Vec<Aggregation>,
    /// Group key plus aggregated fields, sorted descending by the first aggregation.
    pub data: Vec<Record>,
    /// Number of groups before truncation.
    pub total_groups: usize,
}

/// Distinct-value frequency output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueCountsResult {
    pub column: String,
    /// Rows of `{<column>: value, count, percentage}` sorted by count descending.
    pub data: Vec<Record>,
    /// Non-null rows counted.
    pub total: usize,
}

/// What a [`CountResult`] counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMetric {
    UniqueCustomers,
    TotalOrders,
    TotalRecords,
}

/// Scalar count output with a one-row summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResult {
    pub metric: CountMetric,
    /// Column counted distinctly, for [`CountMetric::UniqueCustomers`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub value: usize,
    /// Human-readable filter description, e.g. `since 2020`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub data: Vec<Record>,
}

/// Rows matching a set of conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredResult {
    pub original_count: usize,
    pub filtered_count: usize,
    /// Ranked matching rows, capped.
    pub data: Vec<Record>,
}

/// Rows reordered by a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortedResult {
    pub column: String,
    pub ascending: bool,
    pub total: usize,
    /// Ranked rows in sorted order, capped.
    pub data: Vec<Record>,
}

/// The first rows of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResult {
    /// Rows in the full dataset.
    pub total: usize,
    pub data: Vec<Record>,
}

/// A structured, user-visible failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    pub message: String,
}

/// Output of the aggregation engine and intent parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisResult {
    #[serde(rename = "groupby")]
    GroupBy(GroupByResult),
    ValueCounts(ValueCountsResult),
    Count(CountResult),
    Filtered(FilteredResult),
    Sorted(SortedResult),
    Sample(SampleResult),
    Error(ErrorResult),
}

impl AnalysisResult {
    /// Build an error result from a message.
    pub fn error(message: impl Into<String>) -> Self {
        AnalysisResult::Error(ErrorResult {
            message: message.into(),
        })
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            AnalysisResult::GroupBy(_) => ResultKind::GroupBy,
            AnalysisResult::ValueCounts(_) => ResultKind::ValueCounts,
            AnalysisResult::Count(_) => ResultKind::Count,
            AnalysisResult::Filtered(_) => ResultKind::Filtered,
            AnalysisResult::Sorted(_) => ResultKind::Sorted,
            AnalysisResult::Sample(_) => ResultKind::Sample,
            AnalysisResult::Error(_) => ResultKind::Error,
        }
    }

    /// Result rows; empty for errors.
    pub fn data(&self) -> &[Record] {
        match self {
            AnalysisResult::GroupBy(r) => &r.data,
            AnalysisResult::ValueCounts(r) => &r.data,
            AnalysisResult::Count(r) => &r.data,
            AnalysisResult::Filtered(r) => &r.data,
            AnalysisResult::Sorted(r) => &r.data,
            AnalysisResult::Sample(r) => &r.data,
            AnalysisResult::Error(_) => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisResult::Error(_))
    }

    /// Error message, if this is an error result.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            AnalysisResult::Error(e) => Some(&e.message),
            _ => None,
        }
    }
}

impl From<AnalysisError> for AnalysisResult {
    fn from(e: AnalysisError) -> Self {
        AnalysisResult::error(e.to_string())
    }
}
