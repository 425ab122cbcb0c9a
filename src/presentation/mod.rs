//! Result-to-presentation formatting.
//!
//! [`format`] turns any [`AnalysisResult`] (or none at all) into a [`PresentationTable`] and a
//! [`Chart`] that a UI can render without knowing which rule produced the result. It never
//! fails: errors and empty results get placeholder tables and a `no_data` chart.
//!
//! Table rows are keyed by the table's column headers.
//!
//! ```rust
//! use tabular_insights::presentation::{format, ChartKind};
//! use tabular_insights::result::AnalysisResult;
//!
//! let out = format(Some(&AnalysisResult::error("boom")), "anything");
//! assert_eq!(out.table.title, "Analysis Error");
//! assert_eq!(out.chart.kind(), ChartKind::NoData);
//! ```

mod summary;
mod text;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::AnalysisLimits;
use crate::result::{
    AnalysisResult, CountMetric, CountResult, FilteredResult, GroupByResult, SampleResult, SortedResult,
    ValueCountsResult,
};
use crate::types::{Record, Value};

pub use summary::{basic_visualization, summary_table};
pub use text::{format_number, humanize};

use text::format_cell;

/// A titled table ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationTable {
    pub title: String,
    pub columns: Vec<String>,
    pub data: Vec<Record>,
    pub total_rows: usize,
}

impl PresentationTable {
    fn new(title: impl Into<String>, columns: Vec<String>, data: Vec<Record>) -> Self {
        Self {
            title: title.into(),
            columns,
            total_rows: data.len(),
            data,
        }
    }

    /// The single-row placeholder shown when there is nothing to format.
    pub fn no_results() -> Self {
        Self::new(
            "Analysis Results",
            vec!["Metric".to_string(), "Value".to_string()],
            vec![Record::from([
                ("Metric".to_string(), Value::from("No Results")),
                ("Value".to_string(), Value::from("Analysis could not be completed")),
            ])],
        )
    }
}

/// One bar of a bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: Value,
    pub value: Value,
    pub formatted_value: String,
}

/// Chart type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    BarChart,
    SummaryStats,
    NoData,
}

/// Library-independent chart descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Chart {
    BarChart {
        title: String,
        x_axis: String,
        y_axis: String,
        data: Vec<ChartPoint>,
    },
    SummaryStats {
        title: String,
        data: IndexMap<String, Value>,
    },
    NoData {
        title: String,
        message: String,
    },
}

impl Chart {
    pub fn kind(&self) -> ChartKind {
        match self {
            Chart::BarChart { .. } => ChartKind::BarChart,
            Chart::SummaryStats { .. } => ChartKind::SummaryStats,
            Chart::NoData { .. } => ChartKind::NoData,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Chart::BarChart { title, .. } | Chart::SummaryStats { title, .. } | Chart::NoData { title, .. } => title,
        }
    }

    pub fn no_data() -> Self {
        Chart::NoData {
            title: "No Visualization Available".to_string(),
            message: "Could not generate visualization from analysis results".to_string(),
        }
    }

    fn summary(title: &str, entries: Vec<(&str, Value)>) -> Self {
        Chart::SummaryStats {
            title: title.to_string(),
            data: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

/// A table and its chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub table: PresentationTable,
    pub chart: Chart,
}

/// Format `result` with the default limits.
pub fn format(result: Option<&AnalysisResult>, question: &str) -> Presentation {
    format_with(result, question, &AnalysisLimits::default())
}

/// Format `result`; bar charts keep at most `limits.chart_points` bars.
pub fn format_with(result: Option<&AnalysisResult>, question: &str, limits: &AnalysisLimits) -> Presentation {
    let Some(result) = result else {
        tracing::debug!(question, "no result to format; using placeholders");
        return Presentation {
            table: PresentationTable::no_results(),
            chart: Chart::no_data(),
        };
    };
    let points = limits.chart_points;
    let (table, chart) = match result {
        AnalysisResult::ValueCounts(r) => (value_counts_table(r), value_counts_chart(r, points)),
        AnalysisResult::GroupBy(r) => (group_by_table(r), group_by_chart(r, points)),
        AnalysisResult::Count(r) => (count_table(r), count_chart(r)),
        AnalysisResult::Filtered(r) => (filtered_table(r), filtered_chart(r)),
        AnalysisResult::Sorted(r) => (sorted_table(r), sorted_chart(r)),
        AnalysisResult::Sample(r) => (sample_table(r), sample_chart(r)),
        AnalysisResult::Error(e) => (
            PresentationTable::new(
                "Analysis Error",
                vec!["Error".to_string()],
                vec![Record::from([("Error".to_string(), Value::from(e.message.as_str()))])],
            ),
            Chart::no_data(),
        ),
    };
    let chart = if result.data().is_empty() { Chart::no_data() } else { chart };
    Presentation { table, chart }
}

fn value_counts_table(r: &ValueCountsResult) -> PresentationTable {
    if r.data.is_empty() {
        return PresentationTable::no_results();
    }
    let display = humanize(&r.column);
    let data = r
        .data
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Record::from([
                ("Rank".to_string(), Value::Int64(i as i64 + 1)),
                (display.clone(), field(row, &r.column)),
                ("Count".to_string(), field(row, "count")),
                ("Percentage".to_string(), Value::Utf8(format!("{}%", field(row, "percentage")))),
            ])
        })
        .collect();
    PresentationTable::new(
        format!("{display} Distribution"),
        vec!["Rank".to_string(), display.clone(), "Count".to_string(), "Percentage".to_string()],
        data,
    )
}

fn value_counts_chart(r: &ValueCountsResult, points: usize) -> Chart {
    let display = humanize(&r.column);
    Chart::BarChart {
        title: format!("{display} Distribution"),
        x_axis: display,
        y_axis: "Count".to_string(),
        data: r
            .data
            .iter()
            .take(points)
            .map(|row| ChartPoint {
                label: field(row, &r.column),
                value: field(row, "count"),
                formatted_value: format!("{} ({}%)", field(row, "count"), field(row, "percentage")),
            })
            .collect(),
    }
}

fn group_by_table(r: &GroupByResult) -> PresentationTable {
    let Some(first) = r.data.first() else {
        return PresentationTable::new(
            "No Results Found",
            vec!["Message".to_string()],
            vec![Record::from([(
                "Message".to_string(),
                Value::from("No data available for groupby analysis"),
            )])],
        );
    };
    let group_display = humanize(&r.group_column);
    let mut columns = vec!["Rank".to_string(), group_display.clone()];
    columns.extend(
        first
            .keys()
            .filter(|k| *k != &r.group_column && k.as_str() != "rank")
            .map(|k| humanize(k)),
    );

    let data = r
        .data
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut out = Record::new();
            out.insert("Rank".to_string(), Value::Int64(i as i64 + 1));
            for (key, value) in row {
                if key == &r.group_column {
                    out.insert(group_display.clone(), value.clone());
                } else if key != "rank" {
                    out.insert(humanize(key), format_cell(value));
                }
            }
            out
        })
        .collect();

    let by = r
        .aggregations
        .first()
        .map(|a| a.column.to_uppercase())
        .unwrap_or_else(|| "Performance".to_string());
    PresentationTable::new(
        format!("Top {} {}s by {}", r.data.len(), group_display, by),
        columns,
        data,
    )
}

fn group_by_chart(r: &GroupByResult, points: usize) -> Chart {
    let group_display = humanize(&r.group_column);
    let value_column = r
        .data
        .first()
        .and_then(|first| {
            first.iter().find_map(|(k, v)| {
                let numeric = matches!(v, Value::Int64(_) | Value::Float64(_));
                (k != &r.group_column && k != "rank" && numeric).then(|| k.clone())
            })
        })
        .unwrap_or_else(|| "count".to_string());
    Chart::BarChart {
        title: format!("{group_display} Analysis"),
        x_axis: group_display,
        y_axis: humanize(&value_column),
        data: r
            .data
            .iter()
            .take(points)
            .map(|row| {
                let value = field(row, &value_column);
                ChartPoint {
                    label: field(row, &r.group_column),
                    formatted_value: value.to_string(),
                    value,
                }
            })
            .collect(),
    }
}

fn count_titles(metric: CountMetric) -> (&'static str, &'static str) {
    match metric {
        CountMetric::UniqueCustomers => ("Member/Customer Count Analysis", "Member/Customer Analysis"),
        CountMetric::TotalOrders => ("Order Count Analysis", "Order Analysis"),
        CountMetric::TotalRecords => ("Count Analysis", "Count Analysis"),
    }
}

fn count_table(r: &CountResult) -> PresentationTable {
    let data = r
        .data
        .iter()
        .map(|row| {
            let details = match (row.get("percentage"), row.get("total_records")) {
                (Some(p), _) if p.is_truthy() => format!("{p}%"),
                (_, Some(total)) if total.is_truthy() => format!("out of {total} total records"),
                _ => r.filter.clone().unwrap_or_else(|| "all time".to_string()),
            };
            Record::from([
                ("Metric".to_string(), field(row, "metric")),
                ("Value".to_string(), format_cell(&field(row, "value"))),
                ("Details".to_string(), Value::Utf8(details)),
            ])
        })
        .collect();
    PresentationTable::new(
        count_titles(r.metric).0,
        vec!["Metric".to_string(), "Value".to_string(), "Details".to_string()],
        data,
    )
}

fn count_chart(r: &CountResult) -> Chart {
    let label = r
        .data
        .first()
        .and_then(|row| row.get("metric"))
        .cloned()
        .unwrap_or_else(|| Value::from("Count"));
    Chart::summary(
        count_titles(r.metric).1,
        vec![
            ("primary_metric", Value::Int64(r.value as i64)),
            ("metric_label", label),
            ("filter_applied", Value::from(r.filter.as_deref().unwrap_or("none"))),
            ("data_source", Value::from(r.column.as_deref().unwrap_or("dataset"))),
        ],
    )
}

/// Columns are the first row's keys, unchanged. No rows gives the placeholder table.
fn passthrough_table(title: String, data: &[Record]) -> PresentationTable {
    let Some(first) = data.first() else {
        return PresentationTable::no_results();
    };
    PresentationTable::new(title, first.keys().cloned().collect(), data.to_vec())
}

fn filtered_table(r: &FilteredResult) -> PresentationTable {
    passthrough_table(
        format!("Filtered Results ({} of {} records)", r.filtered_count, r.original_count),
        &r.data,
    )
}

fn filtered_chart(r: &FilteredResult) -> Chart {
    let effectiveness = if r.original_count == 0 {
        0
    } else {
        (r.filtered_count as f64 / r.original_count as f64 * 100.0).round() as i64
    };
    Chart::summary(
        "Filtered Data Overview",
        vec![
            ("records_shown", Value::Int64(r.data.len() as i64)),
            ("matching_records", Value::Int64(r.filtered_count as i64)),
            ("total_records", Value::Int64(r.original_count as i64)),
            ("filter_effectiveness", Value::Int64(effectiveness)),
        ],
    )
}

fn sorted_table(r: &SortedResult) -> PresentationTable {
    let direction = if r.ascending { "ascending" } else { "descending" };
    passthrough_table(format!("Sorted by {} ({direction})", humanize(&r.column)), &r.data)
}

fn sorted_chart(r: &SortedResult) -> Chart {
    Chart::summary(
        "Sorted Data Overview",
        vec![
            ("records_shown", Value::Int64(r.data.len() as i64)),
            ("total_records", Value::Int64(r.total as i64)),
            ("sorted_by", Value::from(r.column.as_str())),
        ],
    )
}

fn sample_table(r: &SampleResult) -> PresentationTable {
    passthrough_table("Data Sample".to_string(), &r.data)
}

fn sample_chart(r: &SampleResult) -> Chart {
    Chart::summary(
        "Data Sample Overview",
        vec![
            ("records_shown", Value::Int64(r.data.len() as i64)),
            ("total_records", Value::Int64(r.total as i64)),
        ],
    )
}

fn field(row: &Record, key: &str) -> Value {
    row.get(key).cloned().unwrap_or(Value::Null)
}
