//! Dataset overview shown when there is no analysis result to format.

use crate::analysis::DatasetProfile;
use crate::types::{Record, Value};

use super::{Chart, PresentationTable, format_number};

/// Record, column, numeric and categorical counts as a `Metric`/`Value` table.
pub fn summary_table(profile: &DatasetProfile, title: &str) -> PresentationTable {
    let row = |metric: &str, value: Value| {
        Record::from([
            ("Metric".to_string(), Value::from(metric)),
            ("Value".to_string(), value),
        ])
    };
    PresentationTable::new(
        title,
        vec!["Metric".to_string(), "Value".to_string()],
        vec![
            row("Total Records", Value::Utf8(format_number(profile.rows as f64))),
            row("Total Columns", Value::Int64(profile.columns.len() as i64)),
            row("Numeric Columns", Value::Int64(profile.numeric.len() as i64)),
            row("Categorical Columns", Value::Int64(profile.categorical.len() as i64)),
        ],
    )
}

/// Records, columns and data-quality percentage as a `summary_stats` chart.
pub fn basic_visualization(profile: &DatasetProfile, title: &str) -> Chart {
    Chart::summary(
        title,
        vec![
            ("total_records", Value::Int64(profile.rows as i64)),
            ("total_columns", Value::Int64(profile.columns.len() as i64)),
            ("data_quality", Value::Int64(profile.data_quality)),
        ],
    )
}
