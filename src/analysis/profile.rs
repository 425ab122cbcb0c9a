//! Column classification and follow-up question suggestions.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::AnalysisLimits;
use crate::types::{DataSet, Value};

const DATE_WORDS: &[&str] = &["date", "time", "created"];
const LIMITATION_PHRASES: &[&str] = &["cannot determine", "not available", "limitation"];

/// How a column looks from its name and sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Date,
    Numeric,
    Categorical,
    Text,
}

/// Dataset shape summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: Vec<String>,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub date: Vec<String>,
    pub text: Vec<String>,
    /// Whole percentage of rows with no null or empty cell.
    pub data_quality: i64,
}

impl DatasetProfile {
    /// Classify every column.
    ///
    /// Names mentioning dates win; then the first row decides numeric; then a column with more
    /// than one but at most `min(categorical_max_unique, rows * categorical_ratio)` distinct
    /// values among the first `profile_sample_rows` rows is categorical; the rest is text.
    pub fn of(dataset: &DataSet, limits: &AnalysisLimits) -> Self {
        let columns = dataset.column_names();
        let mut profile = Self {
            rows: dataset.row_count(),
            columns: columns.clone(),
            numeric: Vec::new(),
            categorical: Vec::new(),
            date: Vec::new(),
            text: Vec::new(),
            data_quality: data_quality(dataset),
        };
        for column in columns {
            match classify(dataset, &column, limits) {
                ColumnKind::Date => profile.date.push(column),
                ColumnKind::Numeric => profile.numeric.push(column),
                ColumnKind::Categorical => profile.categorical.push(column),
                ColumnKind::Text => profile.text.push(column),
            }
        }
        profile
    }
}

/// Kind of one column; see [`DatasetProfile::of`].
pub fn classify(dataset: &DataSet, column: &str, limits: &AnalysisLimits) -> ColumnKind {
    let lower = column.to_lowercase();
    if DATE_WORDS.iter().any(|w| lower.contains(w)) {
        return ColumnKind::Date;
    }
    let first = dataset.column_values(column).next();
    if first.is_some_and(is_numeric_cell) {
        return ColumnKind::Numeric;
    }
    let distinct: HashSet<String> = dataset
        .column_values(column)
        .take(limits.profile_sample_rows)
        .filter(|v| !v.is_null())
        .map(Value::to_string)
        .collect();
    let bound = (limits.categorical_max_unique as f64).min(dataset.row_count() as f64 * limits.categorical_ratio);
    if distinct.len() > 1 && distinct.len() as f64 <= bound {
        ColumnKind::Categorical
    } else {
        ColumnKind::Text
    }
}

fn is_numeric_cell(value: &Value) -> bool {
    match value {
        Value::Int64(_) => true,
        Value::Float64(v) => v.is_finite(),
        Value::Utf8(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        Value::Bool(_) | Value::Null => false,
    }
}

fn data_quality(dataset: &DataSet) -> i64 {
    if dataset.is_empty() {
        return 0;
    }
    let width = dataset.schema.fields.len();
    let complete = dataset
        .rows
        .iter()
        .filter(|row| {
            (0..width).all(|i| match DataSet::cell(row, Some(i)) {
                Value::Null => false,
                Value::Utf8(s) => !s.is_empty(),
                _ => true,
            })
        })
        .count();
    (complete as f64 / dataset.row_count() as f64 * 100.0).round() as i64
}

/// A suggested next question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUp {
    pub question: String,
    pub reason: String,
}

impl FollowUp {
    fn new(question: impl Into<String>, reason: &str) -> Self {
        Self {
            question: question.into(),
            reason: reason.to_string(),
        }
    }
}

/// Follow-up questions grounded in the columns the dataset actually has.
///
/// Refinements are offered only when `response` admits a limitation; general questions fill
/// up to three suggestions. At most `limits.max_follow_ups` are returned.
pub fn suggest_follow_ups(profile: &DatasetProfile, response: &str, limits: &AnalysisLimits) -> Vec<FollowUp> {
    let mut out = Vec::new();
    let response = response.to_lowercase();

    if LIMITATION_PHRASES.iter().any(|p| response.contains(p)) {
        if let (Some(cat), Some(num)) = (profile.categorical.first(), profile.numeric.first()) {
            out.push(FollowUp::new(
                format!("Which {} has the highest {}?", cat.to_lowercase(), num.to_lowercase()),
                "Analysis using available categorical and numeric data",
            ));
        }
        if !profile.date.is_empty() {
            out.push(FollowUp::new(
                "What are the trends over time?",
                "Temporal analysis using available date information",
            ));
        }
        if let Some(cat) = profile.categorical.first() {
            out.push(FollowUp::new(
                format!("What is the distribution of {}?", cat.to_lowercase()),
                "Distribution analysis of categorical data",
            ));
        }
    }

    if out.len() < 3 {
        if let [first, second, ..] = profile.numeric.as_slice() {
            out.push(FollowUp::new(
                format!(
                    "What is the relationship between {} and {}?",
                    first.to_lowercase(),
                    second.to_lowercase()
                ),
                "Correlation analysis between numeric variables",
            ));
        }
        if profile.rows > 1000 {
            out.push(FollowUp::new(
                format!("What patterns exist across all {} records?", profile.rows),
                "Large dataset pattern analysis",
            ));
        }
    }

    out.truncate(limits.max_follow_ups);
    out
}
