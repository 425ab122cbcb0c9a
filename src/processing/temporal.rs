//! Year-based filtering over loosely formatted date columns.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::types::{DataSet, Value};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Calendar year of a cell.
///
/// Accepts RFC 3339 timestamps, common date and datetime layouts, bare 4-digit years and
/// epoch milliseconds. Anything else is `None`.
pub fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::Int64(v) => year_from_number(*v),
        Value::Float64(v) if v.fract() == 0.0 && v.is_finite() => year_from_number(*v as i64),
        Value::Utf8(s) => parse_year_str(s.trim()),
        _ => None,
    }
}

fn year_from_number(v: i64) -> Option<i32> {
    if (1000..=9999).contains(&v) {
        return i32::try_from(v).ok();
    }
    DateTime::from_timestamp_millis(v).map(|dt| dt.year())
}

fn parse_year_str(s: &str) -> Option<i32> {
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i64>().ok().and_then(year_from_number);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.year());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.year());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .map(|d| d.year())
}

/// How a [`YearFilter`] compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearOp {
    /// `since`, `after`, `from`.
    AtLeast,
    /// `in`.
    Exactly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearFilter {
    pub year: i32,
    pub op: YearOp,
}

impl YearFilter {
    pub fn new(year: i32, op: YearOp) -> Self {
        Self { year, op }
    }

    pub fn matches(&self, year: i32) -> bool {
        match self.op {
            YearOp::AtLeast => year >= self.year,
            YearOp::Exactly => year == self.year,
        }
    }

    /// `since 2020` or `in 2020`.
    pub fn describe(&self) -> String {
        match self.op {
            YearOp::AtLeast => format!("since {}", self.year),
            YearOp::Exactly => format!("in {}", self.year),
        }
    }
}

/// Rows whose `column` parses to a year accepted by `filter`; unparseable dates are dropped.
pub fn filter_by_year(dataset: &DataSet, column: &str, filter: &YearFilter) -> DataSet {
    let idx = dataset.schema.index_of(column);
    dataset.filter_rows(|row| parse_year(DataSet::cell(row, idx)).is_some_and(|y| filter.matches(y)))
}
