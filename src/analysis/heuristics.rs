//! Keyword heuristics over question text and column names.
//!
//! These are guesses: every function returns `None` rather than failing, and callers fall
//! through to the next rule.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::AnalysisLimits;
use crate::processing::{YearFilter, YearOp};
use crate::semantic::ColumnResolver;
use crate::types::{DataSet, Value};

/// `(question keyword, resolver concept)` pairs tried when guessing a grouping column.
const GROUPING_KEYWORDS: &[(&str, &str)] = &[
    ("customer", "customer"),
    ("region", "region"),
    ("segment", "segment"),
    ("category", "category"),
    ("product", "product"),
    ("ship", "ship_mode"),
];

/// `(question phrase, resolver concept)` pairs tried when guessing a categorical column.
const CATEGORICAL_KEYWORDS: &[(&str, &str)] = &[
    ("ship mode", "ship_mode"),
    ("shipping", "ship_mode"),
    ("mode", "ship_mode"),
    ("category", "category"),
    ("segment", "segment"),
    ("region", "region"),
    ("product", "product"),
];

const CUSTOMER_WORDS: &[&str] = &["customer", "member", "user"];
const DATE_WORDS: &[&str] = &["date", "time", "created", "order"];

static YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(since|after|from|in)\s+)?(\d{4})\b").expect("valid year regex")
});

/// Map a code reference onto a real column.
///
/// Exact name, then case-insensitive name, then the resolver (lowercased name as concept,
/// with legacy substring fallback). An unmatched name is returned unchanged.
pub fn reconcile_column(columns: &[String], name: &str, resolver: &ColumnResolver) -> String {
    if columns.iter().any(|c| c == name) {
        return name.to_string();
    }
    if let Some(col) = columns.iter().find(|c| c.eq_ignore_ascii_case(name)) {
        return col.clone();
    }
    match resolver.resolve_or_fallback(columns, &name.to_lowercase()) {
        Some(col) => {
            tracing::debug!(reference = name, column = %col, "column reference reconciled");
            col
        }
        None => {
            tracing::warn!(reference = name, "column reference not found in dataset");
            name.to_string()
        }
    }
}

/// Guess a grouping column from grouping vocabulary in the question.
pub fn find_grouping_column(columns: &[String], question: &str, resolver: &ColumnResolver) -> Option<String> {
    let question = question.to_lowercase();
    GROUPING_KEYWORDS
        .iter()
        .filter(|(keyword, _)| question.contains(keyword))
        .find_map(|(keyword, concept)| {
            resolver
                .resolve(columns, concept)
                .or_else(|| column_containing(columns, keyword))
        })
}

/// Guess a categorical column: question vocabulary first, else the first low-cardinality
/// text column.
pub fn find_categorical_column(
    dataset: &DataSet,
    question: &str,
    resolver: &ColumnResolver,
    limits: &AnalysisLimits,
) -> Option<String> {
    let columns = dataset.column_names();
    let question = question.to_lowercase();
    let by_keyword = CATEGORICAL_KEYWORDS
        .iter()
        .filter(|(phrase, _)| question.contains(phrase))
        .find_map(|(phrase, concept)| {
            resolver
                .resolve(&columns, concept)
                .or_else(|| column_containing(&columns, &phrase.replace(' ', "")))
        });
    if by_keyword.is_some() {
        return by_keyword;
    }

    columns.into_iter().find(|col| {
        let mut values = dataset.column_values(col).filter(|v| !v.is_null()).peekable();
        if !matches!(values.peek(), Some(Value::Utf8(_))) {
            return false;
        }
        let distinct: HashSet<String> = values.map(Value::to_string).collect();
        distinct.len() < limits.categorical_max_unique
    })
}

/// First column that names customers, members or users.
pub fn find_customer_column(columns: &[String], resolver: &ColumnResolver) -> Option<String> {
    columns
        .iter()
        .find(|c| {
            let lower = c.to_lowercase();
            CUSTOMER_WORDS.iter().any(|w| lower.contains(w))
        })
        .cloned()
        .or_else(|| resolver.resolve(columns, "customer"))
}

/// The column holding dates: the resolver's `date` concept, else the first column whose
/// name contains `date`, `time`, `created` or `order`.
pub fn find_date_column(columns: &[String], resolver: &ColumnResolver) -> Option<String> {
    resolver.resolve(columns, "date").or_else(|| {
        columns
            .iter()
            .find(|c| {
                let lower = c.to_lowercase();
                DATE_WORDS.iter().any(|w| lower.contains(w))
            })
            .cloned()
    })
}

/// Whether the question asks about customers, members or users.
pub fn mentions_customers(question: &str) -> bool {
    let question = question.to_lowercase();
    CUSTOMER_WORDS.iter().any(|w| question.contains(w))
}

/// First year mentioned in the question.
///
/// `since`, `after`, `from` and a bare year mean "this year or later"; `in` means exactly
/// that year.
pub fn extract_year_filter(question: &str) -> Option<YearFilter> {
    let caps = YEAR.captures(question)?;
    let year = caps.get(2)?.as_str().parse::<i32>().ok()?;
    let op = match caps.get(1).map(|m| m.as_str().to_lowercase()) {
        Some(word) if word == "in" => YearOp::Exactly,
        _ => YearOp::AtLeast,
    };
    Some(YearFilter::new(year, op))
}

fn column_containing(columns: &[String], keyword: &str) -> Option<String> {
    columns
        .iter()
        .find(|c| c.to_lowercase().contains(keyword))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reconciles_case_and_concepts() {
        let resolver = ColumnResolver::new();
        let columns = cols(&["Region", "Sales", "Customer_Name"]);
        assert_eq!(reconcile_column(&columns, "Sales", &resolver), "Sales");
        assert_eq!(reconcile_column(&columns, "SALES", &resolver), "Sales");
        assert_eq!(reconcile_column(&columns, "customer", &resolver), "Customer_Name");
        assert_eq!(reconcile_column(&columns, "Xyz", &resolver), "Xyz");
    }

    #[test]
    fn grouping_column_follows_question_vocabulary() {
        let resolver = ColumnResolver::new();
        let columns = cols(&["Order_ID", "Ship_Mode", "Region"]);
        assert_eq!(
            find_grouping_column(&columns, "Total sales by Region please", &resolver).as_deref(),
            Some("Region")
        );
        assert_eq!(
            find_grouping_column(&columns, "How do we ship?", &resolver).as_deref(),
            Some("Ship_Mode")
        );
        assert_eq!(find_grouping_column(&columns, "Overall total", &resolver), None);
    }

    #[test]
    fn categorical_column_falls_back_to_low_cardinality_text() {
        let resolver = ColumnResolver::new();
        let ds = DataSet::from_records(
            (0..30)
                .map(|i| {
                    Record::from([
                        ("Id".to_string(), Value::Int64(i)),
                        ("Note".to_string(), Value::from(format!("note {i}"))),
                        ("Tier".to_string(), Value::from(if i % 2 == 0 { "Gold" } else { "Silver" })),
                    ])
                })
                .collect(),
        );
        let limits = AnalysisLimits::default();
        assert_eq!(
            find_categorical_column(&ds, "what is the spread?", &resolver, &limits).as_deref(),
            Some("Tier")
        );
    }

    #[test]
    fn categorical_column_prefers_question_phrase() {
        let resolver = ColumnResolver::new();
        let ds = DataSet::from_records(vec![Record::from([
            ("Segment".to_string(), Value::from("Consumer")),
            ("ShipMode".to_string(), Value::from("Air")),
        ])]);
        let limits = AnalysisLimits::default();
        assert_eq!(
            find_categorical_column(&ds, "Break down by ship mode", &resolver, &limits).as_deref(),
            Some("ShipMode")
        );
    }

    #[test]
    fn date_and_customer_columns() {
        let resolver = ColumnResolver::new();
        let columns = cols(&["Order_ID", "Order_Date", "Member_Ref"]);
        assert_eq!(find_date_column(&columns, &resolver).as_deref(), Some("Order_Date"));
        assert_eq!(find_customer_column(&columns, &resolver).as_deref(), Some("Member_Ref"));
        assert_eq!(find_date_column(&cols(&["Amount"]), &resolver), None);
    }

    #[test]
    fn year_filters() {
        assert_eq!(
            extract_year_filter("How many members joined since 2020?"),
            Some(YearFilter::new(2020, YearOp::AtLeast))
        );
        assert_eq!(
            extract_year_filter("Orders placed in 2019"),
            Some(YearFilter::new(2019, YearOp::Exactly))
        );
        assert_eq!(
            extract_year_filter("Customers joined 2021"),
            Some(YearFilter::new(2021, YearOp::AtLeast))
        );
        assert_eq!(extract_year_filter("How many customers?"), None);
        assert!(mentions_customers("How many USERS signed up"));
    }
}
