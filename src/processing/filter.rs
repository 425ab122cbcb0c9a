//! Row filtering for [`crate::types::DataSet`].
//!
//! Besides predicate filtering, this module understands simple textual conditions as they
//! appear in pandas-style code: `df['Sales'] > 100`, `df[Region == 'West']`.

use std::sync::LazyLock;

use regex::Regex;

use crate::result::{AnalysisResult, FilteredResult};
use crate::types::{DataSet, Value, parse_number};

/// Returns a new [`DataSet`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`DataSet::filter_rows`].
pub fn filter<F>(dataset: &DataSet, predicate: F) -> DataSet
where
    F: FnMut(&[Value]) -> bool,
{
    dataset.filter_rows(predicate)
}

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Ne),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            _ => None,
        }
    }
}

/// `column <op> literal`, with quotes already stripped from the literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
    pub literal: String,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: CompareOp, literal: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op,
            literal: literal.into(),
        }
    }

    /// Whether `value` satisfies this condition.
    ///
    /// Equality compares numerically when both sides are numbers, else by text; ordering
    /// operators require both sides to be numeric.
    pub fn matches(&self, value: &Value) -> bool {
        match self.op {
            CompareOp::Eq => self.equals(value),
            CompareOp::Ne => !self.equals(value),
            op => {
                let (Some(lhs), Some(rhs)) = (value.as_number(), parse_number(&self.literal)) else {
                    return false;
                };
                match op {
                    CompareOp::Gt => lhs > rhs,
                    CompareOp::Ge => lhs >= rhs,
                    CompareOp::Lt => lhs < rhs,
                    CompareOp::Le => lhs <= rhs,
                    CompareOp::Eq | CompareOp::Ne => unreachable!("equality handled above"),
                }
            }
        }
    }

    fn equals(&self, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }
        match (value.as_number(), self.literal.trim().parse::<f64>().ok()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => value.to_string() == self.literal,
        }
    }
}

const OPERATOR: &str = r"(==|!=|>=|<=|>|<)";
const LITERAL: &str = r#"('[^']*'|"[^"]*"|[-+]?\d+(?:\.\d+)?|\w+)"#;

// df['col'] <op> literal
static BRACKET_CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"df\[\s*['"]([^'"\]]+)['"]\s*\]\s*{OPERATOR}\s*{LITERAL}"#))
        .expect("valid bracket condition regex")
});

// df[col <op> literal]
static BARE_CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"df\[\s*(\w+)\s*{OPERATOR}\s*{LITERAL}\s*\]"))
        .expect("valid bare condition regex")
});

/// Extract every recognizable condition from `source`, in order of appearance, deduplicated.
pub fn parse_conditions(source: &str) -> Vec<Condition> {
    let mut found: Vec<(usize, Condition)> = Vec::new();
    for re in [&*BRACKET_CONDITION, &*BARE_CONDITION] {
        for caps in re.captures_iter(source) {
            let (Some(whole), Some(column), Some(op), Some(literal)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            let Some(op) = CompareOp::parse(op.as_str()) else {
                continue;
            };
            let literal = literal.as_str().trim_matches(|c| c == '\'' || c == '"');
            found.push((whole.start(), Condition::new(column.as_str(), op, literal)));
        }
    }
    found.sort_by_key(|(pos, _)| *pos);

    let mut out: Vec<Condition> = Vec::new();
    for (_, cond) in found {
        if !out.contains(&cond) {
            out.push(cond);
        }
    }
    out
}

/// Keep rows satisfying every condition (logical AND).
pub fn apply_conditions(dataset: &DataSet, conditions: &[Condition]) -> DataSet {
    let idxs: Vec<Option<usize>> = conditions
        .iter()
        .map(|c| dataset.schema.index_of(&c.column))
        .collect();
    filter(dataset, |row| {
        conditions
            .iter()
            .zip(&idxs)
            .all(|(cond, idx)| cond.matches(DataSet::cell(row, *idx)))
    })
}

/// Filter `dataset` by the conditions found in `source`.
///
/// Returns `None` when `source` holds no recognizable condition.
pub fn filter_by_source(dataset: &DataSet, source: &str, limit: usize) -> Option<AnalysisResult> {
    let conditions = parse_conditions(source);
    if conditions.is_empty() {
        return None;
    }
    let filtered = apply_conditions(dataset, &conditions);
    tracing::debug!(
        conditions = conditions.len(),
        before = dataset.row_count(),
        after = filtered.row_count(),
        "filter applied"
    );
    Some(AnalysisResult::Filtered(FilteredResult {
        original_count: dataset.row_count(),
        filtered_count: filtered.row_count(),
        data: filtered.ranked_records(limit),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    fn sample_dataset() -> DataSet {
        DataSet::from_records(vec![
            Record::from([
                ("Region".to_string(), Value::from("West")),
                ("Sales".to_string(), Value::Int64(120)),
            ]),
            Record::from([
                ("Region".to_string(), Value::from("East")),
                ("Sales".to_string(), Value::from("80")),
            ]),
            Record::from([
                ("Region".to_string(), Value::from("West")),
                ("Sales".to_string(), Value::Float64(50.5)),
            ]),
        ])
    }

    #[test]
    fn filter_rows_can_return_empty_dataset() {
        let ds = sample_dataset();
        let out = filter(&ds, |_| false);
        assert_eq!(out.schema, ds.schema);
        assert!(out.rows.is_empty());
    }

    #[test]
    fn parses_bracket_and_bare_shapes() {
        let conds = parse_conditions("high = df[df['Sales'] >= 100]\nwest = df[Region == 'West']");
        assert_eq!(
            conds,
            vec![
                Condition::new("Sales", CompareOp::Ge, "100"),
                Condition::new("Region", CompareOp::Eq, "West"),
            ]
        );
    }

    #[test]
    fn plain_column_access_is_not_a_condition() {
        assert!(parse_conditions("df['Sales'].sum()").is_empty());
    }

    #[test]
    fn conditions_are_anded() {
        let ds = sample_dataset();
        let out = apply_conditions(
            &ds,
            &[
                Condition::new("Region", CompareOp::Eq, "West"),
                Condition::new("Sales", CompareOp::Gt, "60"),
            ],
        );
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0][1], Value::Int64(120));
    }

    #[test]
    fn numeric_comparisons_parse_strings() {
        let ds = sample_dataset();
        let out = apply_conditions(&ds, &[Condition::new("Sales", CompareOp::Lt, "100")]);
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn equality_is_numeric_when_possible() {
        assert!(Condition::new("x", CompareOp::Eq, "80").matches(&Value::from("80.0")));
        assert!(Condition::new("x", CompareOp::Ne, "West").matches(&Value::from("East")));
        assert!(!Condition::new("x", CompareOp::Eq, "West").matches(&Value::Null));
        assert!(!Condition::new("x", CompareOp::Gt, "abc").matches(&Value::Int64(1)));
    }

    #[test]
    fn filter_by_source_reports_counts() {
        let ds = sample_dataset();
        let AnalysisResult::Filtered(f) = filter_by_source(&ds, "df[df[\"Region\"] == \"West\"]", 20).unwrap()
        else {
            panic!("expected filtered");
        };
        assert_eq!((f.original_count, f.filtered_count), (3, 2));
        assert_eq!(f.data[1]["rank"], Value::Int64(2));
        assert!(filter_by_source(&ds, "df.head()", 20).is_none());
    }
}
