//! Aggregation-plan extraction from pandas-style code.

use std::sync::LazyLock;

use regex::Regex;

use crate::processing::{AggOp, Aggregation};

static AGG_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.agg\(\s*\{([^}]+)\}\s*\)").expect("valid agg block regex"));

static AGG_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]([^'"]+)['"]\s*:\s*['"](\w+)['"]"#).expect("valid agg pair regex")
});

static COLUMN_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[\s*['"]([^'"\]]+)['"]\s*\]\s*\.(sum|mean|count)\(\)"#).expect("valid column method regex")
});

static COLUMN_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[\s*['"]([^'"\]]+)['"]\s*\]"#).expect("valid column reference regex"));

/// Work out which aggregations `code` asks for.
///
/// 1. `.agg({'col': 'op', ...})` pairs, either quote style.
/// 2. `['col'].sum()`, `['col'].mean()`, `['col'].count()`; a `.count()` not attached to a
///    column counts records.
/// 3. Nothing found: one aggregation over the last bracketed column, `mean` when the code or
///    question mentions discounts and `sum` otherwise.
/// 4. No bracketed column at all: count records.
pub fn extract_aggregations(code: &str, question: &str) -> Vec<Aggregation> {
    let mut out: Vec<Aggregation> = Vec::new();
    let mut push = |agg: Aggregation| {
        if !out.contains(&agg) {
            out.push(agg);
        }
    };

    if let Some(block) = AGG_BLOCK.captures(code).and_then(|c| c.get(1)) {
        for caps in AGG_PAIR.captures_iter(block.as_str()) {
            let (column, op) = (&caps[1], &caps[2]);
            match AggOp::parse(op) {
                Some(op) => push(Aggregation::new(column, op)),
                None => tracing::warn!(column, operation = op, "unsupported aggregation skipped"),
            }
        }
    }

    let mut column_counts = 0;
    for caps in COLUMN_METHOD.captures_iter(code) {
        let Some(op) = AggOp::parse(&caps[2]) else {
            continue;
        };
        if op == AggOp::Count {
            column_counts += 1;
        }
        push(Aggregation::new(&caps[1], op));
    }
    if code.matches(".count()").count() > column_counts {
        push(Aggregation::record_count());
    }

    if !out.is_empty() {
        return out;
    }

    let Some(column) = COLUMN_REF.captures_iter(code).last().map(|c| c[1].to_string()) else {
        tracing::debug!("no aggregation or column reference found; counting records");
        return vec![Aggregation::record_count()];
    };
    let context = format!("{code}\n{question}").to_lowercase();
    let op = if context.contains("discount") {
        AggOp::Mean
    } else {
        if !context.contains("sales") && !context.contains("profit") {
            tracing::debug!(column = %column, "ambiguous aggregation intent; defaulting to sum");
        }
        AggOp::Sum
    };
    vec![Aggregation::new(column, op)]
}
