//! The ordered rule chain mapping code text onto aggregation-engine calls.
//!
//! Each [`Rule`] has a cheap textual trigger and a handler. Handlers return `Ok(None)` when the
//! trigger fired but nothing usable was found, and the chain moves on. The last rule always
//! produces a sample, so a chain run only fails through a handler's `Err`.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AnalysisOptions;
use crate::error::{AnalysisError, AnalysisOutcome};
use crate::processing::{
    Aggregation, CountSummary, RECORDS, apply_conditions, distinct_count, filter_by_year, group_by,
    parse_conditions, sort, value_counts,
};
use crate::result::{AnalysisResult, CountMetric, FilteredResult, SampleResult};
use crate::semantic::ColumnResolver;
use crate::types::DataSet;

use super::aggregations::extract_aggregations;
use super::guard::{check_forbidden, unknown_references};
use super::heuristics::{
    extract_year_filter, find_categorical_column, find_customer_column, find_date_column,
    find_grouping_column, mentions_customers, reconcile_column,
};

type Outcome = AnalysisOutcome<Option<AnalysisResult>>;

/// Everything a rule handler may look at.
pub struct Scope<'a> {
    pub dataset: &'a DataSet,
    pub columns: Vec<String>,
    pub code: &'a str,
    pub question: &'a str,
    pub resolver: &'a ColumnResolver,
    pub options: &'a AnalysisOptions,
}

impl<'a> Scope<'a> {
    pub fn new(
        dataset: &'a DataSet,
        code: &'a str,
        question: &'a str,
        resolver: &'a ColumnResolver,
        options: &'a AnalysisOptions,
    ) -> Self {
        Self {
            dataset,
            columns: dataset.column_names(),
            code,
            question,
            resolver,
            options,
        }
    }

    fn question_lower(&self) -> String {
        self.question.to_lowercase()
    }

    fn reconcile(&self, name: &str) -> String {
        reconcile_column(&self.columns, name, self.resolver)
    }

    fn aggregations(&self) -> Vec<Aggregation> {
        extract_aggregations(self.code, self.question)
            .into_iter()
            .map(|agg| {
                if agg.column == RECORDS {
                    agg
                } else {
                    Aggregation::new(self.reconcile(&agg.column), agg.operation)
                }
            })
            .collect()
    }

    fn group(&self, dataset: &DataSet, column: &str) -> AnalysisResult {
        group_by(dataset, column, &self.aggregations(), self.options.limits.max_group_rows)
    }
}

/// One step of the chain.
pub struct Rule {
    pub name: &'static str,
    applies: fn(&str) -> bool,
    run: fn(&Scope<'_>) -> Outcome,
}

impl Rule {
    /// Whether the code text triggers this rule.
    pub fn applies(&self, code: &str) -> bool {
        (self.applies)(code)
    }

    pub fn run(&self, scope: &Scope<'_>) -> Outcome {
        (self.run)(scope)
    }
}

/// The chain in priority order.
pub static RULES: &[Rule] = &[
    Rule { name: "guard", applies: always, run: guard },
    Rule { name: "value_counts", applies: |c| c.contains("value_counts()"), run: value_counts_rule },
    Rule { name: "groupby", applies: |c| c.contains("groupby("), run: groupby_rule },
    Rule { name: "sort_values", applies: |c| c.contains("sort_values("), run: sort_rule },
    Rule {
        name: "date",
        applies: |c| c.contains("to_datetime") || c.contains("datetime"),
        run: date_rule,
    },
    Rule {
        name: "filter",
        applies: |c| c.contains("df[") && ["==", "!=", ">", "<"].iter().any(|op| c.contains(op)),
        run: filter_rule,
    },
    Rule {
        name: "count",
        applies: |c| c.contains("len(") || c.contains(".count()") || c.contains("COUNT("),
        run: count_rule,
    },
    Rule { name: "extraction", applies: always, run: extraction_rule },
    Rule { name: "sample", applies: always, run: sample_rule },
];

/// A result and the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched {
    pub rule: &'static str,
    pub result: AnalysisResult,
}

/// Run [`RULES`] against `scope`; the first rule yielding a result wins.
pub fn dispatch(scope: &Scope<'_>) -> Result<Matched, AnalysisError> {
    for rule in RULES {
        if !rule.applies(scope.code) {
            continue;
        }
        if let Some(result) = rule.run(scope)? {
            tracing::debug!(rule = rule.name, kind = result.kind().as_str(), "rule matched");
            return Ok(Matched { rule: rule.name, result });
        }
        tracing::debug!(rule = rule.name, "rule triggered without a result; continuing");
    }
    Err(AnalysisError::Internal {
        message: "no rule produced a result".to_string(),
    })
}

fn always(_: &str) -> bool {
    true
}

fn guard(scope: &Scope<'_>) -> Outcome {
    check_forbidden(scope.code, &scope.options.forbidden_columns, &scope.columns)?;
    unknown_references(scope.code, &scope.columns);
    Ok(None)
}

static VALUE_COUNTS_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"df\[\s*['"]([^'"\]]+)['"]\s*\]\s*\.value_counts\(\)|df\.(\w+)\.value_counts\(\)"#)
        .expect("valid value_counts regex")
});

fn value_counts_rule(scope: &Scope<'_>) -> Outcome {
    let Some(caps) = VALUE_COUNTS_COLUMN.captures(scope.code) else {
        return Ok(None);
    };
    let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
        return Ok(None);
    };
    let column = scope.reconcile(name.as_str());
    Ok(Some(value_counts(scope.dataset, &column)))
}

static GROUPBY_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"groupby\(\s*(?:by\s*=\s*)?\[?\s*['"]([^'"]+)['"]"#).expect("valid groupby regex")
});

fn groupby_rule(scope: &Scope<'_>) -> Outcome {
    let Some(caps) = GROUPBY_COLUMN.captures(scope.code) else {
        return Ok(None);
    };
    let column = scope.reconcile(&caps[1]);
    Ok(Some(scope.group(scope.dataset, &column)))
}

static SORT_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"sort_values\(\s*(?:by\s*=\s*)?['"]([^'"]+)['"]\s*(?:,\s*ascending\s*=\s*(\w+))?"#)
        .expect("valid sort_values regex")
});

fn sort_rule(scope: &Scope<'_>) -> Outcome {
    let Some(caps) = SORT_VALUES.captures(scope.code) else {
        return Ok(None);
    };
    let column = scope.reconcile(&caps[1]);
    let ascending = caps.get(2).is_none_or(|m| m.as_str() != "False");
    Ok(Some(sort(
        scope.dataset,
        &column,
        ascending,
        scope.options.limits.max_filtered_rows,
    )))
}

fn date_rule(scope: &Scope<'_>) -> Outcome {
    let date_column =
        find_date_column(&scope.columns, scope.resolver).ok_or(AnalysisError::NoDateColumn)?;
    let year_filter = extract_year_filter(scope.question);
    let filtered = match &year_filter {
        Some(f) => filter_by_year(scope.dataset, &date_column, f),
        None => scope.dataset.clone(),
    };
    tracing::debug!(
        column = %date_column,
        before = scope.dataset.row_count(),
        after = filtered.row_count(),
        "date filter applied"
    );
    let period = year_filter.map(|f| f.describe());
    let filter_label = period.clone().unwrap_or_else(|| "all time".to_string());
    let suffix = period.unwrap_or_else(|| "total".to_string());

    if mentions_customers(scope.question) {
        if let Some(customer) = find_customer_column(&scope.columns, scope.resolver) {
            let value = distinct_count(&filtered, &customer);
            let population = if year_filter.is_some() {
                distinct_count(scope.dataset, &customer)
            } else {
                value
            };
            return Ok(Some(
                CountSummary::new(CountMetric::UniqueCustomers, format!("Members joined {suffix}"), value, population)
                    .with_column(customer)
                    .with_filter(filter_label)
                    .into_result(),
            ));
        }
    }

    Ok(Some(
        CountSummary::new(
            CountMetric::TotalRecords,
            format!("Records {suffix}"),
            filtered.row_count(),
            scope.dataset.row_count(),
        )
        .with_filter(filter_label)
        .into_result(),
    ))
}

fn filter_rule(scope: &Scope<'_>) -> Outcome {
    let conditions: Vec<_> = parse_conditions(scope.code)
        .into_iter()
        .map(|mut c| {
            c.column = scope.reconcile(&c.column);
            c
        })
        .collect();
    if conditions.is_empty() {
        return Ok(None);
    }
    let filtered = apply_conditions(scope.dataset, &conditions);
    tracing::debug!(
        conditions = conditions.len(),
        before = scope.dataset.row_count(),
        after = filtered.row_count(),
        "filter applied"
    );

    let question = scope.question_lower();
    if question.contains("by ") && (question.contains("region") || question.contains("category")) {
        if let Some(column) = find_grouping_column(&scope.columns, &question, scope.resolver) {
            return Ok(Some(scope.group(&filtered, &column)));
        }
    }

    Ok(Some(AnalysisResult::Filtered(FilteredResult {
        original_count: scope.dataset.row_count(),
        filtered_count: filtered.row_count(),
        data: filtered.ranked_records(scope.options.limits.max_filtered_rows),
    })))
}

fn count_rule(scope: &Scope<'_>) -> Outcome {
    let question = scope.question_lower();
    let rows = scope.dataset.row_count();

    if question.contains("member") || question.contains("customer") {
        if let Some(customer) = find_customer_column(&scope.columns, scope.resolver) {
            let value = distinct_count(scope.dataset, &customer);
            return Ok(Some(
                CountSummary::new(CountMetric::UniqueCustomers, "Unique Members/Customers", value, rows)
                    .with_column(customer)
                    .with_total_records(rows)
                    .into_result(),
            ));
        }
    }
    if question.contains("order") {
        return Ok(Some(
            CountSummary::new(CountMetric::TotalOrders, "Total Orders", rows, rows).into_result(),
        ));
    }
    Ok(Some(
        CountSummary::new(CountMetric::TotalRecords, "Total Records", rows, rows).into_result(),
    ))
}

fn extraction_rule(scope: &Scope<'_>) -> Outcome {
    let code = scope.code;
    if code.contains("groupby") || code.contains("GROUP BY") {
        if let Some(column) = find_grouping_column(&scope.columns, scope.question, scope.resolver) {
            tracing::debug!(column = %column, "grouping column guessed from question");
            return Ok(Some(scope.group(scope.dataset, &column)));
        }
    }
    if code.contains("value_counts") || code.contains("COUNT(") {
        if let Some(column) =
            find_categorical_column(scope.dataset, scope.question, scope.resolver, &scope.options.limits)
        {
            tracing::debug!(column = %column, "categorical column guessed from question");
            return Ok(Some(value_counts(scope.dataset, &column)));
        }
    }
    Ok(None)
}

fn sample_rule(scope: &Scope<'_>) -> Outcome {
    tracing::info!("no analysis pattern recognized; returning a data sample");
    Ok(Some(AnalysisResult::Sample(SampleResult {
        total: scope.dataset.row_count(),
        data: scope.dataset.ranked_records(scope.options.limits.sample_rows),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ResultKind;
    use crate::types::{Record, Value};

    fn orders() -> DataSet {
        let rows = [
            ("West", "Consumer", "C1", "2019-03-01", 100.0, 0.1),
            ("West", "Corporate", "C2", "2020-06-15", 250.0, 0.0),
            ("East", "Consumer", "C1", "2021-01-20", 80.0, 0.2),
            ("South", "Consumer", "C3", "2021-11-02", 40.0, 0.3),
        ];
        DataSet::from_records(
            rows.iter()
                .map(|(region, segment, customer, date, sales, discount)| {
                    Record::from([
                        ("Region".to_string(), Value::from(*region)),
                        ("Segment".to_string(), Value::from(*segment)),
                        ("Customer_ID".to_string(), Value::from(*customer)),
                        ("Order_Date".to_string(), Value::from(*date)),
                        ("Sales".to_string(), Value::Float64(*sales)),
                        ("Discount".to_string(), Value::Float64(*discount)),
                    ])
                })
                .collect(),
        )
    }

    fn run(code: &str, question: &str) -> Matched {
        let ds = orders();
        let resolver = ColumnResolver::new();
        let options = AnalysisOptions::default();
        let scope = Scope::new(&ds, code, question, &resolver, &options);
        dispatch(&scope).unwrap()
    }

    #[test]
    fn value_counts_wins_over_groupby() {
        let m = run("df.groupby('Region')\ndf['Segment'].value_counts()", "segments?");
        assert_eq!(m.rule, "value_counts");
        assert_eq!(m.result.kind(), ResultKind::ValueCounts);
    }

    #[test]
    fn dotted_value_counts_column() {
        let m = run("df.Region.value_counts()", "regions?");
        let AnalysisResult::ValueCounts(vc) = m.result else { panic!("expected value_counts") };
        assert_eq!(vc.column, "Region");
    }

    #[test]
    fn groupby_reconciles_column_case() {
        let m = run("df.groupby('region')['sales'].sum()", "sales by region");
        let AnalysisResult::GroupBy(g) = m.result else { panic!("expected groupby") };
        assert_eq!(g.group_column, "Region");
        assert_eq!(g.data[0]["Region"], Value::from("West"));
        assert_eq!(g.data[0]["SALES"], Value::Float64(350.0));
    }

    #[test]
    fn sort_values_descending() {
        let m = run("df.sort_values('Sales', ascending=False)", "top sales");
        let AnalysisResult::Sorted(s) = m.result else { panic!("expected sorted") };
        assert!(!s.ascending);
        assert_eq!(s.data[0]["Sales"], Value::Float64(250.0));
    }

    #[test]
    fn date_rule_counts_customers_since_year() {
        let m = run(
            "df['Order_Date'] = pd.to_datetime(df['Order_Date'])",
            "How many customers ordered since 2020?",
        );
        let AnalysisResult::Count(c) = m.result else { panic!("expected count") };
        assert_eq!(c.metric, CountMetric::UniqueCustomers);
        assert_eq!(c.value, 3);
        assert_eq!(c.filter.as_deref(), Some("since 2020"));
        assert_eq!(c.data[0]["metric"], Value::from("Members joined since 2020"));
    }

    #[test]
    fn date_rule_counts_rows_in_year() {
        let m = run("pd.to_datetime(df['Order_Date'])", "Orders in 2021");
        let AnalysisResult::Count(c) = m.result else { panic!("expected count") };
        assert_eq!(c.metric, CountMetric::TotalRecords);
        assert_eq!(c.value, 2);
        assert_eq!(c.data[0]["percentage"], Value::Int64(50));
    }

    #[test]
    fn date_rule_without_date_column_is_an_error() {
        let ds = DataSet::from_records(vec![Record::from([("Amount".to_string(), Value::Int64(1))])]);
        let resolver = ColumnResolver::new();
        let options = AnalysisOptions::default();
        let scope = Scope::new(&ds, "pd.to_datetime(x)", "since 2020", &resolver, &options);
        assert_eq!(dispatch(&scope), Err(AnalysisError::NoDateColumn));
    }

    #[test]
    fn filter_then_group_when_question_asks_by_region() {
        let m = run("high = df[df['Sales'] > 50]", "high sales by region");
        let AnalysisResult::GroupBy(g) = m.result else { panic!("expected groupby") };
        assert_eq!(g.group_column, "Region");
        assert_eq!(g.total_groups, 2);

        let m = run("high = df[df['Sales'] > 50]", "high sales");
        let AnalysisResult::Filtered(f) = m.result else { panic!("expected filtered") };
        assert_eq!((f.original_count, f.filtered_count), (4, 3));
    }

    #[test]
    fn count_rule_variants() {
        let m = run("len(df['Customer_ID'].unique())", "how many customers?");
        let AnalysisResult::Count(c) = m.result else { panic!("expected count") };
        assert_eq!((c.metric, c.value), (CountMetric::UniqueCustomers, 3));

        let m = run("len(df)", "number of orders");
        let AnalysisResult::Count(c) = m.result else { panic!("expected count") };
        assert_eq!((c.metric, c.value), (CountMetric::TotalOrders, 4));
    }

    #[test]
    fn extraction_guesses_grouping_from_question() {
        let m = run("SELECT Segment, SUM(Sales) FROM t GROUP BY Segment", "sales per segment");
        assert_eq!(m.rule, "extraction");
        let AnalysisResult::GroupBy(g) = m.result else { panic!("expected groupby") };
        assert_eq!(g.group_column, "Segment");
    }

    #[test]
    fn unrecognized_code_samples() {
        let m = run("print(df.head())", "show me data");
        assert_eq!(m.rule, "sample");
        let AnalysisResult::Sample(s) = m.result else { panic!("expected sample") };
        assert_eq!((s.total, s.data.len()), (4, 4));
    }

    #[test]
    fn forbidden_columns_stop_the_chain() {
        let ds = orders();
        let resolver = ColumnResolver::new();
        let options = AnalysisOptions::default();
        let scope = Scope::new(&ds, "df['PROFIT_MARGIN'].value_counts()", "q", &resolver, &options);
        assert!(matches!(dispatch(&scope), Err(AnalysisError::ForbiddenColumn { .. })));
    }
}
