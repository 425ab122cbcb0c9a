//! End-to-end analyses over small literal datasets and the orders fixture.

use tabular_insights::analysis::Analyzer;
use tabular_insights::ingestion::csv::ingest_csv_from_path;
use tabular_insights::presentation::{self, Chart, ChartKind};
use tabular_insights::result::{AnalysisResult, CountMetric, ResultKind};
use tabular_insights::types::{DataSet, Record, Value};

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn orders() -> DataSet {
    ingest_csv_from_path("tests/fixtures/orders.csv").unwrap()
}

#[test]
fn scenario_a_groupby_sum_sorted_descending() {
    let ds = DataSet::from_records(vec![
        record(&[("Office", Value::from("A")), ("NCC", Value::Int64(100))]),
        record(&[("Office", Value::from("A")), ("NCC", Value::Int64(50))]),
        record(&[("Office", Value::from("B")), ("NCC", Value::Int64(30))]),
    ]);

    let out = Analyzer::default().execute(&ds, "NCC by office", "df.groupby('Office')['NCC'].sum()");
    let AnalysisResult::GroupBy(g) = out else { panic!("expected groupby, got {out:?}") };

    assert_eq!(g.group_column, "Office");
    assert_eq!(g.total_groups, 2);
    assert_eq!(
        g.data,
        vec![
            record(&[
                ("Office", Value::from("A")),
                ("NCC", Value::Float64(150.0)),
                ("RECORD_COUNT", Value::Int64(2)),
            ]),
            record(&[
                ("Office", Value::from("B")),
                ("NCC", Value::Float64(30.0)),
                ("RECORD_COUNT", Value::Int64(1)),
            ]),
        ]
    );
}

#[test]
fn scenario_b_value_counts_with_percentages() {
    let ds = DataSet::from_records(
        ["Air", "Air", "Ground"]
            .iter()
            .map(|m| record(&[("Ship_Mode", Value::from(*m))]))
            .collect(),
    );

    let out = Analyzer::default().execute(&ds, "shipping modes", "df['Ship_Mode'].value_counts()");
    let AnalysisResult::ValueCounts(vc) = out else { panic!("expected value_counts, got {out:?}") };

    assert_eq!(
        vc.data,
        vec![
            record(&[
                ("Ship_Mode", Value::from("Air")),
                ("count", Value::Int64(2)),
                ("percentage", Value::Float64(66.7)),
            ]),
            record(&[
                ("Ship_Mode", Value::from("Ground")),
                ("count", Value::Int64(1)),
                ("percentage", Value::Float64(33.3)),
            ]),
        ]
    );
}

#[test]
fn scenario_c_empty_dataset_is_an_error_result() {
    let out = Analyzer::default().execute(&DataSet::default(), "anything", "df.groupby('Office').sum()");
    assert_eq!(out.kind(), ResultKind::Error);
    assert_eq!(out.error_message(), Some("No valid data provided for analysis"));
}

#[test]
fn scenario_d_forbidden_column_names_allowed_columns() {
    let ds = orders();
    let out = Analyzer::default().execute(&ds, "margin by region", "df['PROFIT_MARGIN'] = df['Profit'] / df['Sales']");
    let message = out.error_message().unwrap();

    assert!(message.contains("forbidden calculated column 'PROFIT_MARGIN'"));
    assert!(message.contains("Order_ID, Order_Date, Customer_ID, Region"));

    let tiny = DataSet::from_records(vec![record(&[("x", Value::Int64(1))])]);
    let out = Analyzer::default().execute(&tiny, "q", "df.DISCOUNT_AMOUNT.sum()");
    assert!(out.error_message().unwrap().contains("Use only existing columns: x"));
}

#[test]
fn sales_by_region_on_fixture() {
    let ds = orders();
    let out = Analyzer::default().execute(
        &ds,
        "What are total sales by region?",
        "result = df.groupby('Region')['Sales'].sum().sort_values(ascending=False)",
    );
    let AnalysisResult::GroupBy(g) = out else { panic!("expected groupby, got {out:?}") };

    let regions: Vec<String> = g.data.iter().map(|r| r["Region"].to_string()).collect();
    assert_eq!(regions, vec!["West", "Central", "East", "South"]);
    assert_eq!(g.data[0]["SALES"], Value::Float64(1990.04));
    assert_eq!(g.data[3]["SALES"], Value::Float64(137.27));
    assert_eq!(g.data[0]["RECORD_COUNT"], Value::Int64(4));
}

#[test]
fn agg_dictionary_on_fixture() {
    let ds = orders();
    let code = "df.groupby('Segment').agg({'Sales': 'sum', \"Discount\": \"mean\"})";
    let out = Analyzer::default().execute(&ds, "sales and discount per segment", code);
    let AnalysisResult::GroupBy(g) = out else { panic!("expected groupby, got {out:?}") };

    let first = &g.data[0];
    assert_eq!(first["Segment"], Value::from("Consumer"));
    assert!(first.contains_key("SALES"));
    assert!(first.contains_key("AVG_DISCOUNT"));
    assert!(first.contains_key("RECORD_COUNT"));
}

#[test]
fn high_value_orders_grouped_by_region() {
    let ds = orders();
    let code = "big = df[df['Sales'] > 900]";

    let out = Analyzer::default().execute(&ds, "big orders by region", code);
    let AnalysisResult::GroupBy(g) = out else { panic!("expected groupby, got {out:?}") };
    assert_eq!(g.data[0]["Region"], Value::from("Central"));
    assert_eq!(g.data[0]["SALES"], Value::Float64(1864.73));
    assert_eq!(g.data[0]["RECORD_COUNT"], Value::Int64(2));

    let out = Analyzer::default().execute(&ds, "which orders were big?", code);
    let AnalysisResult::Filtered(f) = out else { panic!("expected filtered, got {out:?}") };
    assert_eq!((f.original_count, f.filtered_count), (12, 4));
    assert_eq!(f.data[0]["rank"], Value::Int64(1));
}

#[test]
fn customers_since_year_on_fixture() {
    let ds = orders();
    let out = Analyzer::default().execute(
        &ds,
        "How many customers have ordered since 2022?",
        "df['Order_Date'] = pd.to_datetime(df['Order_Date'])",
    );
    let AnalysisResult::Count(c) = out else { panic!("expected count, got {out:?}") };

    assert_eq!(c.metric, CountMetric::UniqueCustomers);
    assert_eq!(c.column.as_deref(), Some("Customer_ID"));
    assert_eq!(c.value, 4);
    assert_eq!(c.filter.as_deref(), Some("since 2022"));
    assert_eq!(c.data[0]["percentage"], Value::Int64(57));

    let out = Analyzer::default().execute(&ds, "How many orders in 2021?", "pd.to_datetime(df['Order_Date'])");
    let AnalysisResult::Count(c) = out else { panic!("expected count, got {out:?}") };
    assert_eq!((c.metric, c.value), (CountMetric::TotalRecords, 3));
    assert_eq!(c.data[0]["percentage"], Value::Int64(25));
}

#[test]
fn unique_customer_count_on_fixture() {
    let ds = orders();
    let out = Analyzer::default().execute(&ds, "How many unique customers?", "df['Customer_ID'].nunique()\nlen(df)");
    let AnalysisResult::Count(c) = out else { panic!("expected count, got {out:?}") };
    assert_eq!((c.metric, c.value), (CountMetric::UniqueCustomers, 7));
    assert_eq!(c.data[0]["total_records"], Value::Int64(12));
}

#[test]
fn sort_values_descending_on_fixture() {
    let ds = orders();
    let out = Analyzer::default().execute(&ds, "largest orders", "df.sort_values('Sales', ascending=False).head()");
    let AnalysisResult::Sorted(s) = out else { panic!("expected sorted, got {out:?}") };
    assert!(!s.ascending);
    assert_eq!(s.total, 12);
    assert_eq!(s.data[0]["Order_ID"], Value::from("CA-1011"));
}

#[test]
fn full_pipeline_formats_fixture_answer() {
    let ds = orders();
    let response = "\
Standard Class dominates shipping.

```python
modes = df['Ship_Mode'].value_counts()
print(modes)
```
";
    let insight = Analyzer::default().analyze(&ds, "How do orders ship?", response);

    assert_eq!(insight.result.as_ref().map(AnalysisResult::kind), Some(ResultKind::ValueCounts));
    assert_eq!(insight.table.title, "Ship Mode Distribution");
    assert_eq!(insight.table.columns, vec!["Rank", "Ship Mode", "Count", "Percentage"]);
    assert_eq!(insight.table.data[0]["Percentage"], Value::from("50%"));
    assert_eq!(insight.chart.kind(), ChartKind::BarChart);
    let Chart::BarChart { data, .. } = &insight.chart else { unreachable!() };
    assert_eq!(data.len(), 4);
    assert_eq!(data[0].label, Value::from("Standard Class"));
    assert_eq!(data[0].formatted_value, "6 (50%)");
}

#[test]
fn pipeline_without_code_summarizes_and_suggests() {
    let ds = orders();
    let response = "I cannot determine profitability trends; that data is not available.";
    let insight = Analyzer::default().analyze(&ds, "Why did profit fall?", response);

    assert!(insight.code.is_none());
    assert!(insight.result.is_none());
    assert_eq!(insight.table.title, "Analysis Summary");
    assert_eq!(insight.table.data[0]["Value"], Value::from("12"));
    assert_eq!(insight.chart.title(), "Data Overview");
    assert!(!insight.follow_ups.is_empty());
    assert!(insight.follow_ups.len() <= 4);
}

#[test]
fn error_results_still_format() {
    let ds = orders();
    let out = Analyzer::default().execute(&ds, "margin", "df['PROFIT_MARGIN']");
    let p = presentation::format(Some(&out), "margin");
    assert_eq!(p.table.title, "Analysis Error");
    assert_eq!(p.chart.kind(), ChartKind::NoData);
}
