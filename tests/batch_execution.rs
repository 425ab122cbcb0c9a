use std::sync::Arc;

use tabular_insights::execution::{AnalysisRequest, BatchAnalyzer, ExecutionOptions, TracingExecutionObserver};
use tabular_insights::ingestion::csv::ingest_csv_from_path;
use tabular_insights::result::{AnalysisResult, ResultKind};
use tabular_insights::types::{DataSet, Value};

fn orders() -> Arc<DataSet> {
    Arc::new(ingest_csv_from_path("tests/fixtures/orders.csv").unwrap())
}

#[test]
fn batch_over_fixture_matches_single_execution() {
    let ds = orders();
    let requests = vec![
        AnalysisRequest::new(ds.clone(), "sales by region", "df.groupby('Region')['Sales'].sum()"),
        AnalysisRequest::new(ds.clone(), "ship modes", "df['Ship_Mode'].value_counts()"),
        AnalysisRequest::new(ds.clone(), "How many orders in 2021?", "pd.to_datetime(df['Order_Date'])"),
        AnalysisRequest::new(ds.clone(), "margin", "df['PROFIT_MARGIN']"),
        AnalysisRequest::new(ds.clone(), "show me", "df.head()"),
    ];

    let batch = BatchAnalyzer::new(ExecutionOptions {
        num_threads: Some(3),
        max_in_flight: 2,
        ..Default::default()
    })
    .unwrap()
    .with_observer(Arc::new(TracingExecutionObserver));
    let results = batch.run(&requests);

    let kinds: Vec<ResultKind> = results.iter().map(AnalysisResult::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ResultKind::GroupBy,
            ResultKind::ValueCounts,
            ResultKind::Count,
            ResultKind::Error,
            ResultKind::Sample,
        ]
    );
    for (req, got) in requests.iter().zip(&results) {
        let single = batch.analyzer().execute(&req.dataset, &req.question, &req.code);
        assert_eq!(&single, got, "{}", req.code);
    }
    let AnalysisResult::GroupBy(g) = &results[0] else { unreachable!() };
    assert_eq!(g.data[0]["SALES"], Value::Float64(1990.04));

    let snap = batch.metrics().snapshot();
    assert_eq!((snap.requests_started, snap.requests_finished, snap.error_results), (5, 5, 1));
    assert!(snap.max_active_requests <= 2);
    assert!(snap.elapsed.is_some());
}

#[test]
fn consecutive_runs_bump_run_id() {
    let ds = orders();
    let batch = BatchAnalyzer::new(ExecutionOptions {
        num_threads: Some(2),
        max_in_flight: 2,
        ..Default::default()
    })
    .unwrap();
    let requests = vec![AnalysisRequest::new(ds, "ship modes", "df['Ship_Mode'].value_counts()")];

    batch.run(&requests);
    batch.run(&requests);
    assert_eq!(batch.metrics().snapshot().run_id, 2);
}

#[cfg(feature = "deep_tests")]
#[test]
fn large_batch_is_deterministic() {
    use tabular_insights::types::Record;

    let records = (0..200_000)
        .map(|i| {
            Record::from([
                ("Region".to_string(), Value::from(["West", "East", "Central", "South"][i % 4])),
                ("Customer_ID".to_string(), Value::from(format!("C-{}", i % 5003))),
                ("Sales".to_string(), Value::Int64((i % 100) as i64)),
            ])
        })
        .collect();
    let ds = Arc::new(DataSet::from_records(records));
    let requests: Vec<_> = (0..64)
        .map(|i| match i % 2 {
            0 => AnalysisRequest::new(ds.clone(), "sales by region", "df.groupby('Region')['Sales'].sum()"),
            _ => AnalysisRequest::new(ds.clone(), "how many customers", "df['Customer_ID'].nunique()\nlen(df)"),
        })
        .collect();

    let batch = BatchAnalyzer::new(ExecutionOptions::default()).unwrap();
    let first = batch.run(&requests);
    let second = batch.run(&requests);
    assert_eq!(first, second);

    let AnalysisResult::Count(c) = &first[1] else { panic!("expected count, got {:?}", first[1]) };
    assert_eq!(c.value, 5003);
}
