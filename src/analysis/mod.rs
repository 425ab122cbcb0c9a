//! Heuristic result synthesis.
//!
//! An LLM answers a data question with prose and some pandas-looking code. Nothing here runs
//! that code. Instead, [`Analyzer`] pattern-matches it through an ordered rule chain
//! ([`intent::RULES`]) and replays the recognized operation against the real dataset with
//! [`crate::processing`].
//!
//! Every public entry point returns a value: structured failures and even panics inside a rule
//! come back as [`AnalysisResult::Error`].
//!
//! ## Example
//!
//! ```rust
//! use tabular_insights::analysis::Analyzer;
//! use tabular_insights::result::AnalysisResult;
//! use tabular_insights::types::{DataSet, Record, Value};
//!
//! let ds = DataSet::from_records(vec![
//!     Record::from([("Ship_Mode".to_string(), Value::from("Air"))]),
//!     Record::from([("Ship_Mode".to_string(), Value::from("Air"))]),
//!     Record::from([("Ship_Mode".to_string(), Value::from("Ground"))]),
//! ]);
//!
//! let analyzer = Analyzer::default();
//! let result = analyzer.execute(&ds, "How do orders ship?", "df['Ship_Mode'].value_counts()");
//! let AnalysisResult::ValueCounts(counts) = result else { unreachable!() };
//! assert_eq!(counts.data[0]["count"], Value::Int64(2));
//! ```

pub mod aggregations;
pub mod boundary;
pub mod code;
pub mod guard;
pub mod heuristics;
pub mod intent;
pub mod profile;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::AnalysisOptions;
use crate::error::{AnalysisError, AnalysisOutcome};
use crate::observability::{AnalysisContext, AnalysisStats};
use crate::presentation::{self, Chart, PresentationTable};
use crate::result::AnalysisResult;
use crate::semantic::{ColumnResolver, default_mappings};
use crate::types::DataSet;

pub use aggregations::extract_aggregations;
pub use boundary::with_panic_boundary;
pub use code::{ExtractedCode, extract_code};
pub use intent::{Matched, RULES, Rule, Scope, dispatch};
pub use profile::{ColumnKind, DatasetProfile, FollowUp, suggest_follow_ups};

/// Everything produced for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    /// Code found in the LLM response, if any.
    pub code: Option<ExtractedCode>,
    /// `None` when the response had no fenced code to analyze.
    pub result: Option<AnalysisResult>,
    pub table: PresentationTable,
    pub chart: Chart,
    pub follow_ups: Vec<FollowUp>,
}

/// Runs the rule chain with a shared [`ColumnResolver`].
///
/// Construct once and share; the resolver cache is the only mutable state.
pub struct Analyzer {
    resolver: Arc<ColumnResolver>,
    options: AnalysisOptions,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("resolver_cache", &self.resolver.cache_stats())
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

impl Analyzer {
    /// Analyzer with a fresh resolver sized by `options.limits.resolver_cache_limit`.
    pub fn new(options: AnalysisOptions) -> Self {
        let resolver = ColumnResolver::with_mappings(default_mappings(), options.limits.resolver_cache_limit);
        Self::with_resolver(Arc::new(resolver), options)
    }

    pub fn with_resolver(resolver: Arc<ColumnResolver>, options: AnalysisOptions) -> Self {
        Self { resolver, options }
    }

    pub fn resolver(&self) -> &Arc<ColumnResolver> {
        &self.resolver
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Match `code` against the rule chain and run it on `dataset`.
    ///
    /// When an observer is configured, this reports:
    ///
    /// - `on_success` with the result kind, matching rule and row count
    /// - `on_failure` for error results, with the error's severity
    /// - `on_alert` when that severity is >= `options.alert_at_or_above`
    pub fn execute(&self, dataset: &DataSet, question: &str, code: &str) -> AnalysisResult {
        let ctx = AnalysisContext {
            question: question.to_string(),
            rows: dataset.row_count(),
            columns: dataset.schema.fields.len(),
        };
        let outcome = with_panic_boundary(|| self.try_execute(dataset, question, code));

        match outcome {
            Ok(matched) => {
                if let Some(obs) = self.options.observer.as_ref() {
                    obs.on_success(
                        &ctx,
                        AnalysisStats {
                            kind: matched.result.kind(),
                            rule: matched.rule,
                            rows: matched.result.data().len(),
                        },
                    );
                }
                matched.result
            }
            Err(e) => {
                let sev = e.severity();
                tracing::warn!(error = %e, severity = ?sev, "analysis failed");
                if let Some(obs) = self.options.observer.as_ref() {
                    obs.on_failure(&ctx, sev, &e);
                    if sev >= self.options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, &e);
                    }
                }
                e.into()
            }
        }
    }

    fn try_execute(&self, dataset: &DataSet, question: &str, code: &str) -> AnalysisOutcome<Matched> {
        if dataset.is_empty() {
            return Err(AnalysisError::NoData);
        }
        if code.trim().is_empty() {
            return Err(AnalysisError::MissingCode);
        }
        if question.trim().is_empty() {
            return Err(AnalysisError::InvalidQuestion);
        }
        let scope = Scope::new(dataset, code, question, &self.resolver, &self.options);
        dispatch(&scope)
    }

    /// Full pipeline: extract code from `llm_response`, execute it, and format the outcome.
    ///
    /// Responses without fenced code get the dataset summary table and overview chart.
    pub fn analyze(&self, dataset: &DataSet, question: &str, llm_response: &str) -> Insight {
        let limits = &self.options.limits;
        let code = extract_code(llm_response);
        let profile = DatasetProfile::of(dataset, limits);

        let result = code
            .as_ref()
            .filter(|c| c.executable)
            .map(|c| self.execute(dataset, question, &c.code));

        let (table, chart) = match &result {
            Some(result) => {
                let p = presentation::format_with(Some(result), question, limits);
                (p.table, p.chart)
            }
            None => (
                presentation::summary_table(&profile, "Analysis Summary"),
                presentation::basic_visualization(&profile, "Data Overview"),
            ),
        };

        Insight {
            follow_ups: suggest_follow_ups(&profile, llm_response, limits),
            code,
            result,
            table,
            chart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::observability::{AnalysisObserver, Severity};
    use crate::result::ResultKind;
    use crate::types::{Record, Value};

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl AnalysisObserver for Recording {
        fn on_success(&self, _ctx: &AnalysisContext, stats: AnalysisStats) {
            self.events.lock().unwrap().push(format!("ok:{}:{}", stats.rule, stats.rows));
        }

        fn on_failure(&self, _ctx: &AnalysisContext, severity: Severity, _error: &AnalysisError) {
            self.events.lock().unwrap().push(format!("fail:{severity:?}"));
        }

        fn on_alert(&self, _ctx: &AnalysisContext, severity: Severity, _error: &AnalysisError) {
            self.events.lock().unwrap().push(format!("alert:{severity:?}"));
        }
    }

    fn offices() -> DataSet {
        DataSet::from_records(vec![
            Record::from([("Office".to_string(), Value::from("A")), ("NCC".to_string(), Value::Int64(100))]),
            Record::from([("Office".to_string(), Value::from("A")), ("NCC".to_string(), Value::Int64(50))]),
            Record::from([("Office".to_string(), Value::from("B")), ("NCC".to_string(), Value::Int64(30))]),
        ])
    }

    #[test]
    fn validation_errors_come_back_as_results() {
        let analyzer = Analyzer::default();
        let empty = analyzer.execute(&DataSet::default(), "q", "df.head()");
        assert_eq!(empty.error_message(), Some("No valid data provided for analysis"));
        let no_code = analyzer.execute(&offices(), "q", "   ");
        assert_eq!(no_code.error_message(), Some("No Python code provided for analysis"));
        let no_question = analyzer.execute(&offices(), "", "df.head()");
        assert_eq!(no_question.error_message(), Some("Invalid analysis context provided"));
    }

    #[test]
    fn observer_sees_successes_and_alerts() {
        let recording = Arc::new(Recording::default());
        let analyzer = Analyzer::new(AnalysisOptions {
            observer: Some(recording.clone()),
            alert_at_or_above: Severity::Error,
            ..Default::default()
        });
        analyzer.execute(&offices(), "ncc by office", "df.groupby('Office')['NCC'].sum()");
        analyzer.execute(&offices(), "margin", "df['PROFIT_MARGIN']");
        analyzer.execute(&DataSet::default(), "q", "x");
        let events = recording.events.lock().unwrap().clone();
        assert_eq!(events, vec!["ok:groupby:2", "fail:Error", "alert:Error", "fail:Warning"]);
    }

    #[test]
    fn analyze_formats_fenced_code() {
        let analyzer = Analyzer::default();
        let response = "Office A leads.\n```python\nresult = df.groupby('Office')['NCC'].sum()\n```";
        let insight = analyzer.analyze(&offices(), "Which office has the most NCC?", response);
        assert!(insight.code.as_ref().is_some_and(|c| c.executable));
        assert_eq!(insight.result.as_ref().map(AnalysisResult::kind), Some(ResultKind::GroupBy));
        assert_eq!(insight.table.title, "Top 2 Offices by NCC");
    }

    #[test]
    fn analyze_without_fenced_code_summarizes_dataset() {
        let analyzer = Analyzer::default();
        let insight = analyzer.analyze(&offices(), "Which office?", "Try df.groupby('Office') yourself.");
        assert!(insight.code.as_ref().is_some_and(|c| !c.executable));
        assert!(insight.result.is_none());
        assert_eq!(insight.table.title, "Analysis Summary");
        assert_eq!(insight.chart.title(), "Data Overview");
    }
}
