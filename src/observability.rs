//! Observer hooks for analysis outcomes.
//!
//! Soft warnings go through `tracing`; finished analyses (successes and structured failures)
//! are reported to an [`AnalysisObserver`] configured on
//! [`crate::config::AnalysisOptions`].

use std::fmt;
use std::sync::Arc;

use crate::error::AnalysisError;
use crate::result::ResultKind;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (analysis produced an error result).
    Error,
    /// Critical error (unexpected failure inside a rule handler).
    Critical,
}

/// Context about an analysis attempt.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// The user question the analysis answers.
    pub question: String,
    /// Rows in the input dataset.
    pub rows: usize,
    /// Columns in the input dataset.
    pub columns: usize,
}

/// Stats reported on a successful analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Kind of result produced.
    pub kind: ResultKind,
    /// Name of the rule that produced it.
    pub rule: &'static str,
    /// Number of rows in the result's `data`.
    pub rows: usize,
}

/// Observer interface for analysis outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait AnalysisObserver: Send + Sync {
    /// Called when analysis produced a non-error result.
    fn on_success(&self, _ctx: &AnalysisContext, _stats: AnalysisStats) {}

    /// Called when analysis produced an error result.
    fn on_failure(&self, _ctx: &AnalysisContext, _severity: Severity, _error: &AnalysisError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &AnalysisContext, severity: Severity, error: &AnalysisError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn AnalysisObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn AnalysisObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl AnalysisObserver for CompositeObserver {
    fn on_success(&self, ctx: &AnalysisContext, stats: AnalysisStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &AnalysisContext, severity: Severity, error: &AnalysisError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &AnalysisContext, severity: Severity, error: &AnalysisError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs analysis outcomes to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl AnalysisObserver for StdErrObserver {
    fn on_success(&self, ctx: &AnalysisContext, stats: AnalysisStats) {
        eprintln!(
            "[analysis][ok] kind={} rule={} rows={} input_rows={} question={:?}",
            stats.kind.as_str(),
            stats.rule,
            stats.rows,
            ctx.rows,
            ctx.question
        );
    }

    fn on_failure(&self, ctx: &AnalysisContext, severity: Severity, error: &AnalysisError) {
        eprintln!(
            "[analysis][{:?}] input_rows={} question={:?} err={}",
            severity, ctx.rows, ctx.question, error
        );
    }

    fn on_alert(&self, ctx: &AnalysisContext, severity: Severity, error: &AnalysisError) {
        eprintln!(
            "[ALERT][analysis][{:?}] input_rows={} question={:?} err={}",
            severity, ctx.rows, ctx.question, error
        );
    }
}
