use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::result::ResultKind;

/// Events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { requests: usize },
    ThrottleWaited { duration: Duration },
    RequestStarted { index: usize },
    RequestFinished { index: usize, kind: ResultKind, elapsed: Duration },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Forwards execution events to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingExecutionObserver;

impl ExecutionObserver for TracingExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunFinished { elapsed, metrics } => {
                tracing::info!(elapsed = ?elapsed, %metrics, "batch analysis finished")
            }
            other => tracing::debug!(event = ?other, "batch analysis event"),
        }
    }
}

/// Real-time metrics for a batch run.
///
/// Counters reset at the start of every run; callers can snapshot them at any time.
#[derive(Default)]
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    requests_started: AtomicU64,
    requests_finished: AtomicU64,
    error_results: AtomicU64,
    throttle_wait_ns: AtomicU64,

    active_requests: AtomicUsize,
    max_active_requests: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.requests_started.store(0, Ordering::SeqCst);
        self.requests_finished.store(0, Ordering::SeqCst);
        self.error_results.store(0, Ordering::SeqCst);
        self.throttle_wait_ns.store(0, Ordering::SeqCst);
        self.active_requests.store(0, Ordering::SeqCst);
        self.max_active_requests.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns.store(saturating_nanos(elapsed), Ordering::SeqCst);
    }

    pub(crate) fn on_request_start(&self) {
        let _ = self.requests_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_requests.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.max_active_requests.fetch_max(now, Ordering::SeqCst);
    }

    pub(crate) fn on_request_end(&self, kind: ResultKind) {
        let _ = self.requests_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self.active_requests.fetch_sub(1, Ordering::SeqCst);
        if kind == ResultKind::Error {
            let _ = self.error_results.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub(crate) fn on_throttle_wait(&self, d: Duration) {
        let _ = self.throttle_wait_ns.fetch_add(saturating_nanos(d), Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            requests_started: self.requests_started.load(Ordering::SeqCst),
            requests_finished: self.requests_finished.load(Ordering::SeqCst),
            error_results: self.error_results.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::SeqCst)),
            max_active_requests: self.max_active_requests.load(Ordering::SeqCst),
        }
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u64::MAX as u128) as u64
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub requests_started: u64,
    pub requests_finished: u64,
    /// Requests whose result was [`crate::result::AnalysisResult::Error`].
    pub error_results: u64,
    pub throttle_wait: Duration,
    pub max_active_requests: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, requests={}/{}, errors={}, max_active_requests={}, throttle_wait={:?}, elapsed={:?}",
            self.run_id,
            self.requests_finished,
            self.requests_started,
            self.error_results,
            self.max_active_requests,
            self.throttle_wait,
            self.elapsed
        )
    }
}
