//! Batch analysis with configurable parallelism.
//!
//! This module sits "above" [`crate::analysis`] and provides:
//!
//! - Parallel execution of many [`AnalysisRequest`]s on a dedicated `rayon` pool
//! - A bound on concurrently running analyses (on top of the thread count)
//! - Real-time metrics + observer hooks for monitoring
//!
//! All requests share one [`Analyzer`], and therefore one column-resolver cache. Results come
//! back in request order.

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::ThreadPool;
use rayon::ThreadPoolBuildError;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::analysis::Analyzer;
use crate::config::{AnalysisLimits, AnalysisOptions};
use crate::result::AnalysisResult;
use crate::types::DataSet;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, TracingExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`BatchAnalyzer`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Upper bound on concurrently running analyses (values below 1 act as 1).
    pub max_in_flight: usize,
    /// Limits handed to the shared [`Analyzer`].
    pub limits: AnalysisLimits,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            max_in_flight: n,
            limits: AnalysisLimits::default(),
        }
    }
}

/// One question to answer against one dataset.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub dataset: Arc<DataSet>,
    pub question: String,
    /// Pseudo-code to match against the rule chain.
    pub code: String,
}

impl AnalysisRequest {
    pub fn new(dataset: Arc<DataSet>, question: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            dataset,
            question: question.into(),
            code: code.into(),
        }
    }
}

/// Runs many analyses in parallel over a shared [`Analyzer`].
pub struct BatchAnalyzer {
    pool: ThreadPool,
    opts: ExecutionOptions,
    analyzer: Arc<Analyzer>,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl BatchAnalyzer {
    /// Create a batch analyzer with a fresh [`Analyzer`] built from `opts.limits`.
    pub fn new(opts: ExecutionOptions) -> Result<Self, ThreadPoolBuildError> {
        let analyzer = Analyzer::new(AnalysisOptions {
            limits: opts.limits.clone(),
            ..Default::default()
        });
        Self::with_analyzer(Arc::new(analyzer), opts)
    }

    /// Create a batch analyzer around an existing (possibly shared) [`Analyzer`].
    ///
    /// `opts.limits` is ignored in favor of the analyzer's own options.
    pub fn with_analyzer(analyzer: Arc<Analyzer>, opts: ExecutionOptions) -> Result<Self, ThreadPoolBuildError> {
        let n_threads = opts.num_threads.unwrap_or_else(available_threads).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("tabular-insights-{i}"))
            .build()?;

        Ok(Self {
            pool,
            opts,
            analyzer,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn analyzer(&self) -> &Arc<Analyzer> {
        &self.analyzer
    }

    /// Execute every request; `out[i]` answers `requests[i]`.
    pub fn run(&self, requests: &[AnalysisRequest]) -> Vec<AnalysisResult> {
        self.pool.install(|| self.run_impl(requests))
    }

    fn run_impl(&self, requests: &[AnalysisRequest]) -> Vec<AnalysisResult> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            requests: requests.len(),
        });

        let sem = Semaphore::new(self.opts.max_in_flight);
        let results: Vec<AnalysisResult> = requests
            .par_iter()
            .enumerate()
            .map(|(index, req)| {
                let waited = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.on_request_start();
                self.emit(ExecutionEvent::RequestStarted { index });

                let began = Instant::now();
                let result = self.analyzer.execute(&req.dataset, &req.question, &req.code);
                let kind = result.kind();

                self.metrics.on_request_end(kind);
                self.emit(ExecutionEvent::RequestFinished {
                    index,
                    kind,
                    elapsed: began.elapsed(),
                });
                sem.release();
                result
            })
            .collect();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        results
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
