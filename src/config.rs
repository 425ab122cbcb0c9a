//! Tunable limits and analysis options.
//!
//! The heuristic thresholds used by the intent parser and the formatter were tuned against
//! sample datasets; they live here instead of being hard-coded so deployments can adjust them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::observability::{AnalysisObserver, Severity};

/// Size caps and heuristic thresholds.
///
/// Deserializes from JSON with every field optional:
///
/// ```rust
/// use tabular_insights::config::AnalysisLimits;
///
/// let limits = AnalysisLimits::from_json(r#"{"sample_rows": 5}"#).unwrap();
/// assert_eq!(limits.sample_rows, 5);
/// assert_eq!(limits.max_group_rows, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisLimits {
    /// Maximum rows kept in a group-by result.
    pub max_group_rows: usize,
    /// Maximum rows kept in filtered and sorted results.
    pub max_filtered_rows: usize,
    /// Rows returned by the terminal sample fallback.
    pub sample_rows: usize,
    /// Points rendered in a bar chart.
    pub chart_points: usize,
    /// A column with fewer distinct values than this counts as categorical.
    pub categorical_max_unique: usize,
    /// Profiling: distinct values must also stay at or under this share of the row count.
    pub categorical_ratio: f64,
    /// Rows inspected when profiling column types.
    pub profile_sample_rows: usize,
    /// Resolver cache entries kept before pruning.
    pub resolver_cache_limit: usize,
    /// Maximum follow-up questions suggested.
    pub max_follow_ups: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_group_rows: 20,
            max_filtered_rows: 20,
            sample_rows: 10,
            chart_points: 8,
            categorical_max_unique: 20,
            categorical_ratio: 0.5,
            profile_sample_rows: 100,
            resolver_cache_limit: 100,
            max_follow_ups: 4,
        }
    }
}

impl AnalysisLimits {
    /// Parse limits from a JSON object; missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

/// Synthetic column names an LLM tends to invent; code referencing them is rejected.
pub const DEFAULT_FORBIDDEN_COLUMNS: &[&str] = &["DISCOUNT_AMOUNT", "PROFIT_MARGIN"];

/// Options controlling analysis behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct AnalysisOptions {
    /// Size caps and heuristic thresholds.
    pub limits: AnalysisLimits,
    /// Column names whose mere mention in code yields an error result.
    pub forbidden_columns: Vec<String>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn AnalysisObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for AnalysisOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisOptions")
            .field("limits", &self.limits)
            .field("forbidden_columns", &self.forbidden_columns)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            limits: AnalysisLimits::default(),
            forbidden_columns: DEFAULT_FORBIDDEN_COLUMNS.iter().map(|s| s.to_string()).collect(),
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}
