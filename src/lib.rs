//! `tabular-insights` turns an LLM's answer to a data question into structured, presentable
//! results, without executing anything the LLM wrote.
//!
//! The LLM is shown a dataset and asked a question; it replies with prose and pandas-flavoured
//! code. This crate pattern-matches that code against an ordered rule chain, replays the
//! recognized operation (group-by, value counts, filtering, counting, sorting) against the real
//! in-memory [`types::DataSet`], and formats the outcome as a table plus a chart description.
//!
//! ## Pipeline
//!
//! - [`ingestion`]: load CSV / JSON / NDJSON into a [`types::DataSet`] with inferred types
//! - [`semantic`]: map logical concepts (`customer`, `ship_mode`, `date`, ...) to real columns
//! - [`analysis`]: code extraction, the rule chain, heuristics and the [`analysis::Analyzer`]
//! - [`processing`]: the aggregation engine the rules call into
//! - [`presentation`]: [`result::AnalysisResult`] to table + chart
//! - [`execution`]: many analyses in parallel over one shared resolver
//!
//! Every analysis entry point returns a value. Failures surface as
//! [`result::AnalysisResult::Error`]; only ingestion returns `Err`.
//!
//! ## Quick example
//!
//! ```rust
//! use tabular_insights::analysis::Analyzer;
//! use tabular_insights::ingestion::json::ingest_json_from_str;
//!
//! # fn main() -> Result<(), tabular_insights::IngestionError> {
//! let ds = ingest_json_from_str(
//!     r#"[{"Office":"A","NCC":100},{"Office":"A","NCC":50},{"Office":"B","NCC":30}]"#,
//! )?;
//!
//! let response = "Office A leads.\n```python\nresult = df.groupby('Office')['NCC'].sum()\n```";
//! let insight = Analyzer::default().analyze(&ds, "Which office has the most NCC?", response);
//!
//! assert_eq!(insight.table.title, "Top 2 Offices by NCC");
//! assert_eq!(insight.table.data[0]["Office"].to_string(), "A");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema + in-memory dataset types
//! - [`result`]: the tagged analysis result
//! - [`config`]: tunable limits and analysis options
//! - [`observability`]: severities and analysis observers
//! - [`error`]: error types

pub mod analysis;
pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod observability;
pub mod presentation;
pub mod processing;
pub mod result;
pub mod semantic;
pub mod types;

pub use analysis::{Analyzer, Insight};
pub use config::{AnalysisLimits, AnalysisOptions};
pub use error::{AnalysisError, IngestionError, IngestionResult};
pub use result::AnalysisResult;
