//! In-memory aggregation engine.
//!
//! The processing layer operates on [`crate::types::DataSet`] values and produces
//! [`crate::result::AnalysisResult`]s. Nothing here fails: unknown columns read as nulls and
//! are logged through `tracing`.
//!
//! Currently implemented:
//!
//! - [`group_by()`]: partition and aggregate (`sum`, `count`, `mean`)
//! - [`value_counts()`]: distinct-value frequencies with percentages
//! - [`sort()`]: numeric-aware stable ordering
//! - [`filter()`] / [`filter_by_source()`]: predicate and textual-condition filtering
//! - [`distinct_count()`] and [`CountSummary`]: scalar counts
//! - [`filter_by_year()`]: year filtering over loosely formatted dates
//!
//! ## Example: group and sum
//!
//! ```rust
//! use tabular_insights::processing::{group_by, AggOp, Aggregation};
//! use tabular_insights::result::AnalysisResult;
//! use tabular_insights::types::{DataSet, Record, Value};
//!
//! let ds = DataSet::from_records(vec![
//!     Record::from([("Office".to_string(), Value::from("A")), ("NCC".to_string(), Value::Int64(100))]),
//!     Record::from([("Office".to_string(), Value::from("A")), ("NCC".to_string(), Value::Int64(50))]),
//!     Record::from([("Office".to_string(), Value::from("B")), ("NCC".to_string(), Value::Int64(30))]),
//! ]);
//!
//! let result = group_by(&ds, "Office", &[Aggregation::new("NCC", AggOp::Sum)], 20);
//! let AnalysisResult::GroupBy(groups) = result else { unreachable!() };
//! assert_eq!(groups.data[0]["NCC"], Value::Float64(150.0));
//! assert_eq!(groups.data[0]["RECORD_COUNT"], Value::Int64(2));
//! ```

pub mod aggregate;
pub mod count;
pub mod filter;
pub mod group_by;
pub mod sort;
pub mod temporal;
pub mod value_counts;

pub use aggregate::{AggOp, Aggregation, RECORD_COUNT, RECORDS};
pub use count::{CountSummary, distinct_count};
pub use filter::{CompareOp, Condition, apply_conditions, filter, filter_by_source, parse_conditions};
pub use group_by::group_by;
pub use sort::{compare_values, sort, sort_rows};
pub use temporal::{YearFilter, YearOp, filter_by_year, parse_year};
pub use value_counts::value_counts;
