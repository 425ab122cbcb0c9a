//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - infers column types cell by cell and builds an in-memory [`crate::types::DataSet`]
//! - logs failures through `tracing` with a [`crate::observability::Severity`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod json;
pub mod unified;

pub use unified::{IngestionFormat, IngestionOptions, IngestionRequest, ingest_from_path, severity_for_error};
