//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which ingests a file into an in-memory
//! [`crate::types::DataSet`], inferring both the format (from the extension, unless
//! [`IngestionOptions::format`] overrides it) and the schema (from the data).

use std::path::{Path, PathBuf};

use crate::error::{IngestionError, IngestionResult};
use crate::observability::Severity;
use crate::types::DataSet;

use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array-of-objects, single object, or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
#[derive(Debug, Clone, Copy)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Failures at or above this severity are logged at `error` level instead of `warn`.
    pub alert_at_or_above: Severity,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

/// Unified ingestion entry point for path-based sources.
///
/// # Examples
///
/// ```no_run
/// use tabular_insights::ingestion::{ingest_from_path, IngestionFormat, IngestionOptions};
///
/// # fn main() -> Result<(), tabular_insights::IngestionError> {
/// // Uses `.csv` to select CSV ingestion.
/// let ds = ingest_from_path("orders.csv", &IngestionOptions::default())?;
/// println!("rows={} columns={:?}", ds.row_count(), ds.column_names());
///
/// // Force a format for files without a useful extension.
/// let opts = IngestionOptions {
///     format: Some(IngestionFormat::Json),
///     ..Default::default()
/// };
/// let events = ingest_from_path("events.log", &opts)?;
/// println!("rows={}", events.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let result = infer_or(options.format, path).and_then(|fmt| match fmt {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path),
        IngestionFormat::Json => json::ingest_json_from_path(path),
    });

    match &result {
        Ok(ds) => tracing::debug!(
            path = %path.display(),
            rows = ds.row_count(),
            columns = ds.schema.fields.len(),
            "ingested dataset"
        ),
        Err(e) => {
            let sev = severity_for_error(e);
            if sev >= options.alert_at_or_above {
                tracing::error!(path = %path.display(), severity = ?sev, error = %e, "ingestion failed");
            } else {
                tracing::warn!(path = %path.display(), severity = ?sev, error = %e, "ingestion failed");
            }
        }
    }

    result
}

fn infer_or(format: Option<IngestionFormat>, path: &Path) -> IngestionResult<IngestionFormat> {
    match format {
        Some(f) => Ok(f),
        None => infer_format_from_path(path),
    }
}

/// I/O failures are `Critical`; malformed content is an `Error`.
pub fn severity_for_error(e: &IngestionError) -> Severity {
    match e {
        IngestionError::Io(_) => Severity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        IngestionError::Json(err) if err.is_io() => Severity::Critical,
        IngestionError::Json(_) | IngestionError::SchemaMismatch { .. } => Severity::Error,
    }
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("cannot infer format: path has no extension ({})", path.display()),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!("cannot infer format from extension '{ext}' for path ({})", path.display()),
    })
}

/// Owned ingestion request, convenient for queueing loads before a batch run.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl IngestionRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: IngestionOptions::default(),
        }
    }

    /// Execute the request by calling [`ingest_from_path`].
    pub fn run(&self) -> IngestionResult<DataSet> {
        ingest_from_path(&self.path, &self.options)
    }
}
