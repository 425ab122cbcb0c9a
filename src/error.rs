use thiserror::Error;

use crate::observability::Severity;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion functions.
///
/// Shared across JSON and CSV loading.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON ingestion error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have a usable tabular shape.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },
}

/// Internal result type for analysis steps; converted to a result value at the public boundary.
pub(crate) type AnalysisOutcome<T> = Result<T, AnalysisError>;

/// Failure raised while synthesizing an analysis result.
///
/// These never escape the public analysis entry points: they are converted into
/// [`crate::result::AnalysisResult::Error`] values carrying the display message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The dataset is empty.
    #[error("No valid data provided for analysis")]
    NoData,

    /// The code text is empty.
    #[error("No Python code provided for analysis")]
    MissingCode,

    /// The question text is blank.
    #[error("Invalid analysis context provided")]
    InvalidQuestion,

    /// The code references a synthetic column that is never present in source data.
    #[error("Code contains forbidden calculated column '{column}'. Use only existing columns: {}", allowed.join(", "))]
    ForbiddenColumn { column: String, allowed: Vec<String> },

    /// A temporal question was asked of a dataset without date-like columns.
    #[error("No date columns found in the data for temporal analysis")]
    NoDateColumn,

    /// Anything unexpected inside a rule handler.
    #[error("Code execution failed: {message}")]
    Internal { message: String },
}

impl AnalysisError {
    /// Severity used for observer callbacks and alert thresholds.
    pub fn severity(&self) -> Severity {
        match self {
            AnalysisError::NoData
            | AnalysisError::MissingCode
            | AnalysisError::InvalidQuestion
            | AnalysisError::NoDateColumn => Severity::Warning,
            AnalysisError::ForbiddenColumn { .. } => Severity::Error,
            AnalysisError::Internal { .. } => Severity::Critical,
        }
    }
}
