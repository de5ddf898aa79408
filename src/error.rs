//! Unified error types for twostate-score.
//!
//! Two layers live here. [`TwoStateError`] covers structural failures that
//! abort a run, such as unreadable input or a missing reference set.
//! [`RecordError`] covers per-record problems that are dropped and reported as
//! diagnostics without ever aborting a run.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::model::ReferenceState;

/// Main error type for twostate-score operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TwoStateError {
    /// Errors while reading score tables or lookup files
    #[error("Failed to ingest scores: {context}")]
    Ingest {
        context: String,
        #[source]
        source: IngestErrorKind,
    },

    /// Structural errors that stop a reconciliation run
    #[error("Reconciliation failed: {context}")]
    Reconcile {
        context: String,
        #[source]
        source: ReconcileErrorKind,
    },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Specific ingestion error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IngestErrorKind {
    #[error("Missing required column '{column}' (found: {available})")]
    MissingColumn { column: String, available: String },

    #[error("CSV error: {0}")]
    Csv(String),
}

/// Specific reconciliation error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReconcileErrorKind {
    #[error("record set for reference state {state} is required in {mode} mode")]
    MissingReferenceSet { state: ReferenceState, mode: String },

    #[error("record set labelled {found} was supplied as reference state {expected}")]
    MislabelledReferenceSet {
        expected: ReferenceState,
        found: ReferenceState,
    },
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("Serialization failed: {0}")]
    SerializationError(String),

    #[error("Writing output failed: {0}")]
    WriteFailed(String),

    #[error("Output format not supported for this operation: {0}")]
    UnsupportedFormat(String),
}

/// A problem with a single input record.
///
/// Record errors never abort a run: the record is excluded before any
/// reduction and the error is kept as a diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordError {
    #[error("group label '{label}' contains no digits")]
    MalformedGroupLabel { label: String },

    #[error("invalid score record for group '{group}' model {model_number}: {reason}")]
    InvalidScoreRecord {
        group: String,
        model_number: String,
        reason: String,
    },
}

impl RecordError {
    /// Build an `InvalidScoreRecord` from display-ready parts.
    pub fn invalid_score(
        group: impl Into<String>,
        model_number: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidScoreRecord {
            group: group.into(),
            model_number: model_number.to_string(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for twostate-score operations
pub type Result<T> = std::result::Result<T, TwoStateError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl TwoStateError {
    /// Create an ingest error with context
    pub fn ingest(context: impl Into<String>, source: IngestErrorKind) -> Self {
        Self::Ingest {
            context: context.into(),
            source,
        }
    }

    /// Create an ingest error for a missing column
    pub fn missing_column(
        path: impl Into<String>,
        column: impl Into<String>,
        available: &[String],
    ) -> Self {
        Self::ingest(
            format!("reading {}", path.into()),
            IngestErrorKind::MissingColumn {
                column: column.into(),
                available: available.join(", "),
            },
        )
    }

    /// Create a reconcile error with context
    pub fn reconcile(context: impl Into<String>, source: ReconcileErrorKind) -> Self {
        Self::Reconcile {
            context: context.into(),
            source,
        }
    }

    /// Create a reconcile error for a missing reference set
    pub fn missing_reference_set(state: ReferenceState, mode: impl Into<String>) -> Self {
        Self::reconcile(
            "checking run inputs",
            ReconcileErrorKind::MissingReferenceSet {
                state,
                mode: mode.into(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for TwoStateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<csv::Error> for TwoStateError {
    fn from(err: csv::Error) -> Self {
        Self::ingest("CSV decoding", IngestErrorKind::Csv(err.to_string()))
    }
}

impl From<serde_json::Error> for TwoStateError {
    fn from(err: serde_json::Error) -> Self {
        Self::report(
            "JSON serialization",
            ReportErrorKind::SerializationError(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain outward, so an error raised deep in the loader
/// reads like `"loading T1228 GDT_TS: reading T1228_v1_GDT_TS_scores.csv: ..."`.
///
/// # Example
///
/// ```ignore
/// use twostate_score::error::ErrorContext;
///
/// fn load(path: &Path) -> Result<LoadedRecords> {
///     load_record_set(path, ReferenceState::A, "GDT_TS", &columns)
///         .with_context(|| format!("loading {}", path.display()))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    ///
    /// The context string is prepended to the error's existing context.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<TwoStateError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: TwoStateError, new_ctx: &str) -> TwoStateError {
    match err {
        TwoStateError::Ingest {
            context: existing,
            source,
        } => TwoStateError::Ingest {
            context: chain_context(new_ctx, &existing),
            source,
        },
        TwoStateError::Reconcile {
            context: existing,
            source,
        } => TwoStateError::Reconcile {
            context: chain_context(new_ctx, &existing),
            source,
        },
        TwoStateError::Report {
            context: existing,
            source,
        } => TwoStateError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        TwoStateError::Io {
            path,
            message,
            source,
        } => TwoStateError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
