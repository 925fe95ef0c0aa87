//! Error types for the Massedit import engine.
//!
//! This module defines a hierarchy of error types following best practices:
//!
//! - [`SchemaError`] - header schema errors, fatal for the whole job
//! - [`RowError`] - row-local errors, captured at the row boundary
//! - [`ImportError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Row-local errors never
//! propagate past a single row: the pipeline converts them into the
//! report's `error_message` column.

use thiserror::Error;

// =============================================================================
// Schema Errors (fatal)
// =============================================================================

/// Errors while parsing the header line.
///
/// A schema error aborts the entire job before any row is processed.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Header line is empty or blank.
    #[error("Header line is empty")]
    EmptyHeader,

    /// A mandatory column is missing from the header.
    #[error("Header is missing required column '{0}'")]
    MissingColumn(&'static str),
}

// =============================================================================
// Row Errors (row-local)
// =============================================================================

/// Errors scoped to a single input row.
///
/// Every variant is caught at the row boundary and recorded in that row's
/// output line; it never aborts sibling rows or the job.
#[derive(Debug, Error)]
pub enum RowError {
    /// Row does not have the minimum structural shape.
    #[error("Invalid row format: {0}")]
    Format(String),

    /// A sublist field appeared before a line was selected.
    #[error("Sublist '{0}' field set before a line_id was provided")]
    MissingLineId(String),

    /// Record identity not found or invalid in the store.
    #[error("Record not found: {record_type} {internal_id}")]
    Load {
        record_type: String,
        internal_id: String,
    },

    /// The store rejected a field set.
    #[error("Cannot set field '{field}': {message}")]
    Field { field: String, message: String },

    /// The store rejected the final save.
    #[error("Save failed: {0}")]
    Save(String),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level import orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::run_import`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// Header schema error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// IO error reading input or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input contained no lines at all.
    #[error("Input is empty")]
    EmptyInput,

    /// JSON error loading or persisting the record store.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for schema parsing.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for import orchestration.
pub type ImportResult<T> = Result<T, ImportError>;
