//! # Massedit - bulk record updates from CSV
//!
//! Massedit applies a CSV description of desired changes to many structured
//! records at once: flat body fields and repeating sublist line items,
//! addressed per row by `(record_type, internal_id)`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV line   │────▶│  RowParser  │────▶│   Planner   │────▶│   Mutator   │
//! │  (raw text) │     │ (typed row) │     │ (op list)   │     │ (store I/O) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//!                                          ┌─────────────┐           ▼
//!                                          │ Report CSV  │◀── RowResult per row
//!                                          └─────────────┘
//! ```
//!
//! Each row succeeds or fails independently; the output report carries one
//! line per input row with an `error_message` column.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use massedit::{run_import, JsonFileStore};
//!
//! let mut store = JsonFileStore::open("records.json")?;
//! let report = run_import(&csv_text, &mut store)?;
//! store.persist()?;
//! std::fs::write("report.csv", &report.report_csv)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`schema`] - Header schema parsing
//! - [`parser`] - Row parsing and value coercion
//! - [`planner`] - Mutation planning
//! - [`store`] - Record model and store implementations
//! - [`mutator`] - Mutation application
//! - [`report`] - Result report assembly
//! - [`pipeline`] - End-to-end import orchestration
//! - [`logs`] - Side log stream

// Core modules
pub mod error;
pub mod logs;

// Parsing
pub mod parser;
pub mod schema;

// Planning and application
pub mod mutator;
pub mod planner;
pub mod store;

// Reporting and orchestration
pub mod pipeline;
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ImportError, RowError, SchemaError};

// =============================================================================
// Re-exports - Schema and parsing
// =============================================================================

pub use parser::{coerce, decode_content, detect_encoding, parse_row, read_file_auto, TypedRow};
pub use schema::{HeaderSchema, COL_INTERNAL_ID, COL_LINE_ID, COL_RECORD_TYPE, COL_SUBLIST_NAME};

// =============================================================================
// Re-exports - Planning and application
// =============================================================================

pub use mutator::RecordMutator;
pub use planner::{plan, Operation};
pub use store::{JsonFileStore, MemoryStore, Record, RecordStore, Sublist};

// =============================================================================
// Re-exports - Reporting and pipeline
// =============================================================================

pub use pipeline::{process_row, run_import, ImportReport};
pub use report::{assemble, RowResult, ERROR_COLUMN};

// =============================================================================
// Re-exports - Logs
// =============================================================================

pub use logs::{log_error, log_info, log_success, log_warning, LogBroadcaster, LogEntry, LogLevel};
