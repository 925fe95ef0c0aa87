//! Header schema: the ordered column list parsed from the first input line.
//!
//! The schema is built once per job, before any row work begins, and is
//! strictly read-only afterward. Row-processing units receive it by
//! reference; there is no ambient cache.

use crate::error::{SchemaError, SchemaResult};

/// Column name carrying the record's internal identifier.
pub const COL_INTERNAL_ID: &str = "internal_id";

/// Column name carrying the record type.
pub const COL_RECORD_TYPE: &str = "record_type";

/// Column name selecting the active sublist for subsequent columns.
pub const COL_SUBLIST_NAME: &str = "sublist_name";

/// Column name selecting the active line within the active sublist.
pub const COL_LINE_ID: &str = "line_id";

/// Immutable ordered column-name list for one import job.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSchema {
    columns: Vec<String>,
    /// Original trimmed header text, kept to detect duplicate header rows
    /// embedded in the data stream.
    header_line: String,
}

impl HeaderSchema {
    /// Parse the first line of an input file into a schema.
    ///
    /// Column names are comma-separated with surrounding whitespace trimmed.
    /// Fails unless both `internal_id` and `record_type` are present;
    /// column order is otherwise free.
    pub fn parse(first_line: &str) -> SchemaResult<HeaderSchema> {
        let trimmed = first_line.trim();
        if trimmed.is_empty() {
            return Err(SchemaError::EmptyHeader);
        }

        let columns: Vec<String> = trimmed
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        for required in [COL_INTERNAL_ID, COL_RECORD_TYPE] {
            if !columns.iter().any(|c| c == required) {
                return Err(SchemaError::MissingColumn(required));
            }
        }

        Ok(HeaderSchema {
            columns,
            header_line: trimmed.to_string(),
        })
    }

    /// Column names in declared order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The original trimmed header line text.
    pub fn header_line(&self) -> &str {
        &self.header_line
    }

    /// True if a trimmed data line is a repeat of the header line.
    pub fn is_duplicate_header(&self, line: &str) -> bool {
        line.trim() == self.header_line
    }
}
