//! Result report assembly.
//!
//! Every input data row produces exactly one [`RowResult`]; the assembler
//! turns them into the output CSV: header row (original columns plus an
//! `error_message` column) followed by one line per result, in the order
//! received. Row values are the original raw texts, never re-serialized
//! typed values.

use crate::schema::HeaderSchema;

/// Trailing column appended to the output header.
pub const ERROR_COLUMN: &str = "error_message";

/// Outcome of processing one input row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    /// Original raw field texts, as split from the input line.
    pub fields: Vec<String>,
    /// Error message, `None` on success.
    pub error: Option<String>,
}

impl RowResult {
    pub fn success(fields: Vec<String>) -> Self {
        Self { fields, error: None }
    }

    pub fn failure(fields: Vec<String>, error: impl Into<String>) -> Self {
        Self { fields, error: Some(error.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Assemble the output CSV from collected row results.
///
/// No reordering, deduplication, or sorting beyond the order received;
/// the header line always comes first.
pub fn assemble(schema: &HeaderSchema, results: &[RowResult]) -> String {
    let mut out = String::new();

    let mut header: Vec<&str> = schema.columns().iter().map(String::as_str).collect();
    header.push(ERROR_COLUMN);
    out.push_str(&header.join(", "));
    out.push('\n');

    for result in results {
        out.push_str(&result.fields.join(", "));
        out.push_str(", ");
        if let Some(err) = &result.error {
            out.push_str(err);
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> HeaderSchema {
        HeaderSchema::parse("internal_id,record_type,companyname").unwrap()
    }

    #[test]
    fn test_header_row_first() {
        let csv = assemble(&schema(), &[]);
        assert_eq!(csv, "internal_id, record_type, companyname, error_message\n");
    }

    #[test]
    fn test_success_row_has_empty_error() {
        let results = vec![RowResult::success(vec![
            "1".into(),
            "customer".into(),
            "Acme Corp".into(),
        ])];
        let csv = assemble(&schema(), &results);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "1, customer, Acme Corp, ");
    }

    #[test]
    fn test_failure_row_carries_message() {
        let results = vec![RowResult::failure(
            vec!["9".into(), "customer".into(), "Nope".into()],
            "Record not found: customer 9",
        )];
        let csv = assemble(&schema(), &results);
        assert!(csv.lines().nth(1).unwrap().ends_with("Record not found: customer 9"));
    }

    #[test]
    fn test_rows_keep_received_order() {
        let results = vec![
            RowResult::success(vec!["2".into(), "customer".into(), "B".into()]),
            RowResult::success(vec!["1".into(), "customer".into(), "A".into()]),
        ];
        let csv = assemble(&schema(), &results);
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[1].starts_with("2,"));
        assert!(lines[2].starts_with("1,"));
    }
}
