//! High-level import pipeline.
//!
//! Combines all steps: header schema parsing, per-row parse/plan/apply,
//! and report assembly. Row failures are caught at the row boundary and
//! recorded in the report; only a schema failure aborts the whole job.
//!
//! # Example
//!
//! ```rust,ignore
//! use massedit::{run_import, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! let report = run_import(csv_text, &mut store)?;
//! println!("{} rows, {} failed", report.processed, report.failed);
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::{ImportError, RowError};
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::mutator::RecordMutator;
use crate::parser::{parse_row, split_fields};
use crate::planner::plan;
use crate::report::{assemble, RowResult};
use crate::schema::{HeaderSchema, COL_INTERNAL_ID, COL_RECORD_TYPE};
use crate::store::{id_text, RecordStore};

/// Result of a complete import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// The output CSV: header plus one line per processed row.
    pub report_csv: String,

    /// Number of data rows processed (duplicate headers excluded).
    pub processed: usize,

    /// Rows applied and saved without error.
    pub succeeded: usize,

    /// Rows recorded with an error message.
    pub failed: usize,

    /// Duplicate header lines silently skipped.
    pub duplicate_headers: usize,

    /// Completion timestamp (RFC 3339).
    pub completed_at: String,
}

/// Run a full import of `content` against `store`.
///
/// The first non-blank line is the header; every following non-blank line
/// is a data row. Blank lines are ignored. A malformed header aborts the
/// job before any row is touched.
pub fn run_import(content: &str, store: &mut dyn RecordStore) -> Result<ImportReport, ImportError> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    let header_line = lines.next().ok_or(ImportError::EmptyInput)?;
    let schema = HeaderSchema::parse(header_line)?;
    log_info(format!("Header has {} columns", schema.columns().len()));

    let mut results = Vec::new();
    let mut duplicate_headers = 0;

    for line in lines {
        match process_row(&schema, line, store) {
            None => duplicate_headers += 1,
            Some(result) => results.push(result),
        }
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let failed = results.len() - succeeded;

    if failed > 0 {
        log_warning(format!("{} of {} rows failed", failed, results.len()));
    } else {
        log_success(format!("All {} rows applied", results.len()));
    }

    Ok(ImportReport {
        report_csv: assemble(&schema, &results),
        processed: results.len(),
        succeeded,
        failed,
        duplicate_headers,
        completed_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Process one data line: parse, plan, apply.
///
/// Returns `None` for a duplicate header line (no output row, no error).
/// Every row-local failure becomes a failed [`RowResult`]; nothing
/// propagates past the row boundary.
pub fn process_row(
    schema: &HeaderSchema,
    line: &str,
    store: &mut dyn RecordStore,
) -> Option<RowResult> {
    let fields = split_fields(line);

    match apply_row(schema, line, store) {
        Ok(None) => None,
        Ok(Some(())) => Some(RowResult::success(fields)),
        Err(err) => {
            log_error(format!("Row '{}': {}", line.trim(), err));
            Some(RowResult::failure(fields, err.to_string()))
        }
    }
}

/// Inner row processing, with `?` across the row-local steps.
fn apply_row(
    schema: &HeaderSchema,
    line: &str,
    store: &mut dyn RecordStore,
) -> Result<Option<()>, RowError> {
    let row = match parse_row(schema, line)? {
        Some(row) => row,
        None => return Ok(None),
    };

    let internal_id = row.get(COL_INTERNAL_ID).cloned().unwrap_or(Value::Null);
    let record_type = match row.get(COL_RECORD_TYPE) {
        Some(Value::Null) | None => {
            return Err(RowError::Format("record_type is empty".into()));
        }
        Some(v) => id_text(v),
    };

    let operations = plan(schema, &row)?;
    RecordMutator::new(store).apply(&record_type, &internal_id, &operations)?;
    Ok(Some(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Record, Sublist};
    use serde_json::{json, Map};

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();

        let customer = Record::new("customer", json!(1));
        store.insert(customer);

        let mut order = Record::new("salesorder", json!(2));
        let mut sublist = Sublist::new();
        let mut line = Map::new();
        line.insert("line_id".into(), json!(5));
        line.insert("item".into(), json!(100));
        sublist.lines.push(line);
        order.sublists.insert("item".into(), sublist);
        store.insert(order);

        store
    }

    #[test]
    fn test_body_field_import() {
        let mut store = seeded_store();
        let csv = "internal_id,record_type,companyname\n1,customer,Acme Corp\n";
        let report = run_import(csv, &mut store).unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.succeeded, 1);
        let record = store.get("customer", &json!(1)).unwrap();
        assert_eq!(record.body["companyname"], json!("Acme Corp"));

        let lines: Vec<&str> = report.report_csv.lines().collect();
        assert_eq!(lines[0], "internal_id, record_type, companyname, error_message");
        assert_eq!(lines[1], "1, customer, Acme Corp, ");
    }

    #[test]
    fn test_sublist_field_import() {
        let mut store = seeded_store();
        let csv = "internal_id,record_type,sublist_name,line_id,item\n2,salesorder,item,5,101\n";
        let report = run_import(csv, &mut store).unwrap();

        assert_eq!(report.failed, 0);
        let record = store.get("salesorder", &json!(2)).unwrap();
        assert_eq!(record.sublists["item"].lines[0]["item"], json!(101));
    }

    #[test]
    fn test_missing_header_column_aborts_job() {
        let mut store = seeded_store();
        let csv = "internal_id,companyname\n1,Acme\n";
        let err = run_import(csv, &mut store).unwrap_err();
        assert!(matches!(err, ImportError::Schema(_)));
    }

    #[test]
    fn test_duplicate_header_produces_no_output_row() {
        let mut store = seeded_store();
        let csv = "internal_id,record_type,companyname\n\
                   internal_id,record_type,companyname\n\
                   1,customer,Acme\n";
        let report = run_import(csv, &mut store).unwrap();

        assert_eq!(report.duplicate_headers, 1);
        assert_eq!(report.processed, 1);
        assert_eq!(report.report_csv.lines().count(), 2);
    }

    #[test]
    fn test_row_failure_does_not_abort_siblings() {
        let mut store = seeded_store();
        let csv = "internal_id,record_type,companyname\n\
                   99,customer,Ghost Inc\n\
                   1,customer,Acme Corp\n";
        let report = run_import(csv, &mut store).unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);

        let lines: Vec<&str> = report.report_csv.lines().collect();
        assert!(lines[1].contains("Record not found"));
        assert_eq!(lines[2], "1, customer, Acme Corp, ");

        // the good row still landed
        let record = store.get("customer", &json!(1)).unwrap();
        assert_eq!(record.body["companyname"], json!("Acme Corp"));
    }

    #[test]
    fn test_sublist_field_before_line_id_fails_row() {
        let mut store = seeded_store();
        // header puts the item column before sublist addressing columns
        let csv = "internal_id,record_type,sublist_name,item\n2,salesorder,item,101\n";
        let report = run_import(csv, &mut store).unwrap();

        assert_eq!(report.failed, 1);
        assert!(report.report_csv.contains("line_id"));

        // the record was never saved
        let record = store.get("salesorder", &json!(2)).unwrap();
        assert_eq!(record.sublists["item"].lines[0]["item"], json!(100));
    }

    #[test]
    fn test_line_lookup_miss_still_saves_row() {
        let mut store = seeded_store();
        let csv = "internal_id,record_type,memo,sublist_name,line_id,item\n\
                   2,salesorder,rush order,item,999,101\n";
        let report = run_import(csv, &mut store).unwrap();

        // no error recorded for the miss, only logged
        assert_eq!(report.failed, 0);
        let record = store.get("salesorder", &json!(2)).unwrap();
        assert_eq!(record.body["memo"], json!("rush order"));
        assert_eq!(record.sublists["item"].lines[0]["item"], json!(100));
    }

    #[test]
    fn test_short_row_rejected() {
        let mut store = seeded_store();
        let csv = "internal_id,record_type\njustone\n";
        let report = run_import(csv, &mut store).unwrap();
        assert_eq!(report.failed, 1);
        assert!(report.report_csv.contains("Invalid row format"));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut store = seeded_store();
        let csv = "internal_id,record_type,companyname\n1,customer,Acme Corp\n";

        let first = run_import(csv, &mut store).unwrap();
        let second = run_import(csv, &mut store).unwrap();

        assert_eq!(first.report_csv, second.report_csv);
        assert_eq!(second.failed, 0);
    }
}
