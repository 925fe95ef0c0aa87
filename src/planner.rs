//! Mutation planning: a typed row becomes an ordered list of operations.
//!
//! The planner walks the schema columns in declared order, carrying two
//! pieces of per-row state: the active sublist and the active line key.
//! Both live in a local struct built fresh for each row and discarded at
//! row end; nothing leaks across rows.

use serde_json::Value;

use crate::error::RowError;
use crate::parser::TypedRow;
use crate::schema::{HeaderSchema, COL_INTERNAL_ID, COL_LINE_ID, COL_RECORD_TYPE, COL_SUBLIST_NAME};

/// One mutation against a record, in row order.
///
/// `SelectSublist`/`SelectLine` set addressing context consumed by later
/// `SetSublistField` operations in the same row.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Set a flat body field on the record.
    SetBodyField { field: String, value: Value },
    /// Make the named sublist the target of subsequent sublist fields.
    SelectSublist { name: String },
    /// Make the line with this key the target of subsequent sublist fields.
    SelectLine { key: Value },
    /// Set a field on the currently addressed sublist line.
    SetSublistField { field: String, value: Value },
}

/// Per-row addressing state.
#[derive(Debug, Default)]
struct RowContext {
    current_sublist: Option<String>,
    current_line: Option<Value>,
}

/// Plan the ordered mutations for one typed row.
///
/// - `internal_id` / `record_type` are identity, never emitted.
/// - `sublist_name` / `line_id` update the addressing context; a null value
///   clears it instead.
/// - Any other non-null column becomes a body field set (no sublist active)
///   or a sublist field set (sublist and line active). A sublist field
///   without an active line fails the row with [`RowError::MissingLineId`].
/// - Null values are skipped entirely; existing record data stays untouched.
pub fn plan(schema: &HeaderSchema, row: &TypedRow) -> Result<Vec<Operation>, RowError> {
    let mut ops = Vec::new();
    let mut ctx = RowContext::default();

    for column in schema.columns() {
        let value = row.get(column).cloned().unwrap_or(Value::Null);

        match column.as_str() {
            COL_INTERNAL_ID | COL_RECORD_TYPE => {}
            COL_SUBLIST_NAME => match value {
                Value::Null => {
                    ctx.current_sublist = None;
                    ctx.current_line = None;
                }
                v => {
                    let name = value_text(&v);
                    ctx.current_sublist = Some(name.clone());
                    ops.push(Operation::SelectSublist { name });
                }
            },
            COL_LINE_ID => match value {
                Value::Null => ctx.current_line = None,
                v => {
                    ctx.current_line = Some(v.clone());
                    ops.push(Operation::SelectLine { key: v });
                }
            },
            _ => match value {
                Value::Null => {}
                v => match (&ctx.current_sublist, &ctx.current_line) {
                    (None, _) => ops.push(Operation::SetBodyField {
                        field: column.clone(),
                        value: v,
                    }),
                    (Some(sublist), None) => {
                        return Err(RowError::MissingLineId(sublist.clone()));
                    }
                    (Some(_), Some(_)) => ops.push(Operation::SetSublistField {
                        field: column.clone(),
                        value: v,
                    }),
                },
            },
        }
    }

    Ok(ops)
}

/// Render a typed value as plain text (sublist names arrive as strings,
/// but nothing stops an operator from using a numeric name).
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
