//! Applying planned mutations to a record.
//!
//! The mutator loads the record handle, replays the operation list in
//! order, and persists the handle. `SelectSublist`/`SelectLine` only move
//! the local addressing context; a `SetSublistField` resolves the active
//! line by value lookup at application time.
//!
//! Failure asymmetry, preserved from the system this replaces: a sublist
//! line lookup miss is soft (the field set is skipped and logged, the row
//! continues and still saves), while every other operation failure aborts
//! the row.

use serde_json::Value;

use crate::error::RowError;
use crate::logs::log_warning;
use crate::planner::Operation;
use crate::store::{id_text, RecordStore};

/// Applies operation lists against records in a store.
pub struct RecordMutator<'a> {
    store: &'a mut dyn RecordStore,
}

impl<'a> RecordMutator<'a> {
    pub fn new(store: &'a mut dyn RecordStore) -> Self {
        Self { store }
    }

    /// Load, mutate, and save one record.
    pub fn apply(
        &mut self,
        record_type: &str,
        internal_id: &Value,
        operations: &[Operation],
    ) -> Result<(), RowError> {
        let mut record = self.store.load(record_type, internal_id)?;

        let mut current_sublist: Option<&str> = None;
        let mut current_line: Option<&Value> = None;

        for op in operations {
            match op {
                Operation::SetBodyField { field, value } => {
                    record.set_body_field(field, value.clone())?;
                }
                Operation::SelectSublist { name } => {
                    current_sublist = Some(name);
                }
                Operation::SelectLine { key } => {
                    // resolution is deferred to the next SetSublistField
                    current_line = Some(key);
                }
                Operation::SetSublistField { field, value } => {
                    // The planner guarantees both are set before this op.
                    let (sublist, key) = match (current_sublist, current_line) {
                        (Some(s), Some(k)) => (s, k),
                        _ => {
                            return Err(RowError::MissingLineId(
                                current_sublist.unwrap_or("?").to_string(),
                            ))
                        }
                    };

                    match record.find_line(sublist, key) {
                        Some(index) => {
                            record.set_line_field(sublist, index, field, value.clone())?;
                        }
                        None => {
                            // Soft miss: skip this field, keep the row alive.
                            log_warning(format!(
                                "{} {}: no line with {} in sublist '{}', field '{}' not set",
                                record_type,
                                id_text(internal_id),
                                id_text(key),
                                sublist,
                                field,
                            ));
                        }
                    }
                }
            }
        }

        self.store.save(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Record, Sublist};
    use serde_json::{json, Map};

    fn store_with_salesorder() -> MemoryStore {
        let mut record = Record::new("salesorder", json!(1));
        record.body.insert("memo".into(), json!("before"));

        let mut sublist = Sublist::new();
        let mut line = Map::new();
        line.insert("line_id".into(), json!(5));
        line.insert("item".into(), json!(100));
        sublist.lines.push(line);
        record.sublists.insert("item".into(), sublist);

        let mut store = MemoryStore::new();
        store.insert(record);
        store
    }

    #[test]
    fn test_apply_body_field() {
        let mut store = store_with_salesorder();
        let ops = vec![Operation::SetBodyField { field: "memo".into(), value: json!("after") }];

        RecordMutator::new(&mut store)
            .apply("salesorder", &json!(1), &ops)
            .unwrap();

        let record = store.get("salesorder", &json!(1)).unwrap();
        assert_eq!(record.body["memo"], json!("after"));
    }

    #[test]
    fn test_apply_sublist_field() {
        let mut store = store_with_salesorder();
        let ops = vec![
            Operation::SelectSublist { name: "item".into() },
            Operation::SelectLine { key: json!(5) },
            Operation::SetSublistField { field: "item".into(), value: json!(101) },
        ];

        RecordMutator::new(&mut store)
            .apply("salesorder", &json!(1), &ops)
            .unwrap();

        let record = store.get("salesorder", &json!(1)).unwrap();
        assert_eq!(record.sublists["item"].lines[0]["item"], json!(101));
    }

    #[test]
    fn test_line_lookup_miss_is_soft() {
        let mut store = store_with_salesorder();
        let ops = vec![
            Operation::SetBodyField { field: "memo".into(), value: json!("still saved") },
            Operation::SelectSublist { name: "item".into() },
            Operation::SelectLine { key: json!(999) },
            Operation::SetSublistField { field: "item".into(), value: json!(101) },
        ];

        // no error: the miss is logged and skipped, the row still saves
        RecordMutator::new(&mut store)
            .apply("salesorder", &json!(1), &ops)
            .unwrap();

        let record = store.get("salesorder", &json!(1)).unwrap();
        assert_eq!(record.body["memo"], json!("still saved"));
        assert_eq!(record.sublists["item"].lines[0]["item"], json!(100));
    }

    #[test]
    fn test_unknown_record_aborts() {
        let mut store = store_with_salesorder();
        let err = RecordMutator::new(&mut store)
            .apply("salesorder", &json!(42), &[])
            .unwrap_err();
        assert!(matches!(err, RowError::Load { .. }));
    }

    #[test]
    fn test_field_error_aborts_before_save() {
        let mut store = MemoryStore::new();
        let mut record = Record::new("customer", json!(7));
        record.fields = Some(["companyname".to_string()].into_iter().collect());
        store.insert(record);

        let ops = vec![
            Operation::SetBodyField { field: "companyname".into(), value: json!("Acme") },
            Operation::SetBodyField { field: "bogus".into(), value: json!("x") },
        ];
        let err = RecordMutator::new(&mut store)
            .apply("customer", &json!(7), &ops)
            .unwrap_err();
        assert!(matches!(err, RowError::Field { .. }));

        // the aborted row was never saved
        let record = store.get("customer", &json!(7)).unwrap();
        assert!(!record.body.contains_key("companyname"));
    }
}
