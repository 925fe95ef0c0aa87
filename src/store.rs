//! Record store: the storage seam behind the mutation engine.
//!
//! The engine only needs load-by-identity and save-back; everything else
//! about storage is a collaborator concern. This module provides:
//!
//! - [`Record`] / [`Sublist`] - the record handle model
//! - [`RecordStore`] - the load/save trait
//! - [`MemoryStore`] - in-memory store for tests and small jobs
//! - [`JsonFileStore`] - records held in a JSON file on disk

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{ImportError, RowError};
use crate::parser::coerce;

fn default_key_field() -> String {
    "line_id".to_string()
}

/// A named repeating collection of line items on a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sublist {
    /// Field compared against the row's line key when resolving a line.
    /// Lines are addressed by value lookup, never by position.
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Line items, each a flat field map.
    #[serde(default)]
    pub lines: Vec<Map<String, Value>>,
}

impl Sublist {
    pub fn new() -> Self {
        Self { key_field: default_key_field(), lines: Vec::new() }
    }
}

impl Default for Sublist {
    fn default() -> Self {
        Self::new()
    }
}

/// A record handle: one record loaded from the store, owned exclusively
/// for the duration of one row's processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub record_type: String,
    pub internal_id: Value,

    /// Flat top-level fields.
    #[serde(default)]
    pub body: Map<String, Value>,

    /// Named sublists.
    #[serde(default)]
    pub sublists: BTreeMap<String, Sublist>,

    /// Declared body field set. When present, setting a field outside it
    /// fails; when absent, any field name is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeSet<String>>,
}

impl Record {
    pub fn new(record_type: impl Into<String>, internal_id: Value) -> Self {
        Self {
            record_type: record_type.into(),
            internal_id,
            body: Map::new(),
            sublists: BTreeMap::new(),
            fields: None,
        }
    }

    /// Set a flat body field.
    pub fn set_body_field(&mut self, field: &str, value: Value) -> Result<(), RowError> {
        if let Some(declared) = &self.fields {
            if !declared.contains(field) {
                return Err(RowError::Field {
                    field: field.to_string(),
                    message: format!("unknown field on {} record", self.record_type),
                });
            }
        }
        self.body.insert(field.to_string(), value);
        Ok(())
    }

    /// Find the index of the sublist line whose key field equals `key`.
    ///
    /// Stored string key fields are coerced with the input coercion rule
    /// before comparison, so a stored `"5"` matches line key `5`.
    pub fn find_line(&self, sublist: &str, key: &Value) -> Option<usize> {
        let sublist = self.sublists.get(sublist)?;
        sublist.lines.iter().position(|line| {
            match line.get(&sublist.key_field) {
                Some(stored) if stored == key => true,
                Some(Value::String(s)) => &coerce(s) == key,
                _ => false,
            }
        })
    }

    /// Set a field on an already-resolved sublist line.
    pub fn set_line_field(
        &mut self,
        sublist: &str,
        index: usize,
        field: &str,
        value: Value,
    ) -> Result<(), RowError> {
        let line = self
            .sublists
            .get_mut(sublist)
            .and_then(|s| s.lines.get_mut(index))
            .ok_or_else(|| RowError::Field {
                field: field.to_string(),
                message: format!("sublist '{sublist}' line {index} is out of range"),
            })?;
        line.insert(field.to_string(), value);
        Ok(())
    }
}

/// Canonical text form of an internal id, used as the store key.
pub fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// RecordStore trait
// =============================================================================

/// Load/save seam between the mutation engine and record storage.
pub trait RecordStore {
    /// Load the record identified by `(record_type, internal_id)`.
    fn load(&self, record_type: &str, internal_id: &Value) -> Result<Record, RowError>;

    /// Persist a record back to the store.
    fn save(&mut self, record: Record) -> Result<(), RowError>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory record store keyed by `(record_type, internal_id)`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<(String, String), Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, record: Record) {
        let key = (record.record_type.clone(), id_text(&record.internal_id));
        self.records.insert(key, record);
    }

    /// Look at a stored record without taking ownership.
    pub fn get(&self, record_type: &str, internal_id: &Value) -> Option<&Record> {
        self.records
            .get(&(record_type.to_string(), id_text(internal_id)))
    }

    /// All records, for persistence.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, record_type: &str, internal_id: &Value) -> Result<Record, RowError> {
        self.get(record_type, internal_id)
            .cloned()
            .ok_or_else(|| RowError::Load {
                record_type: record_type.to_string(),
                internal_id: id_text(internal_id),
            })
    }

    fn save(&mut self, record: Record) -> Result<(), RowError> {
        self.insert(record);
        Ok(())
    }
}

// =============================================================================
// JsonFileStore
// =============================================================================

/// Record store backed by a JSON file (an array of records).
///
/// Records are loaded into memory up front; [`JsonFileStore::persist`]
/// writes the current state back out, pretty-printed.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Load all records from a JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let records: Vec<Record> = serde_json::from_str(&content)?;

        let mut inner = MemoryStore::new();
        for record in records {
            inner.insert(record);
        }

        Ok(Self { path: path.as_ref().to_path_buf(), inner })
    }

    /// Write the current records back to disk, sorted by identity so the
    /// output is stable across runs.
    pub fn persist(&self) -> Result<(), ImportError> {
        self.persist_to(&self.path)
    }

    /// Write the current records to an arbitrary path.
    pub fn persist_to(&self, path: impl AsRef<Path>) -> Result<(), ImportError> {
        let mut records: Vec<&Record> = self.inner.records().collect();
        records.sort_by_key(|r| (r.record_type.clone(), id_text(&r.internal_id)));
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self, record_type: &str, internal_id: &Value) -> Result<Record, RowError> {
        self.inner.load(record_type, internal_id)
    }

    fn save(&mut self, record: Record) -> Result<(), RowError> {
        self.inner.save(record)
    }
}
