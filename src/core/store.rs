//! Record store - the working record set behind a single view
//!
//! Holds the records of one page/command invocation as an ordered,
//! read-only sequence. Records are supplied wholesale by the loader before
//! any query runs; the store never mutates after a successful load.

use std::collections::HashMap;
use thiserror::Error;

use crate::core::record::Record;

/// Errors raised by the record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Two records in one load share an id. Never silently deduplicated:
    /// a duplicate id is an upstream data-quality bug that must surface.
    #[error("duplicate record id '{id}' (first at position {first}, again at position {second})")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },
}

/// Ordered, read-only record set
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store directly from a record sequence
    pub fn from_records(records: Vec<Record>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.load(records)?;
        Ok(store)
    }

    /// Replace the held sequence.
    ///
    /// Fails if two records share an id; the store keeps its previous
    /// contents in that case.
    pub fn load(&mut self, records: Vec<Record>) -> Result<(), StoreError> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if let Some(&first) = seen.get(record.id()) {
                return Err(StoreError::DuplicateId {
                    id: record.id().to_string(),
                    first,
                    second: position,
                });
            }
            seen.insert(record.id(), position);
        }

        self.records = records;
        Ok(())
    }

    /// The full sequence, insertion order preserved
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    /// Look up a record by exact id
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> Record {
        Record::new(id)
    }

    #[test]
    fn test_load_preserves_insertion_order() {
        let store =
            RecordStore::from_records(vec![record("INC-3"), record("INC-1"), record("INC-2")])
                .unwrap();
        let ids: Vec<&str> = store.all().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["INC-3", "INC-1", "INC-2"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err =
            RecordStore::from_records(vec![record("RISK-1"), record("RISK-2"), record("RISK-1")])
                .unwrap_err();
        match err {
            StoreError::DuplicateId { id, first, second } => {
                assert_eq!(id, "RISK-1");
                assert_eq!(first, 0);
                assert_eq!(second, 2);
            }
        }
    }

    #[test]
    fn test_failed_load_keeps_previous_contents() {
        let mut store = RecordStore::from_records(vec![record("POL-1")]).unwrap();
        let result = store.load(vec![record("POL-2"), record("POL-2")]);
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].id(), "POL-1");
    }

    #[test]
    fn test_get_by_id() {
        let store = RecordStore::from_records(vec![record("CTRL-1"), record("CTRL-2")]).unwrap();
        assert!(store.get("CTRL-2").is_some());
        assert!(store.get("CTRL-9").is_none());
    }
}
