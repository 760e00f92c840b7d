//! Record store
//!
//! Holds the normalized records keyed by record id, in load order.
//!
//! # Critical Invariants
//!
//! 1. **Id Uniqueness**: each record id appears exactly once
//! 2. **Load Order**: iteration follows insertion order

use super::record::{Record, RecordError};
use std::collections::HashMap;

/// Normalized records keyed by id
///
/// # Example
///
/// ```rust
/// use kleptosyn_core::{Record, RecordStore, RecordType};
///
/// let mut store = RecordStore::new();
/// store.insert(Record::new("r1".into(), RecordType::Person, "Ann".into(), None, None).unwrap()).unwrap();
///
/// assert_eq!(store.len(), 1);
/// assert_eq!(store.get("r1").unwrap().name(), "Ann");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,

    /// Record id → position in `records`
    index: HashMap<String, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, failing on the first duplicate id
    pub fn from_records<I>(records: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut store = Self::new();
        store.extend(records)?;
        Ok(store)
    }

    /// Add a record
    pub fn insert(&mut self, record: Record) -> Result<(), RecordError> {
        if self.index.contains_key(record.id()) {
            return Err(RecordError::DuplicateId(record.id().to_string()));
        }
        self.index.insert(record.id().to_string(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Add every record from an iterator
    pub fn extend<I>(&mut self, records: I) -> Result<(), RecordError>
    where
        I: IntoIterator<Item = Record>,
    {
        for record in records {
            self.insert(record)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in load order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

impl IntoIterator for RecordStore {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
