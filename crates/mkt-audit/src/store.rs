//! Durable write of assembled events.

use std::sync::RwLock;

use crate::error::BoxError;
use crate::tracking::FieldMap;

/// Persistence collaborator that writes event records.
///
/// Implementations perform exactly one write per call and report failure
/// without retrying.
pub trait EventStore: Send + Sync {
    /// Writes one event record.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the record could not be written.
    fn create_record(&self, record: FieldMap) -> Result<(), BoxError>;
}

/// An in-memory event store.
///
/// Records are kept in insertion order. Useful for tests and for embedding
/// where durability is provided elsewhere.
pub struct MemoryEventStore {
    records: RwLock<Vec<FieldMap>>,
}

impl MemoryEventStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Returns a copy of every record written so far.
    #[must_use]
    pub fn records(&self) -> Vec<FieldMap> {
        self.records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Returns the most recent record, if any.
    #[must_use]
    pub fn last(&self) -> Option<FieldMap> {
        self.records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Returns the number of records written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all records.
    pub fn clear(&self) {
        self.records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}

impl EventStore for MemoryEventStore {
    fn create_record(&self, record: FieldMap) -> Result<(), BoxError> {
        self.records
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record);
        Ok(())
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventStore")
            .field("records_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(event_type: &str) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("type".to_string(), json!(event_type));
        map
    }

    #[test]
    fn new_store_is_empty() {
        let store = MemoryEventStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.last().is_none());
    }

    #[test]
    fn records_keep_insertion_order() {
        let store = MemoryEventStore::new();
        store.create_record(record("first")).expect("write");
        store.create_record(record("second")).expect("write");

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "first");
        assert_eq!(records[1]["type"], "second");
        assert_eq!(store.last().expect("has last")["type"], "second");
    }

    #[test]
    fn identical_records_are_not_deduplicated() {
        let store = MemoryEventStore::new();
        store.create_record(record("same")).expect("write");
        store.create_record(record("same")).expect("write");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clear_removes_everything() {
        let store = MemoryEventStore::new();
        store.create_record(record("x")).expect("write");
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn debug_shows_count() {
        let store = MemoryEventStore::new();
        store.create_record(record("x")).expect("write");
        let debug = format!("{store:?}");
        assert!(debug.contains("MemoryEventStore"));
        assert!(debug.contains("records_count"));
    }

    #[test]
    fn store_is_thread_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryEventStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..10 {
                        store
                            .create_record(record(&format!("event-{i}-{j}")))
                            .expect("write");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread should complete");
        }
        assert_eq!(store.len(), 80);
    }
}
