//! In-memory storage backend for testing.

use crate::backend::{Dataset, Record, StorageBackend};
use crate::error::StorageResult;
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend keeps the dataset in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use nkdb_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// assert!(backend.load().unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    records: RwLock<Dataset>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with a pre-existing dataset.
    ///
    /// Useful for testing scans over foreign or malformed data.
    #[must_use]
    pub fn with_records(records: Dataset) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Returns a copy of the stored dataset.
    #[must_use]
    pub fn records(&self) -> Dataset {
        self.records.read().clone()
    }

    /// Clears all data from the backend.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

impl StorageBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Dataset> {
        Ok(self.records.read().clone())
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        *self.records.write() = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> Record {
        fields.iter().map(|f| (*f).to_string()).collect()
    }

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_empty());
        assert!(backend.records().is_empty());
    }

    #[test]
    fn memory_save_replaces_contents() {
        let backend = InMemoryBackend::with_records(vec![record(&["old", "0"])]);

        backend
            .save(&[record(&["a", "1"]), record(&["b", "2"])])
            .unwrap();

        assert_eq!(
            backend.load().unwrap(),
            vec![record(&["a", "1"]), record(&["b", "2"])]
        );
    }

    #[test]
    fn memory_preserves_order() {
        let backend = InMemoryBackend::new();
        let data = vec![record(&["z"]), record(&["a"]), record(&["m"])];
        backend.save(&data).unwrap();
        assert_eq!(backend.load().unwrap(), data);
    }

    #[test]
    fn memory_load_returns_copy() {
        let backend = InMemoryBackend::with_records(vec![record(&["a", "1"])]);

        let mut loaded = backend.load().unwrap();
        loaded[0][1] = "changed".to_string();

        assert_eq!(backend.records(), vec![record(&["a", "1"])]);
    }

    #[test]
    fn memory_with_ragged_records() {
        let backend = InMemoryBackend::with_records(vec![record(&[]), record(&["a", "1", "x"])]);
        let loaded = backend.load().unwrap();
        assert_eq!(loaded[0].len(), 0);
        assert_eq!(loaded[1].len(), 3);
    }

    #[test]
    fn memory_clear() {
        let backend = InMemoryBackend::with_records(vec![record(&["a"])]);
        backend.clear();
        assert!(backend.load().unwrap().is_empty());
    }
}
