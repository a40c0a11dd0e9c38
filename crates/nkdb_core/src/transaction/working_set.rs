//! In-memory working set of a transaction.

use crate::record::key_of;
use nkdb_storage::{Dataset, Record};
use std::collections::HashMap;
use tracing::warn;

/// Ordered keys plus a key-to-record map.
///
/// The key order is the save order. `order` and the key set of `records`
/// always hold exactly the same keys.
#[derive(Debug)]
pub(crate) struct WorkingSet {
    order: Vec<String>,
    records: HashMap<String, Record>,
}

impl WorkingSet {
    /// Builds a working set from a loaded dataset.
    ///
    /// Malformed records are skipped. When a key appears more than once the
    /// first occurrence wins, matching what a single-shot `get` would see.
    pub(crate) fn from_dataset(dataset: Dataset, key_field: usize) -> Self {
        let mut set = Self {
            order: Vec::with_capacity(dataset.len()),
            records: HashMap::with_capacity(dataset.len()),
        };

        for record in dataset {
            let Some(key) = key_of(&record, key_field) else {
                continue;
            };
            if set.records.contains_key(key) {
                warn!(key, "skipping duplicate key in loaded dataset");
                continue;
            }
            let key = key.to_string();
            set.order.push(key.clone());
            set.records.insert(key, record);
        }

        set
    }

    pub(crate) fn keys(&self) -> &[String] {
        &self.order
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Inserts or overwrites; new keys go to the end of the order.
    pub(crate) fn upsert(&mut self, key: &str, record: Record) {
        match self.records.get_mut(key) {
            Some(existing) => *existing = record,
            None => {
                self.order.push(key.to_string());
                self.records.insert(key.to_string(), record);
            }
        }
    }

    /// Removes `key`, returning its record if it was present.
    pub(crate) fn remove(&mut self, key: &str) -> Option<Record> {
        let record = self.records.remove(key)?;
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        Some(record)
    }

    /// Materializes the dataset in key order.
    pub(crate) fn to_dataset(&self) -> Dataset {
        self.order
            .iter()
            .filter_map(|key| self.records.get(key).cloned())
            .collect()
    }
}
