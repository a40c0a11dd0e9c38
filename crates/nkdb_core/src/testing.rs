//! Backends for unit tests.

use nkdb_storage::{Dataset, InMemoryBackend, Record, StorageBackend, StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory backend that counts calls and fails on demand.
#[derive(Debug, Default)]
pub(crate) struct Flaky {
    pub(crate) store: InMemoryBackend,
    pub(crate) loads: AtomicUsize,
    pub(crate) saves: AtomicUsize,
    pub(crate) fail_load: AtomicBool,
    pub(crate) fail_save: AtomicBool,
}

impl Flaky {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_records(records: Dataset) -> Arc<Self> {
        Arc::new(Self {
            store: InMemoryBackend::with_records(records),
            ..Self::default()
        })
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub(crate) fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(crate) fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }
}

impl StorageBackend for Flaky {
    fn load(&self) -> StorageResult<Dataset> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("injected load failure"));
        }
        self.store.load()
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("injected save failure"));
        }
        self.store.save(records)
    }
}

pub(crate) fn record(fields: &[&str]) -> Record {
    fields.iter().map(|f| (*f).to_string()).collect()
}
