//! Test fixtures and database helpers.
//!
//! Provides temporary databases and backends that record how they were
//! used or fail on request.

use nkdb_core::{Config, Database};
use nkdb_storage::{Dataset, InMemoryBackend, Record, StorageBackend, StorageError, StorageResult};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Builds a record from string slices.
pub fn record(fields: &[&str]) -> Record {
    fields.iter().map(|f| (*f).to_string()).collect()
}

/// An in-memory backend that counts calls and can be told to fail.
///
/// Share it with a [`Database`] through an `Arc` and keep a handle to
/// inspect or steer it from the test.
#[derive(Debug, Default)]
pub struct FaultyBackend {
    store: InMemoryBackend,
    loads: AtomicUsize,
    saves: AtomicUsize,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
    delay: parking_lot::Mutex<Option<Duration>>,
}

impl FaultyBackend {
    /// Creates an empty backend behind an `Arc`.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a backend holding `records`.
    pub fn with_records(records: Dataset) -> Arc<Self> {
        Arc::new(Self {
            store: InMemoryBackend::with_records(records),
            ..Self::default()
        })
    }

    /// Number of `load` calls seen so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of `save` calls seen so far.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes subsequent loads fail (or succeed again).
    pub fn fail_loads(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    /// Sleeps for `delay` inside every load and save.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Returns the dataset as currently persisted.
    pub fn persisted(&self) -> Dataset {
        self.store.records()
    }

    fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
    }
}

impl StorageBackend for FaultyBackend {
    fn load(&self) -> StorageResult<Dataset> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.pause();
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("injected load failure"));
        }
        self.store.load()
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.pause();
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("injected save failure"));
        }
        self.store.save(records)
    }
}

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database keyed on field 0.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory(0),
            temp_dir: None,
        }
    }

    /// Creates a new CSV-backed test database in a temporary directory.
    pub fn file() -> Self {
        Self::file_with_config(Config::default())
    }

    /// Creates a new CSV-backed test database with custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("data").join("records.csv");

        Self {
            db: Database::open(&path, config),
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the data file path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.temp_dir
            .as_ref()
            .map(|d| d.path().join("data").join("records.csv"))
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary CSV-backed database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &std::path::Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a database holding `count` records keyed `key-0`, `key-1`, ...
    pub fn populated_database(count: usize) -> TestDatabase {
        let test_db = TestDatabase::memory();
        test_db
            .db
            .update(|tx| {
                for i in 0..count {
                    let key = format!("key-{i}");
                    tx.set(&key, vec![key.clone(), i.to_string()])?;
                }
                Ok(())
            })
            .expect("Failed to populate database");
        test_db
    }
}
