//! Database facade.

use crate::config::Config;
use crate::error::{CoreError, CoreResult, Operation};
use crate::record::{count_malformed, key_of, validate};
use crate::transaction::{LockGuard, Transaction, TransactionState};
use nkdb_storage::{CachedBackend, CsvBackend, Dataset, InMemoryBackend, Record, StorageBackend};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::path::Path;
use std::time::Duration;
use tracing::{trace, warn};

/// The main database handle.
///
/// `Database` is a keyed view over a [`StorageBackend`]. Every record is a
/// list of text fields; the field at [`key_field`](Self::key_field) is the
/// record's key.
///
/// Each operation takes the database lock, loads the whole dataset, works
/// on it in memory and, for writes, saves the whole dataset back:
/// - `keys` and `get` take the lock shared
/// - `set` and `delete` take it exclusively
/// - [`begin`](Self::begin) holds it for the lifetime of a [`Transaction`]
///
/// # Lock Discipline
///
/// The lock is not reentrant. Calling a `Database` method from inside a
/// [`view`](Self::view) or [`update`](Self::update) closure, or while a
/// transaction handle is alive on the same thread, can deadlock. Use the
/// transaction handle instead.
///
/// # Example
///
/// ```rust
/// use nkdb_core::Database;
///
/// let db = Database::open_in_memory(0);
/// db.set("a", vec!["a".into(), "1".into()]).unwrap();
/// assert_eq!(db.get("a").unwrap(), vec!["a".to_string(), "1".to_string()]);
///
/// db.delete("a").unwrap();
/// assert!(db.get("a").unwrap_err().is_not_exist());
/// ```
pub struct Database {
    /// Configuration.
    config: Config,
    /// Storage backend, cache-decorated when configured.
    storage: Box<dyn StorageBackend>,
    /// Reader/writer lock around every load-modify-save cycle.
    lock: RwLock<()>,
}

impl Database {
    /// Creates a database over `storage` keyed by field `key_field`.
    pub fn new(key_field: usize, storage: impl StorageBackend + 'static) -> Self {
        Self::with_config(Config::new().key_field(key_field), storage)
    }

    /// Creates a database over `storage` with custom configuration.
    ///
    /// When `config.cache_ttl` is set, `storage` is wrapped in a
    /// [`CachedBackend`] with that time-to-live.
    pub fn with_config(config: Config, storage: impl StorageBackend + 'static) -> Self {
        let storage: Box<dyn StorageBackend> = match config.cache_ttl {
            Some(ttl) => Box::new(CachedBackend::new(storage, ttl)),
            None => Box::new(storage),
        };

        Self {
            config,
            storage,
            lock: RwLock::new(()),
        }
    }

    /// Opens a database stored as a CSV file at `path`.
    ///
    /// The file is not touched until the first operation; a missing file
    /// reads as an empty dataset.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use nkdb_core::{Config, Database};
    /// use std::path::Path;
    /// use std::time::Duration;
    ///
    /// let config = Config::new()
    ///     .key_field(0)
    ///     .cache_ttl(Duration::from_secs(1));
    ///
    /// let db = Database::open(Path::new("users.csv"), config);
    /// ```
    pub fn open(path: &Path, config: Config) -> Self {
        let backend = if config.create_dirs {
            CsvBackend::with_create_dirs(path)
        } else {
            CsvBackend::new(path)
        };
        Self::with_config(config, backend)
    }

    /// Opens a fresh in-memory database.
    ///
    /// Data is lost when the database is dropped.
    pub fn open_in_memory(key_field: usize) -> Self {
        Self::new(key_field, InMemoryBackend::new())
    }

    /// Returns the key field index.
    #[must_use]
    pub fn key_field(&self) -> usize {
        self.config.key_field
    }

    /// Returns database configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the key of every well-formed record, in dataset order.
    ///
    /// # Errors
    ///
    /// `Internal` if the dataset cannot be loaded.
    pub fn keys(&self) -> CoreResult<Vec<String>> {
        let op = Operation::Keys;
        let _guard = self.shared(op, None, self.config.lock_timeout)?;

        let records = self.load(op, None)?;
        Ok(records
            .iter()
            .filter_map(|record| key_of(record, self.key_field()))
            .map(str::to_string)
            .collect())
    }

    /// Returns the first record whose key is `key`.
    ///
    /// # Errors
    ///
    /// `NotExist` if no record matches, `Internal` if the dataset cannot be
    /// loaded.
    pub fn get(&self, key: &str) -> CoreResult<Record> {
        let op = Operation::Get;
        let _guard = self.shared(op, Some(key), self.config.lock_timeout)?;

        let records = self.load(op, Some(key))?;
        records
            .into_iter()
            .find(|record| key_of(record, self.key_field()) == Some(key))
            .ok_or_else(|| CoreError::not_exist(op, key))
    }

    /// Stores `record` under `key`.
    ///
    /// An existing record with the same key is replaced in place; otherwise
    /// the record is appended.
    ///
    /// # Errors
    ///
    /// `Invalid` (before any storage access) if the record has no key field
    /// or its key field differs from `key`; `Internal` if the load or save
    /// fails.
    pub fn set(&self, key: &str, record: Record) -> CoreResult<()> {
        let op = Operation::Set;
        validate(op, key, &record, self.key_field())?;

        let _guard = self.exclusive(op, Some(key), self.config.lock_timeout)?;

        let mut records = self.load(op, Some(key))?;
        match records
            .iter()
            .position(|existing| key_of(existing, self.key_field()) == Some(key))
        {
            Some(pos) => records[pos] = record,
            None => records.push(record),
        }

        self.save(op, Some(key), &records)
    }

    /// Removes the first record whose key is `key`.
    ///
    /// Deleting an absent key succeeds and rewrites the dataset unchanged.
    ///
    /// # Errors
    ///
    /// `Internal` if the load or save fails.
    pub fn delete(&self, key: &str) -> CoreResult<()> {
        let op = Operation::Delete;
        let _guard = self.exclusive(op, Some(key), self.config.lock_timeout)?;

        let mut records = self.load(op, Some(key))?;
        if let Some(pos) = records
            .iter()
            .position(|existing| key_of(existing, self.key_field()) == Some(key))
        {
            records.remove(pos);
        }

        self.save(op, Some(key), &records)
    }

    /// Begins a transaction.
    ///
    /// A writable transaction holds the lock exclusively, a read-only one
    /// holds it shared. The hold lasts until the transaction is rolled back
    /// or dropped.
    ///
    /// # Errors
    ///
    /// `Internal` if the dataset cannot be loaded (the lock is released
    /// first); `Timeout` if a lock timeout is configured and expires.
    pub fn begin(&self, writable: bool) -> CoreResult<Transaction<'_>> {
        self.begin_with(writable, self.config.lock_timeout)
    }

    /// Begins a transaction, waiting at most `timeout` for the lock.
    ///
    /// # Errors
    ///
    /// `Timeout` if the lock is not acquired in time, otherwise as
    /// [`begin`](Self::begin).
    pub fn try_begin_for(&self, writable: bool, timeout: Duration) -> CoreResult<Transaction<'_>> {
        self.begin_with(writable, Some(timeout))
    }

    fn begin_with(&self, writable: bool, timeout: Option<Duration>) -> CoreResult<Transaction<'_>> {
        let op = Operation::Begin;
        let guard = if writable {
            LockGuard::Exclusive(self.exclusive(op, None, timeout)?)
        } else {
            LockGuard::Shared(self.shared(op, None, timeout)?)
        };

        // The guard is dropped on error, releasing the lock.
        let records = self.load(op, None)?;
        Ok(Transaction::new(self, guard, records))
    }

    /// Runs `f` inside a read-only transaction.
    ///
    /// The transaction is rolled back when `f` returns, whatever the
    /// outcome. Errors from `f` are returned unchanged; a failure to begin
    /// is reported under [`Operation::View`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use nkdb_core::Database;
    ///
    /// let db = Database::open_in_memory(0);
    /// let count = db.view(|tx| Ok(tx.len())).unwrap();
    /// assert_eq!(count, 0);
    /// ```
    pub fn view<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> CoreResult<T>,
    {
        let tx = self.begin(false).map_err(|e| e.with_op(Operation::View))?;
        let result = f(&tx);
        tx.rollback();
        result
    }

    /// Runs `f` inside a writable transaction and commits if it succeeds.
    ///
    /// If `f` fails nothing is saved and its error is returned unchanged.
    /// If `f` already committed, no second commit is made. The transaction
    /// is rolled back when this returns, whatever the outcome. Failures to
    /// begin or commit are reported under [`Operation::Update`].
    pub fn update<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    {
        let op = Operation::Update;
        let mut tx = self.begin(true).map_err(|e| e.with_op(op))?;
        let result = f(&mut tx).and_then(|value| {
            if tx.state() == TransactionState::Active {
                tx.commit().map_err(|e| e.with_op(op))?;
            }
            Ok(value)
        });
        tx.rollback();
        result
    }

    pub(crate) fn load(&self, op: Operation, key: Option<&str>) -> CoreResult<Dataset> {
        let records = self
            .storage
            .load()
            .map_err(|e| CoreError::internal(op, key, e))?;
        trace!(%op, records = records.len(), "dataset loaded");

        let malformed = count_malformed(&records, self.key_field());
        if malformed > 0 {
            warn!(
                %op,
                malformed,
                key_field = self.key_field(),
                "skipping records without key field"
            );
        }
        Ok(records)
    }

    pub(crate) fn save(
        &self,
        op: Operation,
        key: Option<&str>,
        records: &[Record],
    ) -> CoreResult<()> {
        self.storage
            .save(records)
            .map_err(|e| CoreError::internal(op, key, e))?;
        trace!(%op, records = records.len(), "dataset saved");
        Ok(())
    }

    fn shared(
        &self,
        op: Operation,
        key: Option<&str>,
        timeout: Option<Duration>,
    ) -> CoreResult<RwLockReadGuard<'_, ()>> {
        match timeout {
            None => Ok(self.lock.read()),
            Some(timeout) => self
                .lock
                .try_read_for(timeout)
                .ok_or_else(|| CoreError::timeout(op, key, timeout)),
        }
    }

    fn exclusive(
        &self,
        op: Operation,
        key: Option<&str>,
        timeout: Option<Duration>,
    ) -> CoreResult<RwLockWriteGuard<'_, ()>> {
        match timeout {
            None => Ok(self.lock.write()),
            Some(timeout) => self
                .lock
                .try_write_for(timeout)
                .ok_or_else(|| CoreError::timeout(op, key, timeout)),
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
