//! Transaction handle.

use crate::database::Database;
use crate::error::{CoreError, CoreResult, Operation};
use crate::record::validate;
use crate::transaction::state::TransactionState;
use crate::transaction::working_set::WorkingSet;
use nkdb_storage::{Dataset, Record};
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// The database lock as held by one transaction.
pub(crate) enum LockGuard<'db> {
    /// Shared hold of a read-only transaction.
    Shared(RwLockReadGuard<'db, ()>),
    /// Exclusive hold of a writable transaction.
    Exclusive(RwLockWriteGuard<'db, ()>),
}

/// A snapshot transaction.
///
/// Created by [`Database::begin`]. The database lock taken at `begin` is
/// held until the transaction is rolled back or dropped: shared for
/// read-only transactions, exclusive for writable ones.
///
/// All reads and writes go to an in-memory working set. Nothing reaches
/// storage until [`commit`](Self::commit), which writes the whole working
/// set with one `save` but keeps the lock. [`rollback`](Self::rollback)
/// releases the lock and ends the transaction.
///
/// Records are handed out and taken in by value, so callers never alias
/// the working set.
///
/// # Example
///
/// ```rust
/// use nkdb_core::Database;
///
/// let db = Database::open_in_memory(0);
///
/// let mut tx = db.begin(true).unwrap();
/// tx.set("a", vec!["a".into(), "1".into()]).unwrap();
/// tx.commit().unwrap();
/// tx.rollback();
///
/// assert_eq!(db.keys().unwrap(), vec!["a".to_string()]);
/// ```
pub struct Transaction<'db> {
    db: &'db Database,
    guard: LockGuard<'db>,
    state: TransactionState,
    working: WorkingSet,
}

impl<'db> Transaction<'db> {
    /// Builds a transaction over a dataset loaded under `guard`.
    pub(crate) fn new(db: &'db Database, guard: LockGuard<'db>, dataset: Dataset) -> Self {
        let working = WorkingSet::from_dataset(dataset, db.key_field());
        let tx = Self {
            db,
            guard,
            state: TransactionState::Active,
            working,
        };
        debug!(
            writable = tx.is_writable(),
            records = tx.working.len(),
            "transaction started"
        );
        tx
    }

    /// Returns true if this transaction may write.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self.guard, LockGuard::Exclusive(_))
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns the number of records in the working set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.working.len()
    }

    /// Returns true if the working set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.working.len() == 0
    }

    /// Returns true if `key` is present in the working set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.working.contains(key)
    }

    /// Returns the keys in save order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.working.keys().to_vec()
    }

    /// Returns a copy of the record stored under `key`.
    ///
    /// # Errors
    ///
    /// `NotExist` if the key is absent, `Invalid` after commit.
    pub fn get(&self, key: &str) -> CoreResult<Record> {
        let op = Operation::Get;
        self.state.ensure_active(op, Some(key))?;

        self.working
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::not_exist(op, key))
    }

    /// Inserts or overwrites the record under `key`.
    ///
    /// New keys are appended to the save order; existing keys keep their
    /// position.
    ///
    /// # Errors
    ///
    /// `Invalid` if the transaction is read-only or committed, if the record
    /// has no key field, or if its key field differs from `key`.
    pub fn set(&mut self, key: &str, record: Record) -> CoreResult<()> {
        let op = Operation::Set;
        self.ensure_writable(op, Some(key))?;
        validate(op, key, &record, self.db.key_field())?;

        self.working.upsert(key, record);
        Ok(())
    }

    /// Removes the record under `key`.
    ///
    /// # Errors
    ///
    /// `Invalid` if the transaction is read-only or committed, `NotExist`
    /// if the key is absent.
    pub fn delete(&mut self, key: &str) -> CoreResult<()> {
        let op = Operation::Delete;
        self.ensure_writable(op, Some(key))?;

        self.working
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_exist(op, key))
    }

    /// Writes the working set to storage as one full rewrite.
    ///
    /// The lock is kept; call [`rollback`](Self::rollback) (or drop the
    /// transaction) to release it. A failed commit leaves the transaction
    /// active.
    ///
    /// # Errors
    ///
    /// `Invalid` if the transaction is read-only or already committed,
    /// `Internal` if the save fails.
    pub fn commit(&mut self) -> CoreResult<()> {
        let op = Operation::Commit;
        self.ensure_writable(op, None)?;

        let dataset = self.working.to_dataset();
        self.db.save(op, None, &dataset)?;

        self.state = TransactionState::Committed;
        debug!(records = dataset.len(), "transaction committed");
        Ok(())
    }

    /// Ends the transaction and releases the database lock.
    ///
    /// Uncommitted changes are discarded.
    pub fn rollback(self) {
        debug!(
            writable = self.is_writable(),
            committed = self.state == TransactionState::Committed,
            "transaction released"
        );
    }

    fn ensure_writable(&self, op: Operation, key: Option<&str>) -> CoreResult<()> {
        if !self.is_writable() {
            return Err(CoreError::invalid(op, key, "transaction is read-only"));
        }
        self.state.ensure_active(op, key)
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("writable", &self.is_writable())
            .field("state", &self.state)
            .field("keys", &self.working.keys())
            .finish()
    }
}
