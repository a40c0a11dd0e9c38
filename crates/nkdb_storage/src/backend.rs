//! Storage backend trait definition.

use crate::error::StorageResult;

/// One stored entity: an ordered sequence of text fields.
pub type Record = Vec<String>;

/// The full ordered sequence of records as persisted at one instant.
pub type Dataset = Vec<Record>;

/// A whole-dataset storage backend for nkdb.
///
/// Backends are **full-snapshot stores**. There is no append, seek or
/// partial read: callers load everything, work in memory and write
/// everything back.
///
/// # Invariants
///
/// - `load` returns records in the order of the last successful `save`
/// - `load` returns an empty dataset (not an error) when nothing was saved yet
/// - `save` replaces the previous contents entirely
/// - Backends must be `Send + Sync`; concurrent `load` calls are allowed
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::CsvBackend`] - For persistent storage
/// - [`super::CachedBackend`] - Decorates another backend
pub trait StorageBackend: Send + Sync {
    /// Loads the entire dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read or parsed.
    /// A store that does not exist yet is not an error.
    fn load(&self) -> StorageResult<Dataset>;

    /// Replaces the entire dataset with `records`, in order.
    ///
    /// After this returns successfully the new dataset is expected to be
    /// durable from the caller's point of view.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The persisted state after a
    /// failed save is unspecified.
    fn save(&self, records: &[Record]) -> StorageResult<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn load(&self) -> StorageResult<Dataset> {
        (**self).load()
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        (**self).save(records)
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<B> {
    fn load(&self) -> StorageResult<Dataset> {
        (**self).load()
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        (**self).save(records)
    }
}
