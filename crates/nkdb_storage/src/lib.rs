//! # nkdb Storage
//!
//! Storage backend trait and implementations for nkdb.
//!
//! Backends are **full-snapshot stores**: every `load` returns the whole
//! dataset and every `save` replaces it. They know nothing about keys,
//! locking or transactions; the core crate owns all of that.
//!
//! ## Design Principles
//!
//! - A dataset is an ordered `Vec` of [`Record`]s; order is preserved
//! - `load` on a store that has never been written returns an empty dataset
//! - `save` is a full, ordered replacement of the previous contents
//! - Must be `Send + Sync` for concurrent readers
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`CsvBackend`] - Delimited text file on disk
//! - [`CachedBackend`] - Wrapper that serves loads from a time-bounded snapshot
//!
//! ## Example
//!
//! ```rust
//! use nkdb_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.save(&[vec!["a".to_string(), "1".to_string()]]).unwrap();
//! assert_eq!(backend.load().unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod cached;
mod error;
mod file;
mod memory;

pub use backend::{Dataset, Record, StorageBackend};
pub use cached::CachedBackend;
pub use error::{StorageError, StorageResult};
pub use file::CsvBackend;
pub use memory::InMemoryBackend;
