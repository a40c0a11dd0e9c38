//! # nkdb Core
//!
//! Keyed record store over a full-snapshot storage backend.
//!
//! This crate provides:
//! - [`Database`] with single-shot `keys`/`get`/`set`/`delete`
//! - Snapshot [`Transaction`]s that buffer changes and commit as one rewrite
//! - A single reader/writer lock serializing writers against everyone
//!
//! ## Example
//!
//! ```rust
//! use nkdb_core::Database;
//!
//! let db = Database::open_in_memory(0);
//! db.set("a", vec!["a".into(), "1".into()]).unwrap();
//!
//! db.update(|tx| {
//!     let mut record = tx.get("a")?;
//!     record[1] = "2".into();
//!     tx.set("a", record)
//! })
//! .unwrap();
//!
//! assert_eq!(db.get("a").unwrap(), vec!["a".to_string(), "2".to_string()]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod record;
#[cfg(test)]
mod testing;
mod transaction;

pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult, ErrorKind, Operation};
pub use nkdb_storage::{Dataset, Record};
pub use transaction::{Transaction, TransactionState};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
