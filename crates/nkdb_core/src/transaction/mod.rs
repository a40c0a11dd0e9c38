//! Snapshot transactions.
//!
//! A transaction loads the whole dataset once, under the database lock,
//! and works on an in-memory copy from then on:
//! - **Isolation**: the lock is held from `begin` until the transaction
//!   is rolled back or dropped, so the snapshot never changes underneath it
//! - **Atomicity**: `commit` writes the working set back with one `save`
//! - **Exclusivity**: writable transactions hold the lock exclusively

mod handle;
mod state;
mod working_set;

pub(crate) use handle::LockGuard;
pub use handle::Transaction;
pub use state::TransactionState;
