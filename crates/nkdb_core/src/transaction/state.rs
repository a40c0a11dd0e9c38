//! Transaction state.

use crate::error::{CoreError, CoreResult, Operation};

/// State of a transaction.
///
/// A rolled-back transaction has been consumed, so it has no state to
/// observe; `Committed` is the only terminal state a live handle can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can perform operations.
    Active,
    /// Transaction has been committed and only awaits rollback.
    Committed,
}

impl TransactionState {
    /// Ensures the transaction is still active.
    pub(crate) fn ensure_active(self, op: Operation, key: Option<&str>) -> CoreResult<()> {
        match self {
            Self::Active => Ok(()),
            Self::Committed => Err(CoreError::invalid(op, key, "transaction already committed")),
        }
    }
}
