//! Error types for nkdb core.

use nkdb_storage::StorageError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Listing keys.
    Keys,
    /// Reading one record.
    Get,
    /// Inserting or overwriting one record.
    Set,
    /// Removing one record.
    Delete,
    /// Running a read-only transaction.
    View,
    /// Running a writable transaction.
    Update,
    /// Starting a transaction.
    Begin,
    /// Persisting a transaction.
    Commit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Keys => "Keys",
            Self::Get => "Get",
            Self::Set => "Set",
            Self::Delete => "Delete",
            Self::View => "View",
            Self::Update => "Update",
            Self::Begin => "Begin",
            Self::Commit => "Commit",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The storage backend failed to load or save.
    Internal,
    /// The caller misused the API.
    Invalid,
    /// No record exists for the key.
    NotExist,
    /// The database lock was not acquired in time.
    Timeout,
}

/// Errors that can occur in nkdb core operations.
///
/// Every variant names the failing operation and, where one was involved,
/// the key.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("{op}{}: {source}", key_suffix(.key))]
    Internal {
        /// The failing operation.
        op: Operation,
        /// The key involved, if any.
        key: Option<String>,
        /// The storage failure.
        #[source]
        source: StorageError,
    },

    /// Caller misuse: malformed record, key mismatch, or a write through a
    /// read-only or finished transaction.
    #[error("{op}{}: {reason}", key_suffix(.key))]
    Invalid {
        /// The failing operation.
        op: Operation,
        /// The key involved, if any.
        key: Option<String>,
        /// Why the operation was rejected.
        reason: &'static str,
    },

    /// Record not found.
    #[error("{op} {key}: record does not exist")]
    NotExist {
        /// The failing operation.
        op: Operation,
        /// The key that was not found.
        key: String,
    },

    /// Lock wait exceeded the configured timeout.
    #[error("{op}{}: lock not acquired within {timeout:?}", key_suffix(.key))]
    Timeout {
        /// The failing operation.
        op: Operation,
        /// The key involved, if any.
        key: Option<String>,
        /// How long the operation waited.
        timeout: Duration,
    },
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_deref().map(|k| format!(" {k}")).unwrap_or_default()
}

impl CoreError {
    /// Creates an internal (storage) error.
    pub fn internal(op: Operation, key: Option<&str>, source: StorageError) -> Self {
        Self::Internal {
            op,
            key: key.map(str::to_string),
            source,
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid(op: Operation, key: Option<&str>, reason: &'static str) -> Self {
        Self::Invalid {
            op,
            key: key.map(str::to_string),
            reason,
        }
    }

    /// Creates a not-exist error.
    pub fn not_exist(op: Operation, key: &str) -> Self {
        Self::NotExist {
            op,
            key: key.to_string(),
        }
    }

    /// Creates a lock timeout error.
    pub fn timeout(op: Operation, key: Option<&str>, timeout: Duration) -> Self {
        Self::Timeout {
            op,
            key: key.map(str::to_string),
            timeout,
        }
    }

    /// Re-tags the error with the operation that surfaced it.
    pub(crate) fn with_op(mut self, new_op: Operation) -> Self {
        match &mut self {
            Self::Internal { op, .. }
            | Self::Invalid { op, .. }
            | Self::NotExist { op, .. }
            | Self::Timeout { op, .. } => *op = new_op,
        }
        self
    }

    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Invalid { .. } => ErrorKind::Invalid,
            Self::NotExist { .. } => ErrorKind::NotExist,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Returns the operation that failed.
    #[must_use]
    pub fn op(&self) -> Operation {
        match self {
            Self::Internal { op, .. }
            | Self::Invalid { op, .. }
            | Self::NotExist { op, .. }
            | Self::Timeout { op, .. } => *op,
        }
    }

    /// Returns the key involved, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Internal { key, .. } | Self::Invalid { key, .. } | Self::Timeout { key, .. } => {
                key.as_deref()
            }
            Self::NotExist { key, .. } => Some(key),
        }
    }

    /// Check if this is a storage failure.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Check if this is caller misuse.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.kind() == ErrorKind::Invalid
    }

    /// Check if this is a not-found error.
    #[must_use]
    pub fn is_not_exist(&self) -> bool {
        self.kind() == ErrorKind::NotExist
    }

    /// Check if this is a lock timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}
