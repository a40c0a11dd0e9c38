//! Key-field helpers shared by the database and transactions.

use crate::error::{CoreError, CoreResult, Operation};
use nkdb_storage::Record;
use tracing::trace;

/// Returns the key of a well-formed record.
///
/// Records too short to carry the key field are skipped by every scan,
/// never rejected. Each load reports them once through [`count_malformed`].
pub(crate) fn key_of(record: &Record, key_field: usize) -> Option<&str> {
    match record.get(key_field) {
        Some(key) => Some(key.as_str()),
        None => {
            trace!(
                key_field,
                fields = record.len(),
                "skipping record without key field"
            );
            None
        }
    }
}

/// Counts the records too short to carry the key field.
pub(crate) fn count_malformed(records: &[Record], key_field: usize) -> usize {
    records
        .iter()
        .filter(|record| record.len() <= key_field)
        .count()
}

/// Checks that `record` carries `key` in its key field.
pub(crate) fn validate(
    op: Operation,
    key: &str,
    record: &Record,
    key_field: usize,
) -> CoreResult<()> {
    match record.get(key_field) {
        None => Err(CoreError::invalid(
            op,
            Some(key),
            "record must have a key field",
        )),
        Some(field) if field != key => Err(CoreError::invalid(
            op,
            Some(key),
            "key must equal the record's key field",
        )),
        Some(_) => Ok(()),
    }
}
