//! Set command implementation.

use nkdb_core::Database;
use tracing::info;

/// Runs the set command.
///
/// The key is read from the record's own key field.
pub fn run(db: &Database, fields: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let key_field = db.key_field();
    let key = fields
        .get(key_field)
        .cloned()
        .ok_or_else(|| format!("Record has no field at key index {key_field}"))?;

    db.set(&key, fields)?;
    info!(key = %key, "record stored");
    Ok(())
}
