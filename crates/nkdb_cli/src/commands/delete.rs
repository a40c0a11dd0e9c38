//! Delete command implementation.

use nkdb_core::Database;
use tracing::info;

/// Runs the delete command.
pub fn run(db: &Database, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    db.delete(key)?;
    info!(key, "record deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_present_and_absent() {
        let db = Database::open_in_memory(0);
        db.set("a", vec!["a".into()]).unwrap();

        run(&db, "a").unwrap();
        run(&db, "a").unwrap();

        assert!(db.keys().unwrap().is_empty());
    }
}
