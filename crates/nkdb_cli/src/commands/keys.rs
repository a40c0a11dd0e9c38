//! Keys command implementation.

use super::{check_format, write_json};
use nkdb_core::Database;
use std::io::Write;

/// Runs the keys command.
pub fn run(
    db: &Database,
    format: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    check_format(format)?;
    let keys = db.keys()?;

    if format == "json" {
        return write_json(out, &keys);
    }

    for key in keys {
        writeln!(out, "{key}")?;
    }
    Ok(())
}
