//! Get command implementation.

use super::{check_format, write_json};
use nkdb_core::Database;
use serde::Serialize;
use std::io::Write;

/// A record as printed in JSON output.
#[derive(Debug, Serialize)]
pub struct RecordOutput<'a> {
    /// The key that was looked up.
    pub key: &'a str,
    /// The record's fields, in order.
    pub fields: Vec<String>,
}

/// Runs the get command.
pub fn run(
    db: &Database,
    key: &str,
    format: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    check_format(format)?;
    let fields = db.get(key)?;

    if format == "json" {
        return write_json(out, &RecordOutput { key, fields });
    }

    writeln!(out, "{}", fields.join(","))?;
    Ok(())
}
