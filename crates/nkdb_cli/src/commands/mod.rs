//! CLI command implementations.

pub mod delete;
pub mod get;
pub mod keys;
pub mod set;

use std::io::Write;

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: serde::Serialize>(
    out: &mut impl Write,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Rejects output formats other than `text` and `json`.
pub(crate) fn check_format(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(format!("Unknown format: {other} (use text or json)").into()),
    }
}
