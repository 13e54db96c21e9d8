//! DDL artifact output
//!
//! Writes the full generated plan for one target to a file: drops, then
//! creates, then per-table modify statements, one per line with a `;`
//! terminator.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;

use crate::error::Result;
use crate::schema::diff::DiffPlan;

/// Write a target's generated DDL to its artifact file
pub fn write_ddl_file(path: &Path, database: &str, plan: &DiffPlan) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "-- DDL for `{}`", database)?;
    writeln!(
        writer,
        "-- Generated at {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(writer)?;

    for statement in plan.all_statements() {
        writer.write_all(statement.as_bytes())?;
        writer.write_all(b";\n")?;
    }

    writer.flush()?;
    Ok(())
}
