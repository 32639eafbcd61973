//! Summary command - the companion snapshot.

use std::path::Path;

use anyhow::{Context, Result};
use pulsebook_store::CompanionSnapshot;
use time::OffsetDateTime;

use crate::cli::{OutputArgs, OutputFormat};
use crate::config::Config;
use crate::format::{as_json, format_snapshot_text};

/// Execute the summary command.
///
/// Opens the database read-only. A missing database prints "no data"
/// (`null` in JSON) rather than failing.
pub fn cmd_summary(output: &OutputArgs, db_path: &Path, config: &Config) -> Result<()> {
    let today = OffsetDateTime::now_utc().date();
    let snapshot =
        CompanionSnapshot::load(db_path, today).context("Failed to read health summary")?;

    match output.resolve_format(config) {
        OutputFormat::Json => print!("{}", as_json(&snapshot, output.compact)?),
        OutputFormat::Text => print!("{}", format_snapshot_text(snapshot.as_ref())),
    }

    Ok(())
}
