//! History command - list past imports.

use std::path::Path;

use anyhow::Result;

use crate::cli::{OutputArgs, OutputFormat};
use crate::config::Config;
use crate::format::{as_json, format_history_text};
use super::open_if_exists;

/// Execute the history command.
pub fn cmd_history(limit: u32, output: &OutputArgs, db_path: &Path, config: &Config) -> Result<()> {
    let limit = (limit > 0).then_some(limit);
    let entries = match open_if_exists(db_path)? {
        Some(store) => store.sync_history(limit)?,
        None => Vec::new(),
    };

    match output.resolve_format(config) {
        OutputFormat::Json => print!("{}", as_json(&entries, output.compact)?),
        OutputFormat::Text => print!("{}", format_history_text(&entries)),
    }

    Ok(())
}
