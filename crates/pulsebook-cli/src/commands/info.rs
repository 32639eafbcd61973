//! Info command - database location, size and contents.

use std::path::Path;

use anyhow::Result;
use pulsebook_store::Store;

use crate::cli::{OutputArgs, OutputFormat};
use crate::config::Config;
use crate::format::{as_json, format_table_counts_text};
use super::open_if_exists;

/// Execute the info command.
///
/// Does not create the database when it is missing.
pub fn cmd_info(output: &OutputArgs, db_path: &Path, config: &Config) -> Result<()> {
    let store = open_if_exists(db_path)?;

    let size = match &store {
        Some(_) => Some(std::fs::metadata(db_path)?.len()),
        None => None,
    };
    let schema_version = store.as_ref().map(Store::schema_version).transpose()?;
    let counts = store
        .as_ref()
        .map(Store::table_counts)
        .transpose()?
        .unwrap_or_default();
    let last_sync = store
        .as_ref()
        .map(Store::last_sync_date)
        .transpose()?
        .flatten();

    match output.resolve_format(config) {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "path": db_path.display().to_string(),
                "exists": store.is_some(),
                "sizeBytes": size,
                "schemaVersion": schema_version,
                "lastSync": last_sync.map(|d| d.to_string()),
                "tables": counts,
            });
            print!("{}", as_json(&value, output.compact)?);
        }
        OutputFormat::Text => {
            println!("Database path: {}", db_path.display());
            match size {
                Some(bytes) => println!("Database size: {} KB", bytes / 1024),
                None => {
                    println!("Database does not exist yet. Run 'pulsebook import <FILE>' to create it.");
                    return Ok(());
                }
            }
            if let Some(version) = schema_version {
                println!("Schema version: {}", version);
            }
            if let Some(date) = last_sync {
                println!("Last import: {}", date);
            }
            print!("{}", format_table_counts_text(&counts));
        }
    }

    Ok(())
}
