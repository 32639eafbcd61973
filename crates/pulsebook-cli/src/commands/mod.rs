//! Command implementations for the CLI.

mod config;
mod history;
mod import;
mod info;
mod show;
mod summary;

use std::path::Path;

use anyhow::{Context, Result};
use pulsebook_store::Store;

pub use config::cmd_config;
pub use history::cmd_history;
pub use import::cmd_import;
pub use info::cmd_info;
pub use show::cmd_show;
pub use summary::cmd_summary;

/// Open the database if it exists, migrating older schemas, or `None` when
/// nothing has been imported yet.
pub(crate) fn open_if_exists(db_path: &Path) -> Result<Option<Store>> {
    if !db_path.exists() {
        return Ok(None);
    }
    let store = Store::open(db_path).context("Failed to open database")?;
    Ok(Some(store))
}
