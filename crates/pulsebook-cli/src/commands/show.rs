//! Show command - print stored series.

use std::path::Path;

use anyhow::{Context, Result};
use pulsebook_store::DatasetQuery;
use pulsebook_types::{HealthDataset, Metric};

use crate::cli::{OutputArgs, OutputFormat};
use crate::config::{Config, resolve_days};
use crate::format::{format_dataset_json, format_dataset_text};
use super::open_if_exists;

/// Build the query for `show` from its arguments.
pub(crate) fn build_query(days: Option<u32>, metrics: &[Metric]) -> DatasetQuery {
    let mut query = DatasetQuery::new();
    if let Some(days) = days {
        query = query.days_back(days);
    }
    for metric in metrics {
        query = query.metric(*metric);
    }
    query
}

/// Execute the show command.
pub fn cmd_show(
    days: Option<u32>,
    all: bool,
    metrics: &[Metric],
    output: &OutputArgs,
    db_path: &Path,
    config: &Config,
) -> Result<()> {
    let query = build_query(resolve_days(days, all, config), metrics);

    let (dataset, last_sync) = match open_if_exists(db_path)? {
        Some(store) => (
            store.load_dataset(&query).context("Failed to load health data")?,
            store.last_sync_date()?.map(|d| d.to_string()),
        ),
        None => (HealthDataset::new(), None),
    };

    match output.resolve_format(config) {
        OutputFormat::Json => {
            print!(
                "{}",
                format_dataset_json(&dataset, last_sync.as_deref(), output.compact)?
            );
        }
        OutputFormat::Text => print!("{}", format_dataset_text(&dataset, last_sync.as_deref())),
    }

    Ok(())
}
