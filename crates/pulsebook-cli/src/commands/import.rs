//! Import command - parse an export and commit it to the store.

use std::path::Path;

use anyhow::{Context, Result};
use pulsebook_core::import_file;
use pulsebook_store::Store;
use serde::Serialize;
use time::{Date, OffsetDateTime};
use tracing::info;

use crate::cli::{OutputArgs, OutputFormat};
use crate::config::Config;
use crate::format::as_json;

/// Result of a successful import, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub success: bool,
    pub sync_id: i64,
    pub records_imported: usize,
    pub skipped: usize,
    pub message: String,
}

/// Parse `file` and write it to `store` as one import.
///
/// Nothing is written when the document cannot be parsed.
pub fn run_import(store: &mut Store, file: &Path, sync_date: Date) -> Result<ImportOutcome> {
    let import = import_file(file)
        .with_context(|| format!("Failed to parse health export {}", file.display()))?;

    let source = file.display().to_string();
    let sync_id = store
        .save_dataset(&import.dataset, sync_date, Some(&source))
        .context("Failed to save health data")?;

    Ok(ImportOutcome {
        success: true,
        sync_id,
        records_imported: import.dataset.total_entries(),
        skipped: import.stats.skipped_total(),
        message: "Health data imported successfully".to_string(),
    })
}

/// Execute the import command.
pub fn cmd_import(file: &Path, output: &OutputArgs, db_path: &Path, config: &Config) -> Result<()> {
    let format = output.resolve_format(config);
    let today = OffsetDateTime::now_utc().date();

    let result = Store::open(db_path)
        .context("Failed to open database")
        .and_then(|mut store| run_import(&mut store, file, today));

    match (result, format) {
        (Ok(outcome), OutputFormat::Json) => {
            print!("{}", as_json(&outcome, output.compact)?);
        }
        (Ok(outcome), OutputFormat::Text) => {
            info!("Import {} written to {}", outcome.sync_id, db_path.display());
            println!("{}", outcome.message);
            println!("  Import ID: {}", outcome.sync_id);
            println!("  Entries:   {}", outcome.records_imported);
            if outcome.skipped > 0 {
                println!("  Skipped:   {} records", outcome.skipped);
            }
        }
        (Err(e), OutputFormat::Json) => {
            let failure = serde_json::json!({
                "success": false,
                "error": format!("{:#}", e),
            });
            print!("{}", as_json(&failure, output.compact)?);
            return Err(e);
        }
        (Err(e), OutputFormat::Text) => return Err(e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use time::macros::date;

    const EXPORT: &str = r#"<HealthData>
 <Record type="HKQuantityTypeIdentifierStepCount" startDate="2024-01-15 08:00:00 -0500" value="1200"/>
 <Record type="HKQuantityTypeIdentifierStepCount" startDate="2024-01-16 08:00:00 -0500" value="oops"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" startDate="2024-01-15 08:00:00 -0500" value="61"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeYoga" duration="30" startDate="2024-01-15 19:00:00 -0500"/>
</HealthData>"#;

    #[test]
    fn test_run_import_reports_counts() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("export.xml");
        fs::write(&file, EXPORT).unwrap();

        let mut store = Store::open_in_memory().unwrap();
        let outcome = run_import(&mut store, &file, date!(2024 - 01 - 17)).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.records_imported, 3);
        assert_eq!(outcome.skipped, 1);

        let history = store.sync_history(None).unwrap();
        assert_eq!(history[0].id, outcome.sync_id);
        assert_eq!(history[0].records_imported, 3);
        assert_eq!(history[0].file_path.as_deref(), Some(file.display().to_string().as_str()));
    }

    #[test]
    fn test_malformed_export_leaves_no_sync_row() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("export.xml");
        fs::write(&file, EXPORT.replace("</HealthData>", "")).unwrap();

        let mut store = Store::open_in_memory().unwrap();
        let err = run_import(&mut store, &file, date!(2024 - 01 - 17)).unwrap_err();

        assert!(format!("{err:#}").contains("Failed to parse health export"));
        assert!(store.sync_history(None).unwrap().is_empty());
        assert_eq!(store.last_sync_date().unwrap(), None);
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = ImportOutcome {
            success: true,
            sync_id: 7,
            records_imported: 42,
            skipped: 0,
            message: "Health data imported successfully".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["syncId"], 7);
        assert_eq!(value["recordsImported"], 42);
    }

    #[test]
    fn test_cmd_import_writes_database() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("export.xml");
        let db = dir.path().join("data").join("health.db");
        fs::write(&file, EXPORT).unwrap();

        let output = OutputArgs {
            format: Some(OutputFormat::Json),
            compact: true,
        };
        cmd_import(&file, &output, &db, &Config::default()).unwrap();

        let store = Store::open_existing(&db).unwrap();
        assert_eq!(store.sync_history(None).unwrap().len(), 1);
    }
}
