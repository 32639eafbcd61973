//! Database schema and migrations.

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;
use crate::registry::{BLOOD_PRESSURE_TABLE, METRIC_TABLES, WORKOUTS_TABLE};

/// Current schema version.
///
/// Version 2 added the vitals tables (HRV, glucose, body fat, BMI,
/// respiratory rate, oxygen saturation, body temperature).
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema.
pub fn initialize(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        // Fresh database - create all tables
        create_schema(conn, SCHEMA_VERSION)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version < SCHEMA_VERSION {
        migrate(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version, 0 for an empty database.
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 =
        conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
        [version],
    )?;
    Ok(())
}

/// Create every table up to and including `version`.
fn create_schema(conn: &Connection, version: i32) -> Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- One row per import
        CREATE TABLE IF NOT EXISTS sync_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sync_date TEXT NOT NULL,
            file_path TEXT,
            records_imported INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        -- Systolic and diastolic paired per reading; either side may be missing
        CREATE TABLE IF NOT EXISTS {BLOOD_PRESSURE_TABLE} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            systolic INTEGER,
            diastolic INTEGER,
            sync_id INTEGER REFERENCES sync_history(id)
        );
        CREATE INDEX IF NOT EXISTS idx_blood_pressure_date ON {BLOOD_PRESSURE_TABLE}(date);

        CREATE TABLE IF NOT EXISTS {WORKOUTS_TABLE} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            type TEXT NOT NULL,
            duration INTEGER NOT NULL,
            calories INTEGER NOT NULL,
            sync_id INTEGER REFERENCES sync_history(id)
        );
        CREATE INDEX IF NOT EXISTS idx_workouts_date ON {WORKOUTS_TABLE}(date);
        "#
    ))?;

    create_metric_tables(conn, 0, version)
}

/// Create the metric tables introduced after `from` and up to `to`.
fn create_metric_tables(conn: &Connection, from: i32, to: i32) -> Result<()> {
    for table in METRIC_TABLES
        .iter()
        .filter(|t| t.since_version > from && t.since_version <= to)
    {
        conn.execute_batch(&table.create_sql())?;
    }
    Ok(())
}

/// Run migrations from old_version to current.
fn migrate(conn: &Connection, old_version: i32) -> Result<()> {
    info!(
        "Migrating database schema from v{} to v{}",
        old_version, SCHEMA_VERSION
    );

    if old_version < 2 {
        create_metric_tables(conn, old_version, 2)?;
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_initialize_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let tables = table_names(&conn);
        for table in &METRIC_TABLES {
            assert!(tables.contains(&table.table.to_string()), "{}", table.table);
        }
        assert!(tables.contains(&"sync_history".to_string()));
        assert!(tables.contains(&"blood_pressure".to_string()));
        assert!(tables.contains(&"workouts".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_schema_version_tracking() {
        let conn = Connection::open_in_memory().unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        initialize(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // Initializing again is a no-op.
        initialize(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_from_v1_adds_vitals_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn, 1).unwrap();
        set_schema_version(&conn, 1).unwrap();

        let before = table_names(&conn);
        assert!(before.contains(&"weight".to_string()));
        assert!(!before.contains(&"body_fat".to_string()));

        initialize(&conn).unwrap();

        let after = table_names(&conn);
        assert!(after.contains(&"body_fat".to_string()));
        assert!(after.contains(&"heart_rate_variability".to_string()));
        assert_eq!(get_schema_version(&conn).unwrap(), 2);
    }

    #[test]
    fn test_daily_tables_reject_duplicate_dates() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        conn.execute("INSERT INTO steps (date, count) VALUES ('2024-01-15', 10)", [])
            .unwrap();
        let duplicate =
            conn.execute("INSERT INTO steps (date, count) VALUES ('2024-01-15', 20)", []);
        assert!(duplicate.is_err());

        conn.execute("INSERT INTO weight (date, kg) VALUES ('2024-01-15', 80.0)", [])
            .unwrap();
        conn.execute("INSERT INTO weight (date, kg) VALUES ('2024-01-15', 80.5)", [])
            .unwrap();
    }
}
