//! Main store implementation.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use time::Date;
use time::macros::format_description;
use tracing::{debug, info};

use pulsebook_types::HealthDataset;

use crate::error::{Error, Result};
use crate::models::{SyncHistoryEntry, TableCount};
use crate::queries::DatasetQuery;
use crate::reader::DatasetReader;
use crate::registry::{BLOOD_PRESSURE_TABLE, METRIC_TABLES, WORKOUTS_TABLE};
use crate::schema;
use crate::writer::DatasetWriter;

/// SQLite-based store for imported health data.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Open an existing database read-only.
    ///
    /// Returns [`Error::Unavailable`] when the file does not exist. The
    /// schema is not created or migrated.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Unavailable(path.to_path_buf()));
        }

        debug!("Opening database read-only at {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrow the connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Writer over this store's connection.
    pub fn writer(&mut self) -> DatasetWriter<'_> {
        DatasetWriter::new(&mut self.conn)
    }

    /// Reader over this store's connection.
    pub fn reader(&self) -> DatasetReader<'_> {
        DatasetReader::new(&self.conn)
    }

    /// Current schema version.
    pub fn schema_version(&self) -> Result<i32> {
        schema::get_schema_version(&self.conn)
    }
}

// Dataset operations
impl Store {
    /// Write a dataset in one transaction and return its sync id.
    pub fn save_dataset(
        &mut self,
        dataset: &HealthDataset,
        sync_date: Date,
        source: Option<&str>,
    ) -> Result<i64> {
        let writer = self.writer();
        let writer = match source {
            Some(path) => writer.source(path),
            None => writer,
        };
        writer.write(dataset, sync_date)
    }

    /// Read a dataset back.
    pub fn load_dataset(&self, query: &DatasetQuery) -> Result<HealthDataset> {
        self.reader().read(query)
    }
}

// Sync history operations
impl Store {
    /// Date of the most recent import, by insertion order.
    pub fn last_sync_date(&self) -> Result<Option<Date>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT sync_date FROM sync_history ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|s| parse_date(&s)).transpose()
    }

    /// Import history, newest first.
    pub fn sync_history(&self, limit: Option<u32>) -> Result<Vec<SyncHistoryEntry>> {
        let mut sql = String::from(
            "SELECT id, sync_date, file_path, records_imported, created_at
             FROM sync_history ORDER BY id DESC",
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], |row| {
                Ok(SyncHistoryEntry {
                    id: row.get(0)?,
                    sync_date: row.get(1)?,
                    file_path: row.get(2)?,
                    records_imported: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Row count of every data table. Tables missing from an older schema
    /// are skipped.
    pub fn table_counts(&self) -> Result<Vec<TableCount>> {
        let tables = METRIC_TABLES
            .iter()
            .map(|t| t.table)
            .chain([BLOOD_PRESSURE_TABLE, WORKOUTS_TABLE, "sync_history"]);

        let mut counts = Vec::new();
        for table in tables {
            let exists: bool = self.conn.query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?",
                [table],
                |row| row.get(0),
            )?;
            if !exists {
                continue;
            }

            let rows: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            counts.push(TableCount {
                table: table.to_string(),
                rows: rows as u64,
            });
        }

        Ok(counts)
    }
}

pub(crate) fn parse_date(s: &str) -> Result<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(s.to_string()))
}
