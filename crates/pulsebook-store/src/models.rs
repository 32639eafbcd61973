//! Data models for stored data.

use serde::{Deserialize, Serialize};

/// One import, as recorded in `sync_history`.
///
/// Every row written by that import carries `id` as its `sync_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncHistoryEntry {
    /// Database row ID.
    pub id: i64,
    /// Calendar date of the import (`YYYY-MM-DD`).
    pub sync_date: String,
    /// Export file the data came from, if known.
    pub file_path: Option<String>,
    /// Number of entries written across all series and workouts.
    pub records_imported: i64,
    /// SQLite timestamp of the insert.
    pub created_at: String,
}

/// Row count of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub rows: u64,
}
