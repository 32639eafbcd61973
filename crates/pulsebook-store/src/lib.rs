//! Local SQLite persistence for imported health data.
//!
//! This crate stores [`HealthDataset`](pulsebook_types::HealthDataset)s in
//! one table per metric and reads them back.
//!
//! # Features
//!
//! - Table-driven layout ([`METRIC_TABLES`]) shared by writer, reader and schema
//! - One transaction per import, stamped with a `sync_history` id
//! - Upsert by date for daily metrics, append for point samples
//! - Lookback queries and a read-only companion snapshot
//!
//! # Example
//!
//! ```no_run
//! use pulsebook_store::{DatasetQuery, Store};
//!
//! let store = Store::open_default()?;
//!
//! let last_week = store.load_dataset(&DatasetQuery::new().days_back(7))?;
//! println!("{} entries since {:?}", last_week.total_entries(), store.last_sync_date()?);
//! # Ok::<(), pulsebook_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod reader;
mod registry;
mod schema;
mod store;
mod summary;
mod writer;

pub use error::{Error, Result};
pub use models::{SyncHistoryEntry, TableCount};
pub use queries::DatasetQuery;
pub use reader::DatasetReader;
pub use registry::{
    BLOOD_PRESSURE_TABLE, ConflictPolicy, METRIC_TABLES, MetricTable, SqlType, WORKOUTS_TABLE,
    table_for,
};
pub use schema::SCHEMA_VERSION;
pub use store::Store;
pub use summary::{Averages, CompanionSnapshot, TodayTotals, Vitals, WINDOW_DAYS};
pub use writer::DatasetWriter;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/pulsebook/health.db`
/// - macOS: `~/Library/Application Support/pulsebook/health.db`
/// - Windows: `C:\Users\<user>\AppData\Local\pulsebook\health.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pulsebook")
        .join("health.db")
}
