//! Persistence writer: commits one dataset in one transaction.

use std::collections::BTreeMap;

use rusqlite::{Connection, Transaction, params};
use time::Date;
use tracing::{debug, info, warn};

use pulsebook_types::{HealthDataset, Metric};

use crate::error::{Error, Result};
use crate::registry::{BLOOD_PRESSURE_TABLE, METRIC_TABLES, MetricTable, SqlType, WORKOUTS_TABLE};

/// One `blood_pressure` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BloodPressureRow<'a> {
    pub date: &'a str,
    pub systolic: Option<i64>,
    pub diastolic: Option<i64>,
}

/// Writes a [`HealthDataset`] to the store.
///
/// All rows of one import, plus its `sync_history` entry, are written in a
/// single transaction. If any statement fails nothing is kept.
pub struct DatasetWriter<'c> {
    conn: &'c mut Connection,
    source: Option<String>,
}

impl<'c> DatasetWriter<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn, source: None }
    }

    /// Record the export file the dataset was read from.
    pub fn source(mut self, path: impl Into<String>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Write the dataset and return the new sync id.
    ///
    /// Daily metrics and resting heart rate replace any existing row for the
    /// same date. Everything else is appended.
    pub fn write(self, dataset: &HealthDataset, sync_date: Date) -> Result<i64> {
        let tx = self.conn.transaction().map_err(Error::transaction)?;

        let sync_id = match write_all(&tx, dataset, sync_date, self.source.as_deref()) {
            Ok(id) => id,
            Err(e) => {
                // Dropping the transaction rolls it back.
                warn!("Import failed, rolling back: {}", e);
                return Err(Error::transaction(e));
            }
        };

        tx.commit().map_err(Error::transaction)?;
        info!(
            "Committed import {} ({} entries)",
            sync_id,
            dataset.total_entries()
        );
        Ok(sync_id)
    }
}

fn write_all(
    tx: &Transaction<'_>,
    dataset: &HealthDataset,
    sync_date: Date,
    source: Option<&str>,
) -> rusqlite::Result<i64> {
    tx.execute(
        "INSERT INTO sync_history (sync_date, file_path, records_imported) VALUES (?1, ?2, ?3)",
        params![sync_date.to_string(), source, dataset.total_entries() as i64],
    )?;
    let sync_id = tx.last_insert_rowid();

    for table in &METRIC_TABLES {
        write_metric(tx, table, dataset, sync_id)?;
    }
    write_blood_pressure(tx, dataset, sync_id)?;
    write_workouts(tx, dataset, sync_id)?;

    Ok(sync_id)
}

fn write_metric(
    tx: &Transaction<'_>,
    table: &MetricTable,
    dataset: &HealthDataset,
    sync_id: i64,
) -> rusqlite::Result<()> {
    let points = dataset.series(table.metric);
    if points.is_empty() {
        return Ok(());
    }

    let mut stmt = tx.prepare_cached(&table.insert_sql())?;
    for point in points {
        match table.sql_type() {
            SqlType::Integer => stmt.execute(params![point.key, point.value as i64, sync_id])?,
            SqlType::Real => stmt.execute(params![point.key, point.value, sync_id])?,
        };
    }

    debug!("Wrote {} rows to {}", points.len(), table.table);
    Ok(())
}

fn write_blood_pressure(
    tx: &Transaction<'_>,
    dataset: &HealthDataset,
    sync_id: i64,
) -> rusqlite::Result<()> {
    let rows = pair_blood_pressure(dataset);
    if rows.is_empty() {
        return Ok(());
    }

    let mut stmt = tx.prepare_cached(&format!(
        "INSERT INTO {BLOOD_PRESSURE_TABLE} (date, systolic, diastolic, sync_id) VALUES (?1, ?2, ?3, ?4)"
    ))?;
    for row in &rows {
        stmt.execute(params![row.date, row.systolic, row.diastolic, sync_id])?;
    }

    debug!("Wrote {} rows to {}", rows.len(), BLOOD_PRESSURE_TABLE);
    Ok(())
}

fn write_workouts(tx: &Transaction<'_>, dataset: &HealthDataset, sync_id: i64) -> rusqlite::Result<()> {
    let workouts = dataset.workouts();
    if workouts.is_empty() {
        return Ok(());
    }

    let mut stmt = tx.prepare_cached(&format!(
        "INSERT INTO {WORKOUTS_TABLE} (date, type, duration, calories, sync_id) VALUES (?1, ?2, ?3, ?4, ?5)"
    ))?;
    for workout in workouts {
        stmt.execute(params![
            workout.date,
            workout.activity,
            workout.duration,
            workout.calories,
            sync_id
        ])?;
    }

    debug!("Wrote {} rows to {}", workouts.len(), WORKOUTS_TABLE);
    Ok(())
}

/// Merge systolic and diastolic series into rows.
///
/// Readings are grouped by date and paired by position within the date:
/// the first systolic of a day with the first diastolic, and so on. A side
/// without a partner is stored as NULL.
pub(crate) fn pair_blood_pressure(dataset: &HealthDataset) -> Vec<BloodPressureRow<'_>> {
    let mut by_date: BTreeMap<&str, (Vec<i64>, Vec<i64>)> = BTreeMap::new();

    for point in dataset.series(Metric::BloodPressureSystolic) {
        by_date.entry(point.date()).or_default().0.push(point.value as i64);
    }
    for point in dataset.series(Metric::BloodPressureDiastolic) {
        by_date.entry(point.date()).or_default().1.push(point.value as i64);
    }

    let mut rows = Vec::new();
    for (date, (systolic, diastolic)) in by_date {
        for i in 0..systolic.len().max(diastolic.len()) {
            rows.push(BloodPressureRow {
                date,
                systolic: systolic.get(i).copied(),
                diastolic: diastolic.get(i).copied(),
            });
        }
    }
    rows
}
