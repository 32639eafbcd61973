//! Reader: rebuilds a [`HealthDataset`] from the store.

use rusqlite::Connection;
use tracing::debug;

use pulsebook_types::{HealthDataset, Metric, SeriesPoint, WorkoutRecord};

use crate::error::Result;
use crate::queries::DatasetQuery;
use crate::registry::{BLOOD_PRESSURE_TABLE, METRIC_TABLES, MetricTable, WORKOUTS_TABLE};

/// Reads datasets through a borrowed connection.
pub struct DatasetReader<'c> {
    conn: &'c Connection,
}

impl<'c> DatasetReader<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Read every series selected by `query`, sorted by key.
    pub fn read(&self, query: &DatasetQuery) -> Result<HealthDataset> {
        let mut dataset = HealthDataset::new();

        for table in METRIC_TABLES.iter().filter(|t| query.includes(t.metric)) {
            dataset.set_series(table.metric, self.read_table(table, query)?);
        }

        if query.includes(Metric::BloodPressureSystolic)
            || query.includes(Metric::BloodPressureDiastolic)
        {
            let (systolic, diastolic) = self.read_blood_pressure(query)?;
            if query.includes(Metric::BloodPressureSystolic) {
                dataset.set_series(Metric::BloodPressureSystolic, systolic);
            }
            if query.includes(Metric::BloodPressureDiastolic) {
                dataset.set_series(Metric::BloodPressureDiastolic, diastolic);
            }
        }

        if !query.skip_workouts {
            dataset.set_workouts(self.read_workouts(query)?);
        }

        Ok(dataset)
    }

    fn read_table(&self, table: &MetricTable, query: &DatasetQuery) -> Result<Vec<SeriesPoint>> {
        let (where_clause, params) = query.build_where(table.key_column);
        let sql = table.select_sql(&where_clause);
        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let points = stmt
            .query_map(params_ref.as_slice(), |row| {
                Ok(SeriesPoint::new(row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(points)
    }

    /// Split merged rows back into two series, keeping only present sides.
    fn read_blood_pressure(
        &self,
        query: &DatasetQuery,
    ) -> Result<(Vec<SeriesPoint>, Vec<SeriesPoint>)> {
        let (where_clause, params) = query.build_where("date");
        let sql = format!(
            "SELECT date, systolic, diastolic FROM {BLOOD_PRESSURE_TABLE} {where_clause} ORDER BY date, id"
        );
        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_ref.as_slice(), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut systolic = Vec::new();
        let mut diastolic = Vec::new();
        for (date, sys, dia) in rows {
            if let Some(value) = sys {
                systolic.push(SeriesPoint::new(date.clone(), value));
            }
            if let Some(value) = dia {
                diastolic.push(SeriesPoint::new(date, value));
            }
        }

        Ok((systolic, diastolic))
    }

    fn read_workouts(&self, query: &DatasetQuery) -> Result<Vec<WorkoutRecord>> {
        let (where_clause, params) = query.build_where("date");
        let sql = format!(
            "SELECT date, type, duration, calories FROM {WORKOUTS_TABLE} {where_clause} ORDER BY date, id"
        );
        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let workouts = stmt
            .query_map(params_ref.as_slice(), |row| {
                Ok(WorkoutRecord {
                    date: row.get(0)?,
                    activity: row.get(1)?,
                    duration: row.get(2)?,
                    calories: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(workouts)
    }
}
