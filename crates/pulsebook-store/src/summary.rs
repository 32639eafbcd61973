//! Companion snapshot: a narrow, read-only view of the last week.
//!
//! Built for small always-on displays. It reads only a handful of tables
//! and never creates or migrates the database.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use time::{Date, Duration};

use pulsebook_types::{Metric, round_half_up, round_to};

use crate::error::{Error, Result};
use crate::registry::table_for;
use crate::store::Store;

/// Days covered by the activity window.
pub const WINDOW_DAYS: i64 = 7;

/// Activity for the current day, or the most recent day with data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodayTotals {
    pub sleep: f64,
    pub steps: i64,
    pub energy: i64,
    pub exercise: i64,
    pub stand: i64,
}

/// Averages over the activity window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Averages {
    /// Hours, one decimal.
    pub sleep: f64,
    pub steps: i64,
}

/// Latest body measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub weight: Option<f64>,
    /// Only readings inside the activity window count.
    #[serde(rename = "restingHR")]
    pub resting_hr: Option<i64>,
    pub vo2_max: Option<f64>,
}

/// The whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionSnapshot {
    pub today: TodayTotals,
    pub averages: Averages,
    pub vitals: Vitals,
    /// Date of the newest sleep entry, or yesterday when there is none.
    pub last_updated: String,
}

impl CompanionSnapshot {
    /// Load the snapshot from the database at `path`.
    ///
    /// A missing database is not an error: it means nothing has been
    /// imported yet, and `Ok(None)` is returned.
    pub fn load(path: &Path, today: Date) -> Result<Option<Self>> {
        match Store::open_existing(path) {
            Ok(store) => Self::from_store(&store, today).map(Some),
            Err(Error::Unavailable(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Build the snapshot from an open store.
    pub fn from_store(store: &Store, today: Date) -> Result<Self> {
        let conn = store.connection();
        let since = today
            .checked_sub(Duration::days(WINDOW_DAYS))
            .unwrap_or(Date::MIN);
        let today_key = today.to_string();

        let sleep = recent(conn, Metric::Sleep, since)?;
        let steps = recent(conn, Metric::Steps, since)?;
        let energy = recent(conn, Metric::ActiveEnergy, since)?;
        let exercise = recent(conn, Metric::ExerciseMinutes, since)?;
        let stand = recent(conn, Metric::StandHours, since)?;

        let today_totals = TodayTotals {
            sleep: pick_today(&sleep, &today_key).unwrap_or(0.0),
            steps: pick_today(&steps, &today_key).map_or(0, |v| v as i64),
            energy: pick_today(&energy, &today_key).map_or(0, |v| v as i64),
            exercise: pick_today(&exercise, &today_key).map_or(0, |v| v as i64),
            stand: pick_today(&stand, &today_key).map_or(0, |v| v as i64),
        };

        let averages = Averages {
            sleep: average(&sleep).map_or(0.0, |v| round_to(v, 1)),
            steps: average(&steps).map_or(0, |v| round_half_up(v) as i64),
        };

        let vitals = Vitals {
            weight: latest(conn, Metric::Weight, None)?,
            resting_hr: latest(conn, Metric::RestingHeartRate, Some(since))?.map(|v| v as i64),
            vo2_max: latest(conn, Metric::Vo2Max, None)?,
        };

        let last_updated = match sleep.first() {
            Some((date, _)) => date.clone(),
            None => today
                .previous_day()
                .map_or_else(|| today_key.clone(), |d| d.to_string()),
        };

        Ok(Self {
            today: today_totals,
            averages,
            vitals,
            last_updated,
        })
    }
}

/// Up to [`WINDOW_DAYS`] rows on or after `since`, newest first.
fn recent(conn: &Connection, metric: Metric, since: Date) -> Result<Vec<(String, f64)>> {
    let Some(table) = table_for(metric) else {
        return Ok(Vec::new());
    };

    let sql = format!(
        "SELECT {key}, {value} FROM {table} WHERE {key} >= ?1 ORDER BY {key} DESC LIMIT {WINDOW_DAYS}",
        key = table.key_column,
        value = table.value_column,
        table = table.table,
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([since.to_string()], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Most recent value of a metric, optionally no older than `since`.
fn latest(conn: &Connection, metric: Metric, since: Option<Date>) -> Result<Option<f64>> {
    let Some(table) = table_for(metric) else {
        return Ok(None);
    };

    let filter = if since.is_some() {
        format!("WHERE {} >= ?1", table.key_column)
    } else {
        String::new()
    };
    let sql = format!(
        "SELECT {value} FROM {table} {filter} ORDER BY {key} DESC, id DESC LIMIT 1",
        value = table.value_column,
        table = table.table,
        key = table.key_column,
    );

    let mut stmt = conn.prepare(&sql)?;
    let value = match since {
        Some(since) => stmt.query_row([since.to_string()], |row| row.get(0)),
        None => stmt.query_row([], |row| row.get(0)),
    }
    .optional()?;
    Ok(value)
}

/// Today's value if present, else the newest.
fn pick_today(rows: &[(String, f64)], today: &str) -> Option<f64> {
    rows.iter()
        .find(|(date, _)| date == today)
        .or_else(|| rows.first())
        .map(|(_, value)| *value)
}

fn average(rows: &[(String, f64)]) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let total: f64 = rows.iter().map(|(_, v)| v).sum();
    Some(total / rows.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsebook_types::{HealthDataset, SeriesPoint};
    use time::macros::date;

    fn points(values: &[(&str, f64)]) -> Vec<SeriesPoint> {
        values.iter().map(|(k, v)| SeriesPoint::new(*k, *v)).collect()
    }

    #[test]
    fn test_pick_today_falls_back_to_newest() {
        let rows = vec![
            ("2024-01-16".to_string(), 3.0),
            ("2024-01-15".to_string(), 2.0),
        ];
        assert_eq!(pick_today(&rows, "2024-01-15"), Some(2.0));
        assert_eq!(pick_today(&rows, "2024-01-20"), Some(3.0));
        assert_eq!(pick_today(&[], "2024-01-20"), None);
    }

    #[test]
    fn test_snapshot_from_store() {
        let mut store = Store::open_in_memory().unwrap();
        let dataset = HealthDataset::new()
            .with_series(
                Metric::Sleep,
                points(&[("2024-01-01", 9.0), ("2024-01-14", 7.0), ("2024-01-15", 6.5)]),
            )
            .with_series(
                Metric::Steps,
                points(&[("2024-01-13", 1000.0), ("2024-01-14", 2001.0)]),
            )
            .with_series(Metric::Weight, points(&[("2023-06-01", 81.0), ("2023-12-01", 80.5)]))
            .with_series(Metric::RestingHeartRate, points(&[("2023-12-01", 55.0)]))
            .with_series(Metric::Vo2Max, points(&[("2024-01-10", 42.3)]));
        store
            .save_dataset(&dataset, date!(2024 - 01 - 16), None)
            .unwrap();

        let snapshot = CompanionSnapshot::from_store(&store, date!(2024 - 01 - 15)).unwrap();

        assert_eq!(snapshot.today.sleep, 6.5);
        assert_eq!(snapshot.today.steps, 2001);
        assert_eq!(snapshot.today.energy, 0);
        // 2024-01-01 falls outside the window.
        assert_eq!(snapshot.averages.sleep, 6.8);
        assert_eq!(snapshot.averages.steps, 1501);
        assert_eq!(snapshot.vitals.weight, Some(80.5));
        assert_eq!(snapshot.vitals.resting_hr, None);
        assert_eq!(snapshot.vitals.vo2_max, Some(42.3));
        assert_eq!(snapshot.last_updated, "2024-01-15");
    }

    #[test]
    fn test_empty_store_uses_yesterday() {
        let store = Store::open_in_memory().unwrap();
        let snapshot = CompanionSnapshot::from_store(&store, date!(2024 - 03 - 01)).unwrap();

        assert_eq!(snapshot.today, TodayTotals::default());
        assert_eq!(snapshot.vitals, Vitals::default());
        assert_eq!(snapshot.last_updated, "2024-02-29");
    }

    #[test]
    fn test_json_field_names() {
        let store = Store::open_in_memory().unwrap();
        let snapshot = CompanionSnapshot::from_store(&store, date!(2024 - 03 - 01)).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json["vitals"].get("restingHR").is_some());
        assert!(json["vitals"].get("vo2Max").is_some());
        assert_eq!(json["lastUpdated"], "2024-02-29");
    }

    #[test]
    fn test_load_missing_database_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot =
            CompanionSnapshot::load(&dir.path().join("health.db"), date!(2024 - 03 - 01)).unwrap();
        assert!(snapshot.is_none());
    }
}
