//! Table registry: which table, columns and conflict policy hold each metric.
//!
//! Writer, reader and schema all iterate [`METRIC_TABLES`], so adding a
//! metric is a new entry here rather than new statements. Blood pressure
//! (two metrics merged into one row) and workouts have dedicated tables.

use pulsebook_types::Metric;

/// Table holding merged systolic and diastolic readings.
pub const BLOOD_PRESSURE_TABLE: &str = "blood_pressure";

/// Table holding workouts.
pub const WORKOUTS_TABLE: &str = "workouts";

/// What happens when a row for an existing key is written again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// One row per date; a re-import overwrites value and sync id.
    UpsertByDate,
    /// Every write adds rows. Re-importing duplicates them.
    Append,
}

/// SQLite column type of a value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

/// Storage layout of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricTable {
    pub metric: Metric,
    pub table: &'static str,
    pub key_column: &'static str,
    pub value_column: &'static str,
    pub policy: ConflictPolicy,
    /// Schema version that introduced the table.
    pub since_version: i32,
}

const fn daily(metric: Metric, table: &'static str, value_column: &'static str) -> MetricTable {
    MetricTable {
        metric,
        table,
        key_column: "date",
        value_column,
        policy: ConflictPolicy::UpsertByDate,
        since_version: 1,
    }
}

const fn events(
    metric: Metric,
    table: &'static str,
    value_column: &'static str,
    since_version: i32,
) -> MetricTable {
    MetricTable {
        metric,
        table,
        key_column: "date",
        value_column,
        policy: ConflictPolicy::Append,
        since_version,
    }
}

/// Every metric stored in its own table, in [`Metric::ALL`] order.
pub const METRIC_TABLES: [MetricTable; 22] = [
    daily(Metric::Sleep, "sleep", "hours"),
    daily(Metric::Steps, "steps", "count"),
    daily(Metric::Distance, "distance", "km"),
    daily(Metric::FlightsClimbed, "flights_climbed", "count"),
    daily(Metric::ActiveEnergy, "active_energy", "calories"),
    daily(Metric::RestingEnergy, "resting_energy", "calories"),
    daily(Metric::ExerciseMinutes, "exercise_minutes", "minutes"),
    daily(Metric::StandHours, "stand_hours", "hours"),
    daily(Metric::MindfulMinutes, "mindful_minutes", "minutes"),
    daily(Metric::Water, "water", "ml"),
    daily(Metric::Caffeine, "caffeine", "mg"),
    MetricTable {
        metric: Metric::HeartRate,
        table: "heart_rate",
        key_column: "timestamp",
        value_column: "bpm",
        policy: ConflictPolicy::Append,
        since_version: 1,
    },
    events(Metric::Vo2Max, "vo2_max", "value", 1),
    // Point samples, but kept one per date like the daily tables.
    daily(Metric::RestingHeartRate, "resting_heart_rate", "bpm"),
    events(Metric::HeartRateVariability, "heart_rate_variability", "ms", 2),
    events(Metric::BloodGlucose, "blood_glucose", "value", 2),
    events(Metric::Weight, "weight", "kg", 1),
    events(Metric::BodyFat, "body_fat", "percentage", 2),
    events(Metric::Bmi, "bmi", "value", 2),
    events(Metric::RespiratoryRate, "respiratory_rate", "bpm", 2),
    events(Metric::OxygenSaturation, "oxygen_saturation", "percentage", 2),
    events(Metric::BodyTemperature, "body_temperature", "celsius", 2),
];

/// Look up the table of a metric. Blood pressure has none of its own.
pub fn table_for(metric: Metric) -> Option<&'static MetricTable> {
    METRIC_TABLES.iter().find(|t| t.metric == metric)
}

impl MetricTable {
    /// Column type, from the metric's rounding.
    pub fn sql_type(&self) -> SqlType {
        if self.metric.is_integral() {
            SqlType::Integer
        } else {
            SqlType::Real
        }
    }

    pub(crate) fn create_sql(&self) -> String {
        let unique = match self.policy {
            ConflictPolicy::UpsertByDate => " UNIQUE",
            ConflictPolicy::Append => "",
        };
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                {key} TEXT NOT NULL{unique},
                {value} {sql_type} NOT NULL,
                sync_id INTEGER REFERENCES sync_history(id)
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_{key} ON {table}({key});",
            table = self.table,
            key = self.key_column,
            value = self.value_column,
            sql_type = self.sql_type().as_sql(),
        )
    }

    pub(crate) fn insert_sql(&self) -> String {
        let insert = format!(
            "INSERT INTO {} ({}, {}, sync_id) VALUES (?1, ?2, ?3)",
            self.table, self.key_column, self.value_column
        );
        match self.policy {
            ConflictPolicy::UpsertByDate => format!(
                "{insert} ON CONFLICT({key}) DO UPDATE SET {value} = excluded.{value}, sync_id = excluded.sync_id",
                key = self.key_column,
                value = self.value_column,
            ),
            ConflictPolicy::Append => insert,
        }
    }

    pub(crate) fn select_sql(&self, where_clause: &str) -> String {
        format!(
            "SELECT {key}, {value} FROM {table} {where_clause} ORDER BY {key}, id",
            key = self.key_column,
            value = self.value_column,
            table = self.table,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsebook_types::SeriesShape;

    #[test]
    fn test_every_metric_but_blood_pressure_has_a_table() {
        for metric in Metric::ALL {
            let expected = !matches!(
                metric,
                Metric::BloodPressureSystolic | Metric::BloodPressureDiastolic
            );
            assert_eq!(table_for(metric).is_some(), expected, "{metric}");
        }
    }

    #[test]
    fn test_registry_follows_metric_order() {
        let order: Vec<_> = METRIC_TABLES.iter().map(|t| t.metric).collect();
        let expected: Vec<_> = Metric::ALL
            .into_iter()
            .filter(|m| table_for(*m).is_some())
            .collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_daily_metrics_upsert() {
        for table in &METRIC_TABLES {
            if table.metric.shape() == SeriesShape::Daily {
                assert_eq!(table.policy, ConflictPolicy::UpsertByDate, "{}", table.table);
            }
        }
        assert_eq!(
            table_for(Metric::RestingHeartRate).unwrap().policy,
            ConflictPolicy::UpsertByDate
        );
        assert_eq!(table_for(Metric::Weight).unwrap().policy, ConflictPolicy::Append);
    }

    #[test]
    fn test_value_columns_match_field_names() {
        for table in &METRIC_TABLES {
            assert_eq!(table.value_column, table.metric.value_field(), "{}", table.table);
        }
    }

    #[test]
    fn test_sql_types() {
        assert_eq!(table_for(Metric::Steps).unwrap().sql_type(), SqlType::Integer);
        assert_eq!(table_for(Metric::Sleep).unwrap().sql_type(), SqlType::Real);
        assert_eq!(table_for(Metric::Distance).unwrap().sql_type(), SqlType::Real);
    }

    #[test]
    fn test_insert_sql() {
        let steps = table_for(Metric::Steps).unwrap();
        assert_eq!(
            steps.insert_sql(),
            "INSERT INTO steps (date, count, sync_id) VALUES (?1, ?2, ?3) \
             ON CONFLICT(date) DO UPDATE SET count = excluded.count, sync_id = excluded.sync_id"
        );

        let hr = table_for(Metric::HeartRate).unwrap();
        assert_eq!(
            hr.insert_sql(),
            "INSERT INTO heart_rate (timestamp, bpm, sync_id) VALUES (?1, ?2, ?3)"
        );
    }
}
