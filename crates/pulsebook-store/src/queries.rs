//! Query builder for reading datasets back.
//!
//! # Example
//!
//! ```
//! use pulsebook_store::{DatasetQuery, Store};
//! use pulsebook_types::Metric;
//!
//! let store = Store::open_in_memory()?;
//!
//! // Everything from the last 30 days
//! let recent = store.load_dataset(&DatasetQuery::new().days_back(30))?;
//!
//! // Only sleep and steps, full history
//! let query = DatasetQuery::new().metric(Metric::Sleep).metric(Metric::Steps);
//! let dataset = store.load_dataset(&query)?;
//! assert!(dataset.series(Metric::Steps).is_empty());
//! # Ok::<(), pulsebook_store::Error>(())
//! ```

use pulsebook_types::Metric;
use time::{Date, Duration, OffsetDateTime};

/// Fluent query builder for [`Store::load_dataset`](crate::Store::load_dataset).
///
/// By default every series and workouts are read in full.
#[derive(Debug, Default, Clone)]
pub struct DatasetQuery {
    /// Include only rows keyed on or after this date.
    pub since: Option<Date>,
    /// Restrict to these metrics. Empty means all.
    pub metrics: Vec<Metric>,
    /// Skip workouts.
    pub skip_workouts: bool,
}

impl DatasetQuery {
    /// Create a query for the whole store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include only rows keyed on or after `date`.
    pub fn since(mut self, date: Date) -> Self {
        self.since = Some(date);
        self
    }

    /// Include the last `days` days, counted back from today in UTC.
    pub fn days_back(self, days: u32) -> Self {
        let today = OffsetDateTime::now_utc().date();
        self.days_back_from(today, days)
    }

    /// Include the `days` days before `today`, plus `today`.
    pub fn days_back_from(self, today: Date, days: u32) -> Self {
        let since = today
            .checked_sub(Duration::days(i64::from(days)))
            .unwrap_or(Date::MIN);
        self.since(since)
    }

    /// Add a metric to read. Once any metric is added, workouts are skipped
    /// unless [`with_workouts`](Self::with_workouts) is called.
    pub fn metric(mut self, metric: Metric) -> Self {
        if self.metrics.is_empty() {
            self.skip_workouts = true;
        }
        self.metrics.push(metric);
        self
    }

    /// Read workouts even when the query is restricted to some metrics.
    pub fn with_workouts(mut self) -> Self {
        self.skip_workouts = false;
        self
    }

    pub(crate) fn includes(&self, metric: Metric) -> bool {
        self.metrics.is_empty() || self.metrics.contains(&metric)
    }

    /// Build the SQL WHERE clause and parameters for a key column.
    pub(crate) fn build_where(&self, key_column: &str) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let where_clause = match self.since {
            Some(since) => {
                params.push(Box::new(since.to_string()));
                format!("WHERE {key_column} >= ?")
            }
            None => String::new(),
        };

        (where_clause, params)
    }
}
