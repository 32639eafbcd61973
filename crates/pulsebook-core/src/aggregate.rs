//! Aggregation of classified records into series.
//!
//! Daily metrics are summed per calendar date and rounded once the pass is
//! complete. Point-sample metrics keep every reading, each rounded as it is
//! recorded.

use std::collections::BTreeMap;

use pulsebook_types::{HealthDataset, Metric, SeriesPoint, SeriesShape, WorkoutRecord, date_part};

use crate::classify::Observation;

/// Accumulates observations for every metric.
#[derive(Debug, Default)]
pub struct Aggregator {
    totals: BTreeMap<Metric, BTreeMap<String, f64>>,
    samples: BTreeMap<Metric, Vec<SeriesPoint>>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation into its series.
    pub fn add(&mut self, observation: &Observation<'_>) {
        let metric = observation.metric;
        match metric.shape() {
            SeriesShape::Daily => {
                let date = date_part(observation.timestamp);
                *self
                    .totals
                    .entry(metric)
                    .or_default()
                    .entry(date.to_string())
                    .or_insert(0.0) += observation.value;
            }
            SeriesShape::Sample => {
                self.samples.entry(metric).or_default().push(SeriesPoint::new(
                    observation.key(),
                    metric.round_export_value(observation.value),
                ));
            }
        }
    }

    /// Number of points currently held for a metric.
    pub fn len(&self, metric: Metric) -> usize {
        match metric.shape() {
            SeriesShape::Daily => self.totals.get(&metric).map_or(0, BTreeMap::len),
            SeriesShape::Sample => self.samples.get(&metric).map_or(0, Vec::len),
        }
    }

    /// Round daily totals and emit the sorted dataset.
    pub fn finish(self, workouts: Vec<WorkoutRecord>) -> HealthDataset {
        let mut dataset = HealthDataset::new();

        for (metric, by_date) in self.totals {
            let points = by_date
                .into_iter()
                .map(|(date, total)| SeriesPoint::new(date, metric.round_export_value(total)))
                .collect();
            dataset.set_series(metric, points);
        }

        for (metric, points) in self.samples {
            dataset.set_series(metric, points);
        }

        dataset.set_workouts(workouts);
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(metric: Metric, timestamp: &str, value: f64) -> Observation<'_> {
        Observation {
            metric,
            timestamp,
            value,
        }
    }

    #[test]
    fn test_daily_sum_per_date() {
        let mut agg = Aggregator::new();
        agg.add(&obs(Metric::Steps, "2024-01-15 08:00:00 -0500", 1200.0));
        agg.add(&obs(Metric::Steps, "2024-01-15 12:00:00 -0500", 800.4));
        agg.add(&obs(Metric::Steps, "2024-01-14 12:00:00 -0500", 50.0));

        let dataset = agg.finish(Vec::new());
        let steps = dataset.series(Metric::Steps);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0], SeriesPoint::new("2024-01-14", 50.0));
        assert_eq!(steps[1], SeriesPoint::new("2024-01-15", 2000.0));
    }

    #[test]
    fn test_daily_rounding_applies_after_sum() {
        let mut agg = Aggregator::new();
        agg.add(&obs(Metric::Distance, "2024-01-15 08:00:00 -0500", 0.004));
        agg.add(&obs(Metric::Distance, "2024-01-15 09:00:00 -0500", 0.004));

        let dataset = agg.finish(Vec::new());
        assert_eq!(dataset.series(Metric::Distance)[0].value, 0.01);
    }

    #[test]
    fn test_sleep_intervals_accumulate() {
        let mut agg = Aggregator::new();
        agg.add(&obs(Metric::Sleep, "2024-01-15 00:00:00 -0500", 3.0));
        agg.add(&obs(Metric::Sleep, "2024-01-15 03:30:00 -0500", 4.5));

        let dataset = agg.finish(Vec::new());
        assert_eq!(dataset.series(Metric::Sleep), &[SeriesPoint::new("2024-01-15", 7.5)]);
    }

    #[test]
    fn test_samples_keep_every_reading() {
        let mut agg = Aggregator::new();
        agg.add(&obs(Metric::Weight, "2024-01-15 07:00:00 -0500", 80.04));
        agg.add(&obs(Metric::Weight, "2024-01-15 19:00:00 -0500", 80.96));

        assert_eq!(agg.len(Metric::Weight), 2);
        let dataset = agg.finish(Vec::new());
        let weights: Vec<_> = dataset.series(Metric::Weight).iter().map(|p| p.value).collect();
        assert_eq!(weights, vec![80.0, 81.0]);
    }

    #[test]
    fn test_heart_rate_sorted_by_full_timestamp() {
        let mut agg = Aggregator::new();
        agg.add(&obs(Metric::HeartRate, "2024-01-15 12:00:00 -0500", 80.0));
        agg.add(&obs(Metric::HeartRate, "2024-01-15 08:00:00 -0500", 61.6));

        let dataset = agg.finish(Vec::new());
        let hr = dataset.series(Metric::HeartRate);
        assert_eq!(hr[0], SeriesPoint::new("2024-01-15 08:00:00 -0500", 62.0));
        assert_eq!(hr[1].key, "2024-01-15 12:00:00 -0500");
    }

    #[test]
    fn test_untouched_metrics_are_empty() {
        let dataset = Aggregator::new().finish(Vec::new());
        assert!(dataset.is_empty());
    }
}
