//! Data model for imported personal health metrics.
//!
//! This crate provides the types shared by the importer (pulsebook-core),
//! the SQLite store (pulsebook-store) and the CLI.
//!
//! # Features
//!
//! - The fixed set of 24 [`Metric`] series with their units and rounding
//! - [`HealthDataset`], the immutable hand-off between pipeline stages
//! - [`WorkoutRecord`] for per-session workout rows
//! - Error types for document parsing
//!
//! # Example
//!
//! ```
//! use pulsebook_types::{HealthDataset, Metric, SeriesPoint, SeriesShape};
//!
//! let dataset = HealthDataset::new().with_series(
//!     Metric::Steps,
//!     vec![SeriesPoint::new("2024-01-02", 9000.0), SeriesPoint::new("2024-01-01", 4200.0)],
//! );
//!
//! assert_eq!(Metric::Steps.shape(), SeriesShape::Daily);
//! assert_eq!(dataset.series(Metric::Steps)[0].key, "2024-01-01");
//! ```

pub mod error;
pub mod round;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use round::{round_half_up, round_to};
pub use types::{HealthDataset, Metric, SeriesPoint, SeriesShape, WorkoutRecord, date_part};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // --- Metric tests ---

    #[test]
    fn test_metric_all_has_unique_keys() {
        let mut keys: Vec<_> = Metric::ALL.iter().map(|m| m.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 24);
    }

    #[test]
    fn test_metric_shapes() {
        let daily = Metric::ALL
            .iter()
            .filter(|m| m.shape() == SeriesShape::Daily)
            .count();
        assert_eq!(daily, 11);
        assert_eq!(Metric::HeartRate.shape(), SeriesShape::Sample);
        assert_eq!(Metric::Sleep.shape(), SeriesShape::Daily);
        assert_eq!(Metric::StandHours.shape(), SeriesShape::Daily);
    }

    #[test]
    fn test_metric_key_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.key().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn test_metric_from_str_unknown() {
        let err = "cholesterol".parse::<Metric>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown metric: cholesterol");
    }

    #[test]
    fn test_metric_value_fields() {
        assert_eq!(Metric::Sleep.value_field(), "hours");
        assert_eq!(Metric::Distance.value_field(), "km");
        assert_eq!(Metric::HeartRate.value_field(), "bpm");
        assert_eq!(Metric::BodyFat.value_field(), "percentage");
        assert_eq!(Metric::BodyTemperature.value_field(), "celsius");
        assert_eq!(Metric::Vo2Max.value_field(), "value");
    }

    #[test]
    fn test_metric_rounding_precision() {
        assert_eq!(Metric::Sleep.round(7.46), 7.5);
        assert_eq!(Metric::Steps.round(1234.5), 1235.0);
        assert_eq!(Metric::Distance.round(1.60934), 1.61);
        assert_eq!(Metric::Weight.round(72.5747), 72.6);
        assert_eq!(Metric::HeartRate.round(71.4), 71.0);
        assert_eq!(Metric::BodyTemperature.round(36.66), 36.7);
    }

    #[test]
    fn test_metric_percent_scaling() {
        assert_eq!(Metric::BodyFat.round_export_value(0.2234), 22.3);
        assert_eq!(Metric::OxygenSaturation.round_export_value(0.97), 97.0);
    }

    #[test]
    fn test_round_leaves_percent_values_alone() {
        assert_eq!(Metric::BodyFat.round(21.3), 21.3);
        assert_eq!(Metric::BodyFat.round(21.34), 21.3);
        assert_eq!(Metric::OxygenSaturation.round(97.0), 97.0);
        assert_eq!(Metric::OxygenSaturation.round(96.6), 97.0);
    }

    #[test]
    fn test_round_export_value_matches_round_outside_percent_metrics() {
        for metric in Metric::ALL {
            if matches!(metric, Metric::BodyFat | Metric::OxygenSaturation) {
                continue;
            }
            assert_eq!(metric.round_export_value(12.345), metric.round(12.345), "{metric}");
        }
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(format!("{}", Metric::FlightsClimbed), "flightsClimbed");
    }

    // --- Rounding tests ---

    #[test]
    fn test_round_half_up_halves() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(1.5), 2.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
    }

    #[test]
    fn test_round_to_decimals() {
        assert_eq!(round_to(1.60934, 2), 1.61);
        assert_eq!(round_to(7.45, 1), 7.5);
        assert_eq!(round_to(3.0, 0), 3.0);
    }

    proptest! {
        #[test]
        fn prop_round_half_up_is_nearest_integer(x in -1.0e9f64..1.0e9f64) {
            let r = round_half_up(x);
            prop_assert_eq!(r.fract(), 0.0);
            prop_assert!((r - x).abs() <= 0.5);
        }

        #[test]
        fn prop_set_series_sorts_by_key(days in proptest::collection::vec(1u32..28, 0..40)) {
            let points: Vec<_> = days
                .iter()
                .map(|d| SeriesPoint::new(format!("2024-03-{d:02}"), f64::from(*d)))
                .collect();
            let dataset = HealthDataset::new().with_series(Metric::Weight, points);
            let keys: Vec<_> = dataset.series(Metric::Weight).iter().map(|p| p.key.clone()).collect();
            let mut sorted = keys.clone();
            sorted.sort();
            prop_assert_eq!(keys, sorted);
        }
    }

    // --- HealthDataset tests ---

    #[test]
    fn test_dataset_new_has_every_series_empty() {
        let dataset = HealthDataset::new();
        assert!(dataset.is_empty());
        assert_eq!(dataset.iter().count(), 24);
        assert!(dataset.series(Metric::Bmi).is_empty());
        assert!(dataset.workouts().is_empty());
    }

    #[test]
    fn test_dataset_stable_sort_keeps_same_day_order() {
        let dataset = HealthDataset::new().with_series(
            Metric::Weight,
            vec![
                SeriesPoint::new("2024-01-02", 80.0),
                SeriesPoint::new("2024-01-01", 81.0),
                SeriesPoint::new("2024-01-02", 79.5),
            ],
        );
        let values: Vec<_> = dataset.series(Metric::Weight).iter().map(|p| p.value).collect();
        assert_eq!(values, vec![81.0, 80.0, 79.5]);
    }

    #[test]
    fn test_dataset_counts_and_total() {
        let dataset = HealthDataset::new()
            .with_series(Metric::Steps, vec![SeriesPoint::new("2024-01-01", 10.0)])
            .with_workouts(vec![WorkoutRecord {
                date: "2024-01-01".into(),
                activity: "Running".into(),
                duration: 30,
                calories: 250,
            }]);
        let counts = dataset.counts();
        assert_eq!(counts["steps"], 1);
        assert_eq!(counts["workouts"], 1);
        assert_eq!(counts["sleep"], 0);
        assert_eq!(dataset.total_entries(), 2);
    }

    #[test]
    fn test_series_point_date() {
        let point = SeriesPoint::new("2024-01-15 08:30:00 -0500", 62.0);
        assert_eq!(point.date(), "2024-01-15");
    }

    // --- Serialization tests ---

    #[test]
    fn test_dataset_serialization_shape() {
        let dataset = HealthDataset::new()
            .with_series(Metric::Steps, vec![SeriesPoint::new("2024-01-01", 4200.0)])
            .with_series(Metric::Distance, vec![SeriesPoint::new("2024-01-01", 3.25)])
            .with_workouts(vec![WorkoutRecord {
                date: "2024-01-01".into(),
                activity: "Cycling".into(),
                duration: 45,
                calories: 400,
            }]);

        let json = serde_json::to_value(&dataset).unwrap();
        assert_eq!(json["steps"][0]["date"], "2024-01-01");
        assert_eq!(json["steps"][0]["count"], 4200);
        assert!(json["steps"][0]["count"].is_i64());
        assert_eq!(json["distance"][0]["km"], 3.25);
        assert_eq!(json["workouts"][0]["type"], "Cycling");
        assert_eq!(json["bodyTemperature"], serde_json::json!([]));
        assert_eq!(json.as_object().unwrap().len(), 25);
    }

    #[test]
    fn test_metric_serialization() {
        assert_eq!(serde_json::to_string(&Metric::Vo2Max).unwrap(), "\"vo2Max\"");
        assert_eq!(
            serde_json::to_string(&Metric::BloodPressureSystolic).unwrap(),
            "\"bloodPressureSystolic\""
        );
    }
}
