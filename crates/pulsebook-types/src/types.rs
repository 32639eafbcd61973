//! Core types for imported health series.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::round::{round_half_up, round_to};

/// How samples of a metric are collected into a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeriesShape {
    /// At most one value per calendar date, formed by summing same-day records.
    Daily,
    /// One value per source record; many values may share a date.
    Sample,
}

/// One of the 24 fixed health series.
///
/// Variants are declared in presentation order: cumulative daily metrics
/// first, then point samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Metric {
    /// Hours asleep per night.
    Sleep,
    /// Step count.
    Steps,
    /// Walking and running distance in km.
    Distance,
    /// Flights of stairs climbed.
    FlightsClimbed,
    /// Active energy in kcal.
    ActiveEnergy,
    /// Resting (basal) energy in kcal.
    RestingEnergy,
    /// Exercise minutes.
    ExerciseMinutes,
    /// Hours with standing activity.
    StandHours,
    /// Mindful session minutes.
    MindfulMinutes,
    /// Water intake in ml.
    Water,
    /// Caffeine intake in mg.
    Caffeine,
    /// Heart rate in bpm, keyed by full timestamp.
    HeartRate,
    /// VO2max in mL/(kg*min).
    #[cfg_attr(feature = "serde", serde(rename = "vo2Max"))]
    Vo2Max,
    /// Resting heart rate in bpm.
    RestingHeartRate,
    /// Heart rate variability (SDNN) in ms.
    HeartRateVariability,
    /// Systolic blood pressure in mmHg.
    BloodPressureSystolic,
    /// Diastolic blood pressure in mmHg.
    BloodPressureDiastolic,
    /// Blood glucose.
    BloodGlucose,
    /// Body mass in kg.
    Weight,
    /// Body fat percentage.
    BodyFat,
    /// Body mass index.
    Bmi,
    /// Respiratory rate in breaths per minute.
    RespiratoryRate,
    /// Blood oxygen saturation percentage.
    OxygenSaturation,
    /// Body temperature in Celsius.
    BodyTemperature,
}

impl Metric {
    /// All metrics in declaration order.
    pub const ALL: [Metric; 24] = [
        Metric::Sleep,
        Metric::Steps,
        Metric::Distance,
        Metric::FlightsClimbed,
        Metric::ActiveEnergy,
        Metric::RestingEnergy,
        Metric::ExerciseMinutes,
        Metric::StandHours,
        Metric::MindfulMinutes,
        Metric::Water,
        Metric::Caffeine,
        Metric::HeartRate,
        Metric::Vo2Max,
        Metric::RestingHeartRate,
        Metric::HeartRateVariability,
        Metric::BloodPressureSystolic,
        Metric::BloodPressureDiastolic,
        Metric::BloodGlucose,
        Metric::Weight,
        Metric::BodyFat,
        Metric::Bmi,
        Metric::RespiratoryRate,
        Metric::OxygenSaturation,
        Metric::BodyTemperature,
    ];

    /// Dataset key, as used in JSON output.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Sleep => "sleep",
            Metric::Steps => "steps",
            Metric::Distance => "distance",
            Metric::FlightsClimbed => "flightsClimbed",
            Metric::ActiveEnergy => "activeEnergy",
            Metric::RestingEnergy => "restingEnergy",
            Metric::ExerciseMinutes => "exerciseMinutes",
            Metric::StandHours => "standHours",
            Metric::MindfulMinutes => "mindfulMinutes",
            Metric::Water => "water",
            Metric::Caffeine => "caffeine",
            Metric::HeartRate => "heartRate",
            Metric::Vo2Max => "vo2Max",
            Metric::RestingHeartRate => "restingHeartRate",
            Metric::HeartRateVariability => "heartRateVariability",
            Metric::BloodPressureSystolic => "bloodPressureSystolic",
            Metric::BloodPressureDiastolic => "bloodPressureDiastolic",
            Metric::BloodGlucose => "bloodGlucose",
            Metric::Weight => "weight",
            Metric::BodyFat => "bodyFat",
            Metric::Bmi => "bmi",
            Metric::RespiratoryRate => "respiratoryRate",
            Metric::OxygenSaturation => "oxygenSaturation",
            Metric::BodyTemperature => "bodyTemperature",
        }
    }

    /// Name of the value field next to `date` in a serialized point.
    #[must_use]
    pub fn value_field(&self) -> &'static str {
        match self {
            Metric::Sleep | Metric::StandHours => "hours",
            Metric::Steps | Metric::FlightsClimbed => "count",
            Metric::Distance => "km",
            Metric::ActiveEnergy | Metric::RestingEnergy => "calories",
            Metric::ExerciseMinutes | Metric::MindfulMinutes => "minutes",
            Metric::Water => "ml",
            Metric::Caffeine => "mg",
            Metric::HeartRate | Metric::RestingHeartRate | Metric::RespiratoryRate => "bpm",
            Metric::HeartRateVariability => "ms",
            Metric::Weight => "kg",
            Metric::BodyFat | Metric::OxygenSaturation => "percentage",
            Metric::BodyTemperature => "celsius",
            Metric::Vo2Max
            | Metric::BloodPressureSystolic
            | Metric::BloodPressureDiastolic
            | Metric::BloodGlucose
            | Metric::Bmi => "value",
        }
    }

    /// Whether same-day records are summed or kept individually.
    #[must_use]
    pub fn shape(&self) -> SeriesShape {
        match self {
            Metric::Sleep
            | Metric::Steps
            | Metric::Distance
            | Metric::FlightsClimbed
            | Metric::ActiveEnergy
            | Metric::RestingEnergy
            | Metric::ExerciseMinutes
            | Metric::StandHours
            | Metric::MindfulMinutes
            | Metric::Water
            | Metric::Caffeine => SeriesShape::Daily,
            _ => SeriesShape::Sample,
        }
    }

    /// Number of decimal places kept after rounding.
    #[must_use]
    pub fn decimals(&self) -> u32 {
        match self {
            Metric::Distance => 2,
            Metric::Sleep
            | Metric::Vo2Max
            | Metric::Weight
            | Metric::BodyFat
            | Metric::Bmi
            | Metric::BodyTemperature => 1,
            _ => 0,
        }
    }

    /// Whether values of this metric are whole numbers once rounded.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.decimals() == 0
    }

    /// Round a value already in the metric's canonical unit.
    ///
    /// Body fat and oxygen saturation are expected in percent here.
    /// Rounding is idempotent: `round(round(v)) == round(v)`.
    #[must_use]
    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.decimals())
    }

    /// Round a value still in export units, scaling fractions to percent.
    ///
    /// Body fat and oxygen saturation are exported as fractions (0.0 to
    /// 1.0). They are scaled and rounded in one step, body fat as
    /// `round(v * 1000) / 10` and oxygen saturation as `round(v * 100)`, so
    /// the result never depends on an intermediate float. Every other metric
    /// is rounded as by [`Metric::round`]. Never call this on a value that is
    /// already in percent.
    ///
    /// ```
    /// use pulsebook_types::Metric;
    ///
    /// assert_eq!(Metric::BodyFat.round_export_value(0.2234), 22.3);
    /// assert_eq!(Metric::OxygenSaturation.round_export_value(0.97), 97.0);
    /// assert_eq!(Metric::Steps.round_export_value(1234.5), 1235.0);
    /// ```
    #[must_use]
    pub fn round_export_value(&self, value: f64) -> f64 {
        match self {
            Metric::BodyFat => round_half_up(value * 1000.0) / 10.0,
            Metric::OxygenSaturation => round_half_up(value * 100.0),
            _ => self.round(value),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = ParseError;

    /// Parse a dataset key such as `"heartRate"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulsebook_types::Metric;
    ///
    /// assert_eq!("restingHeartRate".parse::<Metric>().unwrap(), Metric::RestingHeartRate);
    /// assert!("cholesterol".parse::<Metric>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.key() == s)
            .ok_or_else(|| ParseError::UnknownMetric(s.to_string()))
    }
}

/// A single point of a series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesPoint {
    /// `YYYY-MM-DD` date, or the full start timestamp for heart rate.
    pub key: String,
    /// Rounded value in the metric's canonical unit.
    pub value: f64,
}

impl SeriesPoint {
    /// Create a point.
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// The calendar date part of the key.
    #[must_use]
    pub fn date(&self) -> &str {
        date_part(&self.key)
    }
}

/// One workout session. Never aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkoutRecord {
    /// Start date (`YYYY-MM-DD`).
    pub date: String,
    /// Activity label, e.g. `"Running"`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub activity: String,
    /// Duration in whole minutes.
    pub duration: i64,
    /// Total energy burned in kcal.
    pub calories: i64,
}

/// The date portion of an export timestamp (`"2024-01-15 08:30:00 -0500"`).
///
/// This is plain string slicing at the first space; no timezone conversion
/// is applied.
///
/// ```
/// use pulsebook_types::date_part;
///
/// assert_eq!(date_part("2024-01-15 08:30:00 -0500"), "2024-01-15");
/// assert_eq!(date_part("2024-01-15"), "2024-01-15");
/// ```
#[must_use]
pub fn date_part(timestamp: &str) -> &str {
    timestamp.split(' ').next().unwrap_or(timestamp)
}

/// A complete set of series, one per [`Metric`], plus workouts.
///
/// Every series is kept sorted ascending by key as plain string comparison.
/// The sort is stable, so points sharing a key keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthDataset {
    series: BTreeMap<Metric, Vec<SeriesPoint>>,
    workouts: Vec<WorkoutRecord>,
}

impl Default for HealthDataset {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthDataset {
    /// Create a dataset with every series present and empty.
    pub fn new() -> Self {
        Self {
            series: Metric::ALL.into_iter().map(|m| (m, Vec::new())).collect(),
            workouts: Vec::new(),
        }
    }

    /// Replace a series, sorting it by key.
    pub fn set_series(&mut self, metric: Metric, mut points: Vec<SeriesPoint>) {
        points.sort_by(|a, b| a.key.cmp(&b.key));
        self.series.insert(metric, points);
    }

    /// Builder-style variant of [`set_series`](Self::set_series).
    #[must_use]
    pub fn with_series(mut self, metric: Metric, points: Vec<SeriesPoint>) -> Self {
        self.set_series(metric, points);
        self
    }

    /// Replace the workout list, sorting it by date.
    pub fn set_workouts(&mut self, mut workouts: Vec<WorkoutRecord>) {
        workouts.sort_by(|a, b| a.date.cmp(&b.date));
        self.workouts = workouts;
    }

    /// Builder-style variant of [`set_workouts`](Self::set_workouts).
    #[must_use]
    pub fn with_workouts(mut self, workouts: Vec<WorkoutRecord>) -> Self {
        self.set_workouts(workouts);
        self
    }

    /// Points of one series.
    pub fn series(&self, metric: Metric) -> &[SeriesPoint] {
        self.series.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All workouts, sorted by date.
    pub fn workouts(&self) -> &[WorkoutRecord] {
        &self.workouts
    }

    /// Iterate `(metric, points)` in [`Metric::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &[SeriesPoint])> {
        Metric::ALL.into_iter().map(move |m| (m, self.series(m)))
    }

    /// Entry count per series key, including `"workouts"`.
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts: BTreeMap<&'static str, usize> =
            self.iter().map(|(m, points)| (m.key(), points.len())).collect();
        counts.insert("workouts", self.workouts.len());
        counts
    }

    /// Total number of entries across every series and workouts.
    pub fn total_entries(&self) -> usize {
        self.series.values().map(Vec::len).sum::<usize>() + self.workouts.len()
    }

    /// True when no series holds any point and there are no workouts.
    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    use super::{HealthDataset, Metric, SeriesPoint};

    struct PointJson<'a> {
        metric: Metric,
        point: &'a SeriesPoint,
    }

    impl Serialize for PointJson<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(2))?;
            map.serialize_entry("date", &self.point.key)?;
            if self.metric.is_integral() {
                map.serialize_entry(self.metric.value_field(), &(self.point.value as i64))?;
            } else {
                map.serialize_entry(self.metric.value_field(), &self.point.value)?;
            }
            map.end()
        }
    }

    struct SeriesJson<'a> {
        metric: Metric,
        points: &'a [SeriesPoint],
    }

    impl Serialize for SeriesJson<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(self.points.len()))?;
            for point in self.points {
                seq.serialize_element(&PointJson {
                    metric: self.metric,
                    point,
                })?;
            }
            seq.end()
        }
    }

    impl Serialize for HealthDataset {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(Metric::ALL.len() + 1))?;
            for (metric, points) in self.iter() {
                map.serialize_entry(metric.key(), &SeriesJson { metric, points })?;
            }
            map.serialize_entry("workouts", &self.workouts)?;
            map.end()
        }
    }
}
