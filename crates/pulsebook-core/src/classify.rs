//! Record classification and unit normalization.
//!
//! Every raw record is mapped to at most one [`Metric`] through a single
//! match on its HealthKit type identifier. Quantity records carry a numeric
//! value and a unit; categorical records (sleep, stand hours, mindful
//! sessions) are measured from their start and end timestamps instead.

use pulsebook_types::{Metric, date_part};

use crate::timestamp::{hours_between, minutes_between};

/// Sleep values that count as asleep. Staged values (`AsleepCore`,
/// `AsleepDeep`, `AsleepREM`, `AsleepUnspecified`) share this prefix.
const ASLEEP_PREFIX: &str = "HKCategoryValueSleepAnalysisAsleep";

/// Stand-hour value recorded for hours without standing activity.
const STAND_IDLE: &str = "HKCategoryValueAppleStandHourIdle";

/// An untyped record as found in the export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// HealthKit type identifier, e.g. `HKQuantityTypeIdentifierStepCount`.
    pub kind: String,
    /// Start timestamp, `YYYY-MM-DD HH:MM:SS +HHMM`.
    pub start: Option<String>,
    /// End timestamp.
    pub end: Option<String>,
    /// Numeric value or categorical value identifier.
    pub value: Option<String>,
    /// Unit of a numeric value.
    pub unit: Option<String>,
}

/// What kind of measurement a type identifier denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A numeric sample of the given metric.
    Quantity(Metric),
    /// A sleep interval; only asleep values count.
    SleepAnalysis,
    /// One hour of the stand ring.
    StandHour,
    /// A mindfulness session.
    MindfulSession,
}

impl RecordKind {
    /// Map a HealthKit type identifier to a record kind.
    ///
    /// Returns `None` for the many identifiers that have no series.
    ///
    /// ```
    /// use pulsebook_core::RecordKind;
    /// use pulsebook_types::Metric;
    ///
    /// assert_eq!(
    ///     RecordKind::from_identifier("HKQuantityTypeIdentifierStepCount"),
    ///     Some(RecordKind::Quantity(Metric::Steps))
    /// );
    /// assert_eq!(RecordKind::from_identifier("HKQuantityTypeIdentifierDietaryFiber"), None);
    /// ```
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let metric = match identifier {
            "HKCategoryTypeIdentifierSleepAnalysis" => return Some(RecordKind::SleepAnalysis),
            "HKCategoryTypeIdentifierAppleStandHour" => return Some(RecordKind::StandHour),
            "HKCategoryTypeIdentifierMindfulSession" => return Some(RecordKind::MindfulSession),
            "HKQuantityTypeIdentifierStepCount" => Metric::Steps,
            "HKQuantityTypeIdentifierDistanceWalkingRunning" => Metric::Distance,
            "HKQuantityTypeIdentifierFlightsClimbed" => Metric::FlightsClimbed,
            "HKQuantityTypeIdentifierActiveEnergyBurned" => Metric::ActiveEnergy,
            "HKQuantityTypeIdentifierBasalEnergyBurned" => Metric::RestingEnergy,
            "HKQuantityTypeIdentifierAppleExerciseTime" => Metric::ExerciseMinutes,
            "HKQuantityTypeIdentifierDietaryWater" => Metric::Water,
            "HKQuantityTypeIdentifierDietaryCaffeine" => Metric::Caffeine,
            "HKQuantityTypeIdentifierHeartRate" => Metric::HeartRate,
            "HKQuantityTypeIdentifierVO2Max" => Metric::Vo2Max,
            "HKQuantityTypeIdentifierRestingHeartRate" => Metric::RestingHeartRate,
            "HKQuantityTypeIdentifierHeartRateVariabilitySDNN" => Metric::HeartRateVariability,
            "HKQuantityTypeIdentifierBloodPressureSystolic" => Metric::BloodPressureSystolic,
            "HKQuantityTypeIdentifierBloodPressureDiastolic" => Metric::BloodPressureDiastolic,
            "HKQuantityTypeIdentifierBloodGlucose" => Metric::BloodGlucose,
            "HKQuantityTypeIdentifierBodyMass" => Metric::Weight,
            "HKQuantityTypeIdentifierBodyFatPercentage" => Metric::BodyFat,
            "HKQuantityTypeIdentifierBodyMassIndex" => Metric::Bmi,
            "HKQuantityTypeIdentifierRespiratoryRate" => Metric::RespiratoryRate,
            "HKQuantityTypeIdentifierOxygenSaturation" => Metric::OxygenSaturation,
            "HKQuantityTypeIdentifierBodyTemperature" => Metric::BodyTemperature,
            _ => return None,
        };
        Some(RecordKind::Quantity(metric))
    }
}

/// Why a record contributed nothing. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// The type identifier has no series.
    UnknownType,
    /// No `startDate` attribute.
    MissingStart,
    /// The value of a quantity record is missing or not a finite number.
    InvalidValue,
    /// A duration-based record has no `endDate`.
    MissingEnd,
    /// A timestamp could not be parsed, or the interval is negative.
    InvalidTimestamp,
    /// A categorical value that does not count (in bed, awake, idle hour).
    NotCounted,
}

impl SkipReason {
    /// Short label for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::UnknownType => "unknown type",
            SkipReason::MissingStart => "missing start date",
            SkipReason::InvalidValue => "invalid value",
            SkipReason::MissingEnd => "missing end date",
            SkipReason::InvalidTimestamp => "invalid timestamp",
            SkipReason::NotCounted => "not counted",
        }
    }
}

/// A classified record: which series it feeds and by how much.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<'a> {
    /// Target series.
    pub metric: Metric,
    /// Full start timestamp of the source record.
    pub timestamp: &'a str,
    /// Normalized, not yet rounded value.
    pub value: f64,
}

impl Observation<'_> {
    /// Key the value is filed under: the full timestamp for heart rate,
    /// the calendar date for everything else.
    pub fn key(&self) -> &str {
        match self.metric {
            Metric::HeartRate => self.timestamp,
            _ => date_part(self.timestamp),
        }
    }
}

/// Convert a quantity to the metric's canonical unit.
///
/// Conversions are single multiplications. Unknown units pass through
/// unchanged. Body fat and oxygen saturation stay fractional;
/// [`Metric::round_export_value`] scales them to percent.
///
/// ```
/// use pulsebook_core::normalize;
/// use pulsebook_types::Metric;
///
/// assert_eq!(normalize(Metric::Distance, 1.0, Some("mi")), 1.60934);
/// assert_eq!(normalize(Metric::Water, 1.0, Some("L")), 1000.0);
/// assert_eq!(normalize(Metric::BodyTemperature, 212.0, Some("degF")), 100.0);
/// ```
#[must_use]
pub fn normalize(metric: Metric, value: f64, unit: Option<&str>) -> f64 {
    match (metric, unit) {
        (Metric::Distance, Some("mi")) => value * 1.60934,
        (Metric::Water, Some("L")) => value * 1000.0,
        (Metric::Water, Some("fl_oz_us")) => value * 29.5735,
        (Metric::Weight, Some("lb")) => value * 0.453592,
        (Metric::BodyTemperature, Some("degF")) => (value - 32.0) * 5.0 / 9.0,
        _ => value,
    }
}

/// Parse a record value the way the export writes numbers.
///
/// Returns `None` for anything that is not a finite decimal number.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Classify a raw record.
pub fn classify(record: &RawRecord) -> Result<Observation<'_>, SkipReason> {
    let kind = RecordKind::from_identifier(&record.kind).ok_or(SkipReason::UnknownType)?;
    let start = record
        .start
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(SkipReason::MissingStart)?;

    match kind {
        RecordKind::Quantity(metric) => {
            let value =
                parse_number(record.value.as_deref()).ok_or(SkipReason::InvalidValue)?;
            Ok(Observation {
                metric,
                timestamp: start,
                value: normalize(metric, value, record.unit.as_deref()),
            })
        }
        RecordKind::SleepAnalysis => {
            let asleep = record
                .value
                .as_deref()
                .is_some_and(|v| v.starts_with(ASLEEP_PREFIX));
            if !asleep {
                return Err(SkipReason::NotCounted);
            }
            let end = record.end.as_deref().ok_or(SkipReason::MissingEnd)?;
            let hours = hours_between(start, end).ok_or(SkipReason::InvalidTimestamp)?;
            Ok(Observation {
                metric: Metric::Sleep,
                timestamp: start,
                value: hours,
            })
        }
        RecordKind::StandHour => {
            if record.value.as_deref() == Some(STAND_IDLE) {
                return Err(SkipReason::NotCounted);
            }
            Ok(Observation {
                metric: Metric::StandHours,
                timestamp: start,
                value: 1.0,
            })
        }
        RecordKind::MindfulSession => {
            let end = record.end.as_deref().ok_or(SkipReason::MissingEnd)?;
            let minutes = minutes_between(start, end).ok_or(SkipReason::InvalidTimestamp)?;
            Ok(Observation {
                metric: Metric::MindfulMinutes,
                timestamp: start,
                value: minutes,
            })
        }
    }
}
