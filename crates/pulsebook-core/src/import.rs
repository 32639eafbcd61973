//! Streaming import of a health export document.
//!
//! The export is one `HealthData` root element holding thousands of
//! `Record` elements and a handful of `Workout` elements. Only direct
//! children of the root are read; records nested inside correlations are
//! duplicates of top-level ones.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use pulsebook_types::{HealthDataset, ParseError, WorkoutRecord, date_part, round_half_up};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info, trace};

use crate::aggregate::Aggregator;
use crate::classify::{RawRecord, SkipReason, classify, parse_number};

const ROOT: &[u8] = b"HealthData";
const WORKOUT_TYPE_PREFIX: &str = "HKWorkoutActivityType";

/// A workout element as found in the export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWorkout {
    /// `HKWorkoutActivityType...` identifier.
    pub activity_type: Option<String>,
    /// Start timestamp.
    pub start: Option<String>,
    /// Duration value.
    pub duration: Option<String>,
    /// Unit of `duration`; minutes when absent.
    pub duration_unit: Option<String>,
    /// Total energy burned in kcal.
    pub total_energy_burned: Option<String>,
}

impl RawWorkout {
    /// Convert to a workout row, or `None` when the start date is missing
    /// or blank.
    ///
    /// Missing or unparsable duration and energy become 0. The activity
    /// label loses its `HKWorkoutActivityType` prefix and falls back to
    /// `"Unknown"`.
    pub fn to_workout(&self) -> Option<WorkoutRecord> {
        let start = self.start.as_deref().filter(|s| !s.trim().is_empty())?;

        let activity = self
            .activity_type
            .as_deref()
            .map(|t| t.replacen(WORKOUT_TYPE_PREFIX, "", 1))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let duration = parse_number(self.duration.as_deref()).unwrap_or(0.0);
        let minutes = match self.duration_unit.as_deref() {
            Some("hr" | "h") => duration * 60.0,
            Some("s" | "sec") => duration / 60.0,
            _ => duration,
        };
        let calories = parse_number(self.total_energy_burned.as_deref()).unwrap_or(0.0);

        Some(WorkoutRecord {
            date: date_part(start).to_string(),
            activity,
            duration: round_half_up(minutes) as i64,
            calories: round_half_up(calories) as i64,
        })
    }
}

/// Counters collected during one import pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// `Record` elements read.
    pub records_seen: usize,
    /// Records that fed a series.
    pub records_used: usize,
    /// `Workout` elements read.
    pub workouts_seen: usize,
    /// Workouts kept.
    pub workouts_used: usize,
    /// Records and workouts skipped, by reason.
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl ImportStats {
    /// Total number of skipped elements.
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records ({} used, {} skipped), {} workouts",
            self.records_seen,
            self.records_used,
            self.skipped_total(),
            self.workouts_used
        )
    }
}

/// Result of a successful import.
#[derive(Debug, Clone)]
pub struct Import {
    /// The dataset, ready to hand to the store.
    pub dataset: HealthDataset,
    /// What was read and what was skipped.
    pub stats: ImportStats,
}

/// Import an export held in memory.
///
/// ```
/// use pulsebook_core::import_str;
/// use pulsebook_types::Metric;
///
/// let xml = r#"<HealthData>
///   <Record type="HKQuantityTypeIdentifierStepCount" startDate="2024-01-15 08:00:00 -0500" value="1200"/>
/// </HealthData>"#;
///
/// let import = import_str(xml)?;
/// assert_eq!(import.dataset.series(Metric::Steps)[0].value, 1200.0);
/// # Ok::<(), pulsebook_types::ParseError>(())
/// ```
pub fn import_str(xml: &str) -> Result<Import, ParseError> {
    import_reader(xml.as_bytes())
}

/// Import an export file from disk.
pub fn import_file<P: AsRef<Path>>(path: P) -> Result<Import, ParseError> {
    let path = path.as_ref();
    info!("Reading health export {}", path.display());
    let file = File::open(path)?;
    import_reader(BufReader::new(file))
}

/// Import an export from any buffered reader in a single streaming pass.
pub fn import_reader<R: BufRead>(source: R) -> Result<Import, ParseError> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut walker = Walker::default();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(reader.buffer_position() as u64, e))?;
        let position = reader.buffer_position() as u64;

        match event {
            Event::Start(element) => walker.open(&element, position)?,
            Event::Empty(element) => {
                walker.open(&element, position)?;
                walker.close();
            }
            Event::End(_) => walker.close(),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    walker.finish()
}

fn malformed(position: u64, err: impl fmt::Display) -> ParseError {
    ParseError::Malformed {
        position,
        message: err.to_string(),
    }
}

#[derive(Default)]
struct Walker {
    depth: usize,
    saw_root: bool,
    in_health_data: bool,
    aggregator: Aggregator,
    workouts: Vec<WorkoutRecord>,
    stats: ImportStats,
}

impl Walker {
    fn open(&mut self, element: &BytesStart<'_>, position: u64) -> Result<(), ParseError> {
        self.depth += 1;

        if self.depth == 1 {
            self.saw_root = true;
            self.in_health_data = element.name().as_ref() == ROOT;
            if !self.in_health_data {
                debug!("Root element is not HealthData; no records will be read");
            }
            return Ok(());
        }

        if self.depth != 2 || !self.in_health_data {
            return Ok(());
        }

        match element.name().as_ref() {
            b"Record" => {
                let record = read_record(element, position)?;
                self.record(&record);
            }
            b"Workout" => {
                let workout = read_workout(element, position)?;
                self.workout(&workout);
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn record(&mut self, record: &RawRecord) {
        self.stats.records_seen += 1;
        match classify(record) {
            Ok(observation) => {
                self.aggregator.add(&observation);
                self.stats.records_used += 1;
            }
            Err(reason) => {
                trace!(kind = %record.kind, reason = reason.label(), "Skipping record");
                self.stats.skip(reason);
            }
        }
    }

    fn workout(&mut self, workout: &RawWorkout) {
        self.stats.workouts_seen += 1;
        match workout.to_workout() {
            Some(row) => {
                self.workouts.push(row);
                self.stats.workouts_used += 1;
            }
            None => {
                trace!("Skipping workout without start date");
                self.stats.skip(SkipReason::MissingStart);
            }
        }
    }

    fn finish(self) -> Result<Import, ParseError> {
        if !self.saw_root {
            return Err(ParseError::MissingRoot);
        }
        if self.depth != 0 {
            return Err(ParseError::Truncated(self.depth));
        }

        info!("Parsed health export: {}", self.stats);
        Ok(Import {
            dataset: self.aggregator.finish(self.workouts),
            stats: self.stats,
        })
    }
}

/// Collect the attributes of an element into `(name, value)` pairs.
fn attributes(element: &BytesStart<'_>, position: u64) -> Result<Vec<(Vec<u8>, String)>, ParseError> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| malformed(position, e))?;
            let value = attr
                .unescape_value()
                .map_err(|e| malformed(position, e))?
                .into_owned();
            Ok((attr.key.as_ref().to_vec(), value))
        })
        .collect()
}

fn read_record(element: &BytesStart<'_>, position: u64) -> Result<RawRecord, ParseError> {
    let mut record = RawRecord::default();
    for (key, value) in attributes(element, position)? {
        match key.as_slice() {
            b"type" => record.kind = value,
            b"startDate" => record.start = Some(value),
            b"endDate" => record.end = Some(value),
            b"value" => record.value = Some(value),
            b"unit" => record.unit = Some(value),
            _ => {}
        }
    }
    Ok(record)
}

fn read_workout(element: &BytesStart<'_>, position: u64) -> Result<RawWorkout, ParseError> {
    let mut workout = RawWorkout::default();
    for (key, value) in attributes(element, position)? {
        match key.as_slice() {
            b"workoutActivityType" => workout.activity_type = Some(value),
            b"startDate" => workout.start = Some(value),
            b"duration" => workout.duration = Some(value),
            b"durationUnit" => workout.duration_unit = Some(value),
            b"totalEnergyBurned" => workout.total_energy_burned = Some(value),
            _ => {}
        }
    }
    Ok(workout)
}
