//! Streaming importer for personal health export documents.
//!
//! This crate turns an exported `HealthData` XML document into a
//! [`HealthDataset`](pulsebook_types::HealthDataset): one time series per
//! tracked metric plus a list of workouts. The document is read in a single
//! streaming pass, so exports of several hundred megabytes never need to be
//! held in memory.
//!
//! The pipeline has three stages:
//!
//! - [`classify`] maps each raw record to a metric and a normalized value
//! - [`Aggregator`] sums daily metrics per date and collects point samples
//! - [`import_reader`] walks the document and drives both
//!
//! # Example
//!
//! ```
//! use pulsebook_core::import_str;
//! use pulsebook_types::Metric;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <HealthData locale="en_US">
//!   <Record type="HKQuantityTypeIdentifierStepCount" startDate="2024-01-15 08:00:00 -0500" value="1200"/>
//!   <Record type="HKQuantityTypeIdentifierStepCount" startDate="2024-01-15 12:00:00 -0500" value="800"/>
//!   <Workout workoutActivityType="HKWorkoutActivityTypeRunning" duration="30" durationUnit="min"
//!            totalEnergyBurned="310" startDate="2024-01-15 07:00:00 -0500"/>
//! </HealthData>"#;
//!
//! let import = import_str(xml)?;
//! assert_eq!(import.dataset.series(Metric::Steps)[0].value, 2000.0);
//! assert_eq!(import.dataset.workouts()[0].activity, "Running");
//! # Ok::<(), pulsebook_types::ParseError>(())
//! ```

pub mod aggregate;
pub mod classify;
pub mod import;
pub mod timestamp;

pub use aggregate::Aggregator;
pub use classify::{Observation, RawRecord, RecordKind, SkipReason, classify, normalize};
pub use import::{Import, ImportStats, RawWorkout, import_file, import_reader, import_str};
pub use timestamp::{hours_between, minutes_between, parse_timestamp};

pub use pulsebook_types::ParseError;
