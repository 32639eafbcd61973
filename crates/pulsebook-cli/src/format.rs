//! Output formatting utilities for text and JSON output.

use std::fmt::Write as _;

use anyhow::Result;
use pulsebook_store::{CompanionSnapshot, SyncHistoryEntry, TableCount};
use pulsebook_types::{HealthDataset, Metric, SeriesPoint};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

/// Points listed per series in text output before eliding.
const TEXT_POINTS: usize = 7;

/// Serialize value to JSON string, respecting the compact option.
pub fn as_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json + "\n")
}

/// Format a single value in the metric's precision.
#[must_use]
pub fn format_value(metric: Metric, value: f64) -> String {
    format!("{:.*}", metric.decimals() as usize, value)
}

fn format_point(metric: Metric, point: &SeriesPoint) -> String {
    format!(
        "{} {} {}",
        point.key,
        format_value(metric, point.value),
        metric.value_field()
    )
}

/// Text rendering of a dataset: one block per non-empty series, newest
/// points last.
pub fn format_dataset_text(dataset: &HealthDataset, last_sync: Option<&str>) -> String {
    let mut out = String::new();

    match last_sync {
        Some(date) => {
            let _ = writeln!(out, "Last import: {}", date);
        }
        None => {
            let _ = writeln!(out, "No imports yet. Run 'pulsebook import <FILE>' first.");
        }
    }

    if dataset.is_empty() {
        let _ = writeln!(out, "No data in range.");
        return out;
    }

    for (metric, points) in dataset.iter().filter(|(_, p)| !p.is_empty()) {
        let _ = writeln!(out, "\n{} ({} entries)", metric, points.len());
        let skip = points.len().saturating_sub(TEXT_POINTS);
        if skip > 0 {
            let _ = writeln!(out, "  ... {} earlier", skip);
        }
        for point in &points[skip..] {
            let _ = writeln!(out, "  {}", format_point(metric, point));
        }
    }

    let workouts = dataset.workouts();
    if !workouts.is_empty() {
        let _ = writeln!(out, "\nworkouts ({} entries)", workouts.len());
        let skip = workouts.len().saturating_sub(TEXT_POINTS);
        if skip > 0 {
            let _ = writeln!(out, "  ... {} earlier", skip);
        }
        for w in &workouts[skip..] {
            let _ = writeln!(
                out,
                "  {} {} {} min {} kcal",
                w.date, w.activity, w.duration, w.calories
            );
        }
    }

    out
}

/// JSON rendering of a dataset together with the last import date.
pub fn format_dataset_json(
    dataset: &HealthDataset,
    last_sync: Option<&str>,
    compact: bool,
) -> Result<String> {
    let value = serde_json::json!({
        "data": dataset,
        "lastSync": last_sync,
    });
    as_json(&value, compact)
}

pub fn format_snapshot_text(snapshot: Option<&CompanionSnapshot>) -> String {
    let Some(s) = snapshot else {
        return "No data yet. Run 'pulsebook import <FILE>' first.\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "As of {}", s.last_updated);
    let _ = writeln!(out, "\nToday");
    let _ = writeln!(out, "  Sleep:     {:.1} h", s.today.sleep);
    let _ = writeln!(out, "  Steps:     {}", s.today.steps);
    let _ = writeln!(out, "  Energy:    {} kcal", s.today.energy);
    let _ = writeln!(out, "  Exercise:  {} min", s.today.exercise);
    let _ = writeln!(out, "  Stand:     {} h", s.today.stand);
    let _ = writeln!(out, "\n7-day average");
    let _ = writeln!(out, "  Sleep:     {:.1} h", s.averages.sleep);
    let _ = writeln!(out, "  Steps:     {}", s.averages.steps);
    let _ = writeln!(out, "\nVitals");
    let _ = writeln!(out, "  Weight:    {}", optional(s.vitals.weight, "kg"));
    let _ = writeln!(
        out,
        "  Resting:   {}",
        optional(s.vitals.resting_hr.map(|v| v as f64), "bpm")
    );
    let _ = writeln!(out, "  VO2max:    {}", optional(s.vitals.vo2_max, ""));
    out
}

fn optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if unit.is_empty() => format!("{}", v),
        Some(v) => format!("{} {}", v, unit),
        None => "-".to_string(),
    }
}

#[must_use]
pub fn format_history_text(entries: &[SyncHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No imports yet.\n".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Date", "Entries", "File"]);
    for entry in entries {
        builder.push_record([
            entry.id.to_string(),
            entry.sync_date.clone(),
            entry.records_imported.to_string(),
            entry.file_path.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    format!("{}\n", table)
}

#[must_use]
pub fn format_table_counts_text(counts: &[TableCount]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Table", "Rows"]);
    for count in counts {
        builder.push_record([count.table.clone(), count.rows.to_string()]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    format!("{}\n", table)
}
