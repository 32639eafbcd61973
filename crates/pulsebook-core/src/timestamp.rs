//! Export timestamp parsing.
//!
//! Health exports write timestamps as `2024-01-15 08:30:00 -0500`. Only
//! interval lengths are computed from them; date keys are taken by string
//! slicing and never converted between time zones.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Parse an export timestamp.
///
/// Accepts the export format with or without a UTC offset (a missing offset
/// is read as UTC), and RFC 3339.
pub fn parse_timestamp(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    let with_offset = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
    );
    if let Ok(ts) = OffsetDateTime::parse(s, with_offset) {
        return Some(ts);
    }

    let naive = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(ts) = PrimitiveDateTime::parse(s, naive) {
        return Some(ts.assume_utc());
    }

    OffsetDateTime::parse(s, &Rfc3339).ok()
}

/// Interval length in milliseconds, or `None` if either end is unparsable
/// or the interval runs backwards.
fn interval_millis(start: &str, end: &str) -> Option<f64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    let millis = (end - start).whole_milliseconds();
    (millis >= 0).then_some(millis as f64)
}

/// Hours between two export timestamps.
pub fn hours_between(start: &str, end: &str) -> Option<f64> {
    interval_millis(start, end).map(|ms| ms / (1000.0 * 60.0 * 60.0))
}

/// Minutes between two export timestamps.
pub fn minutes_between(start: &str, end: &str) -> Option<f64> {
    interval_millis(start, end).map(|ms| ms / (1000.0 * 60.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_parse_export_format() {
        let ts = parse_timestamp("2024-01-15 08:30:00 -0500").unwrap();
        assert_eq!(ts, datetime!(2024-01-15 13:30:00 UTC));
    }

    #[test]
    fn test_parse_without_offset_assumes_utc() {
        let ts = parse_timestamp("2024-01-15 08:30:00").unwrap();
        assert_eq!(ts, datetime!(2024-01-15 08:30:00 UTC));
    }

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp("2024-01-15T08:30:00+01:00").unwrap();
        assert_eq!(ts, datetime!(2024-01-15 07:30:00 UTC));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_interval_across_offsets() {
        // 23:00 in New York to 05:00 in London is one hour.
        let hours = hours_between("2024-01-15 23:00:00 -0500", "2024-01-16 05:00:00 +0000");
        assert_eq!(hours, Some(1.0));
    }

    #[test]
    fn test_backwards_interval_is_rejected() {
        assert!(minutes_between("2024-01-15 08:00:00 +0000", "2024-01-15 07:00:00 +0000").is_none());
    }
}
