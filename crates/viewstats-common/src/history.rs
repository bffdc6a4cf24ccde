//! Viewing-history record model and field parsers.
//!
//! The export is a CSV with one row per playback. Rows are parsed once into
//! [`ViewingEvent`]s. Durations that cannot be read become zero and start
//! times that cannot be read are kept as `None` rather than failing the batch.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::WatchDuration;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Raw row of a viewing-activity export, keyed by the export's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "Profile Name", default)]
    pub profile_name: String,
    #[serde(rename = "Start Time", default)]
    pub start_time: String,
    #[serde(rename = "Duration", default)]
    pub duration: String,
    #[serde(rename = "Attributes", default)]
    pub attributes: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Supplemental Video Type", default)]
    pub supplemental_video_type: String,
    #[serde(rename = "Device Type", default)]
    pub device_type: String,
    #[serde(rename = "Bookmark", default)]
    pub bookmark: String,
    #[serde(rename = "Latest Bookmark", default)]
    pub latest_bookmark: String,
    #[serde(rename = "Country", default)]
    pub country: String,
}

/// A single parsed watch event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingEvent {
    pub profile: String,
    pub title: String,
    pub country: String,
    pub device_type: String,
    /// Wall-clock start time as written in the export; `None` when unparseable.
    pub start_time: Option<NaiveDateTime>,
    pub duration: WatchDuration,
    /// Trailer, teaser, hook and similar non-feature playback.
    pub supplemental_video_type: Option<String>,
}

impl ViewingEvent {
    /// Parse a raw export row.
    pub fn from_record(record: HistoryRecord) -> Self {
        let start_time = parse_start_time(&record.start_time);
        if start_time.is_none() {
            trace!(raw = %record.start_time, "Unparseable start time");
        }

        let supplemental = record.supplemental_video_type.trim();
        Self {
            start_time,
            duration: parse_duration(&record.duration),
            supplemental_video_type: (!supplemental.is_empty()).then(|| supplemental.to_string()),
            profile: record.profile_name,
            title: record.title,
            country: record.country,
            device_type: record.device_type,
        }
    }

    /// Duration as fractional hours.
    pub fn hours(&self) -> f64 {
        self.duration.hours()
    }

    /// Whether the start time could be parsed.
    pub fn has_valid_start(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn is_supplemental(&self) -> bool {
        self.supplemental_video_type.is_some()
    }

    /// Start time shifted by `offset`, the clock used for hour and weekday bucketing.
    pub fn local_start(&self, offset: FixedOffset) -> Option<NaiveDateTime> {
        let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
        self.start_time
            .and_then(|start| start.checked_add_signed(shift))
    }
}

impl From<HistoryRecord> for ViewingEvent {
    fn from(record: HistoryRecord) -> Self {
        Self::from_record(record)
    }
}

/// Parse an `H:MM:SS` duration.
///
/// Anything other than exactly three non-negative integer fields yields zero.
pub fn parse_duration(raw: &str) -> WatchDuration {
    let mut fields = raw.trim().split(':').map(|part| part.trim().parse::<u32>());

    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(Ok(hours)), Some(Ok(minutes)), Some(Ok(seconds)), None) => {
            WatchDuration::from_hms(hours, minutes, seconds).unwrap_or(WatchDuration::ZERO)
        }
        _ => WatchDuration::ZERO,
    }
}

/// Parse the export's start-time column.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (and a few close variants), RFC 3339
/// timestamps (kept as their UTC wall clock) and bare dates (midnight).
pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use proptest::prelude::*;

    #[test]
    fn test_parse_duration_valid() {
        assert_eq!(parse_duration("0:45:12").seconds(), 45 * 60 + 12);
        assert_eq!(parse_duration("1:00:00").seconds(), 3600);
        assert_eq!(parse_duration(" 2:03:04 ").seconds(), 7384);
        assert!((parse_duration("1:30:00").hours() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_duration_malformed_defaults_to_zero() {
        assert!(parse_duration("").is_zero());
        assert!(parse_duration("45:12").is_zero());
        assert!(parse_duration("1:2:3:4").is_zero());
        assert!(parse_duration("a:b:c").is_zero());
        assert!(parse_duration("-1:00:00").is_zero());
    }

    #[test]
    fn test_parse_start_time_formats() {
        let dt = parse_start_time("2023-05-14 21:33:12").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 5, 14));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (21, 33, 12));

        assert_eq!(
            parse_start_time("2023-05-14T21:33:12"),
            Some(dt),
        );
        assert_eq!(parse_start_time("2023-05-14T21:33:12Z"), Some(dt));
        assert_eq!(
            parse_start_time("2023-05-14T23:33:12+02:00"),
            Some(dt),
        );

        let midnight = parse_start_time("2023-05-14").unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_parse_start_time_invalid() {
        assert!(parse_start_time("").is_none());
        assert!(parse_start_time("yesterday").is_none());
        assert!(parse_start_time("2023-13-40 99:00:00").is_none());
    }

    #[test]
    fn test_event_from_record() {
        let record = HistoryRecord {
            profile_name: "Pati".to_string(),
            start_time: "2023-05-14 21:33:12".to_string(),
            duration: "0:30:00".to_string(),
            title: "Dark: Season 1: Secrets (Episode 1)".to_string(),
            device_type: "Samsung 2015 Smart TV".to_string(),
            country: "PT (Portugal)".to_string(),
            ..HistoryRecord::default()
        };

        let event = ViewingEvent::from_record(record);
        assert_eq!(event.profile, "Pati");
        assert!(event.has_valid_start());
        assert!(!event.is_supplemental());
        assert!((event.hours() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_event_keeps_invalid_timestamp() {
        let record = HistoryRecord {
            start_time: "not a date".to_string(),
            duration: "0:10:00".to_string(),
            supplemental_video_type: "TRAILER".to_string(),
            ..HistoryRecord::default()
        };

        let event = ViewingEvent::from(record);
        assert!(event.start_time.is_none());
        assert!(event.is_supplemental());
        assert_eq!(event.duration.seconds(), 600);
    }

    #[test]
    fn test_local_start_shifts_clock() {
        let event = ViewingEvent::from_record(HistoryRecord {
            start_time: "2023-05-14 23:30:00".to_string(),
            ..HistoryRecord::default()
        });

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let shifted = event.local_start(plus_two).unwrap();
        assert_eq!(shifted.hour(), 1);
        assert_eq!(shifted.day(), 15);

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(event.local_start(utc), event.start_time);
    }

    proptest! {
        #[test]
        fn prop_duration_components_round_trip(h in 0u32..100, m in 0u32..60, s in 0u32..60) {
            let raw = format!("{h}:{m:02}:{s:02}");
            let parsed = parse_duration(&raw);
            prop_assert_eq!(parsed.seconds(), h * 3600 + m * 60 + s);
            prop_assert_eq!(parsed.to_string(), raw);
        }

        #[test]
        fn prop_duration_never_panics(raw in "\\PC*") {
            let _ = parse_duration(&raw);
        }
    }
}
