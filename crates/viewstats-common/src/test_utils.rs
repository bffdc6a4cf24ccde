//! Test utilities and shared fixtures for the viewstats workspace.
//!
//! Available to other crates through the `testing` feature.

use crate::history::{HistoryRecord, ViewingEvent};

/// Header row of a viewing-activity export.
pub const CSV_HEADER: &str = "Profile Name,Start Time,Duration,Attributes,Title,Supplemental Video Type,Device Type,Bookmark,Latest Bookmark,Country";

/// A small export covering two profiles, several devices and one bad timestamp.
pub fn sample_csv() -> String {
    let rows = [
        "Pati,2024-03-01 20:15:00,1:00:00,,Dark: Season 1: Secrets (Episode 1),,Samsung 2015 Smart TV,1:00:00,1:00:00,PT (Portugal)",
        "Pati,2024-03-02 21:30:00,0:45:00,,Dark: Season 1: Lies (Episode 2),,Samsung 2015 Smart TV,0:45:00,0:45:00,PT (Portugal)",
        "Pati,2024-03-03 09:00:00,0:30:00,,The Crown: Season 1: Wolferton Splash (Episode 1),,Apple iPhone 12,0:30:00,0:30:00,ES (Spain)",
        "Nuno,2024-03-04 02:10:00,2:00:00,,Inception,,Sony PS4,2:00:00,2:00:00,PT (Portugal)",
        "Nuno,2024-03-05 14:00:00,0:20:00,,Inception,,Apple iPad Air,0:20:00,0:20:00,PT (Portugal)",
        "Nuno,2024-03-05 14:30:00,0:01:30,,Inception (Trailer),TRAILER,Apple iPad Air,0:01:30,0:01:30,PT (Portugal)",
        "Nuno,not a date,0:10:00,,Inception,,Netflix Windows App - Cadmium Windows Mobile,0:10:00,0:10:00,FR (France)",
        "Kids,2024-03-06 18:30:00,bad,,Peppa Pig: Season 1: Muddy Puddles (Episode 1),,Chromecast,0:05:00,0:05:00,PT (Portugal)",
    ];

    let mut csv = String::from(CSV_HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

/// Builds an event from the handful of fields most tests care about.
pub fn event(
    profile: &str,
    title: &str,
    device_type: &str,
    country: &str,
    start_time: &str,
    duration: &str,
) -> ViewingEvent {
    ViewingEvent::from_record(HistoryRecord {
        profile_name: profile.to_string(),
        start_time: start_time.to_string(),
        duration: duration.to_string(),
        title: title.to_string(),
        device_type: device_type.to_string(),
        country: country.to_string(),
        ..HistoryRecord::default()
    })
}

/// Parsed events of [`sample_csv`].
pub fn sample_events() -> Vec<ViewingEvent> {
    let data = sample_csv();
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    reader
        .deserialize::<HistoryRecord>()
        .map(|record| ViewingEvent::from_record(record.expect("fixture rows are well formed")))
        .collect()
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}
