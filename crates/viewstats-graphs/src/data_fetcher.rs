//! Viewing-history loading from CSV exports

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use viewstats_common::{HistoryRecord, Result, ViewStatsError, ViewingEvent};
use viewstats_config::InputConfig;

/// Columns without which an export cannot be summarized
pub const REQUIRED_COLUMNS: [&str; 4] = ["Profile Name", "Start Time", "Duration", "Title"];

/// Counters collected while reading an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Data rows seen, excluding the header
    pub rows_read: usize,
    /// Rows that could not be decoded and were dropped
    pub rows_skipped: usize,
    /// Kept events whose start time could not be parsed
    pub invalid_timestamps: usize,
    /// Trailers and similar rows dropped by configuration
    pub supplemental_excluded: usize,
}

/// Events read from one export together with their load counters
#[derive(Debug, Clone, Default)]
pub struct LoadedHistory {
    pub events: Vec<ViewingEvent>,
    pub stats: LoadStats,
}

impl LoadedHistory {
    /// Distinct profile names in order of first appearance
    pub fn profiles(&self) -> Vec<String> {
        profiles(&self.events)
    }
}

/// Reads viewing-history CSV exports into [`ViewingEvent`]s
#[derive(Debug, Clone, Default)]
pub struct HistoryLoader {
    exclude_supplemental: bool,
}

impl HistoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            exclude_supplemental: config.exclude_supplemental,
        }
    }

    /// Drop trailers, teasers and other supplemental videos
    pub fn exclude_supplemental(mut self, exclude: bool) -> Self {
        self.exclude_supplemental = exclude;
        self
    }

    /// Load an export from disk
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedHistory> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ViewStatsError::with_source(
                format!("Failed to open history file {}", path.display()),
                e,
            )
        })?;

        let history = self.load_reader(file)?;
        info!(
            events = history.events.len(),
            skipped = history.stats.rows_skipped,
            invalid_timestamps = history.stats.invalid_timestamps,
            "Loaded viewing history"
        );
        Ok(history)
    }

    /// Load an export from any reader.
    ///
    /// Blank lines are ignored and rows may have fewer or more fields than the
    /// header. Rows that cannot be decoded are logged and skipped; an I/O
    /// failure or a missing required column fails the whole load.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedHistory> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|header| header == *column))
            .collect();
        if !missing.is_empty() {
            return Err(ViewStatsError::history(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let mut history = LoadedHistory::default();
        for row in reader.records() {
            history.stats.rows_read += 1;

            let mut row = match row {
                Ok(row) => row,
                Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => return Err(err.into()),
                Err(err) => {
                    let line = err.position().map(csv::Position::line);
                    warn!(?line, error = %err, "Skipping malformed history row");
                    history.stats.rows_skipped += 1;
                    continue;
                }
            };
            fit_to_headers(&mut row, headers.len());

            let record = match row.deserialize::<HistoryRecord>(Some(&headers)) {
                Ok(record) => record,
                Err(err) => {
                    let line = row.position().map(csv::Position::line);
                    warn!(?line, error = %err, "Skipping undecodable history row");
                    history.stats.rows_skipped += 1;
                    continue;
                }
            };

            let event = ViewingEvent::from_record(record);
            if self.exclude_supplemental && event.is_supplemental() {
                history.stats.supplemental_excluded += 1;
                continue;
            }
            if !event.has_valid_start() {
                history.stats.invalid_timestamps += 1;
            }
            history.events.push(event);
        }

        debug!(?history.stats, "Finished reading history rows");
        Ok(history)
    }
}

/// Pad a short row with empty fields and drop fields past the last header
fn fit_to_headers(row: &mut StringRecord, width: usize) {
    if row.len() > width {
        row.truncate(width);
    }
    while row.len() < width {
        row.push_field("");
    }
}

/// Distinct profile names in order of first appearance
pub fn profiles(events: &[ViewingEvent]) -> Vec<String> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|event| seen.insert(event.profile.as_str()))
        .map(|event| event.profile.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewstats_common::test_utils::{sample_csv, CSV_HEADER};

    #[test]
    fn test_load_sample_export() {
        let history = HistoryLoader::new()
            .load_reader(sample_csv().as_bytes())
            .unwrap();

        assert_eq!(history.events.len(), 8);
        assert_eq!(history.stats.rows_read, 8);
        assert_eq!(history.stats.rows_skipped, 0);
        assert_eq!(history.stats.invalid_timestamps, 1);
        assert_eq!(history.stats.supplemental_excluded, 0);
        assert_eq!(history.events[0].profile, "Pati");
        assert_eq!(history.events[0].country, "PT (Portugal)");
    }

    #[test]
    fn test_exclude_supplemental() {
        let history = HistoryLoader::new()
            .exclude_supplemental(true)
            .load_reader(sample_csv().as_bytes())
            .unwrap();

        assert_eq!(history.events.len(), 7);
        assert_eq!(history.stats.supplemental_excluded, 1);
        assert!(history.events.iter().all(|e| !e.is_supplemental()));
    }

    #[test]
    fn test_profiles_first_appearance_order() {
        let history = HistoryLoader::new()
            .load_reader(sample_csv().as_bytes())
            .unwrap();
        assert_eq!(history.profiles(), vec!["Pati", "Nuno", "Kids"]);
        assert!(profiles(&[]).is_empty());
    }

    #[test]
    fn test_blank_lines_and_short_rows() {
        let csv = format!(
            "{CSV_HEADER}\n\nPati,2024-03-01 20:15:00,1:00:00,,Dark\n\nNuno,2024-03-02 10:00:00,0:30:00,,Inception,,Sony PS4,0:30:00,0:30:00,PT (Portugal),extra\n"
        );
        let history = HistoryLoader::new().load_reader(csv.as_bytes()).unwrap();

        assert_eq!(history.events.len(), 2);
        assert_eq!(history.events[0].device_type, "");
        assert_eq!(history.events[0].country, "");
        assert_eq!(history.events[1].device_type, "Sony PS4");
    }

    #[test]
    fn test_short_row_is_kept_not_skipped() {
        let csv = format!("{CSV_HEADER}\nPati,2024-03-01 20:15:00,1:00:00,,Dark\n");
        let history = HistoryLoader::new().load_reader(csv.as_bytes()).unwrap();

        assert_eq!(history.events.len(), 1);
        assert_eq!(history.stats.rows_skipped, 0);
        assert_eq!(history.events[0].title, "Dark");
        assert_eq!(history.events[0].duration.seconds(), 3600);
        assert!(!history.events[0].is_supplemental());
    }

    #[test]
    fn test_fit_to_headers() {
        let mut short = StringRecord::from(vec!["a", "b"]);
        fit_to_headers(&mut short, 4);
        assert_eq!(short.iter().collect::<Vec<_>>(), ["a", "b", "", ""]);

        let mut long = StringRecord::from(vec!["a", "b", "c"]);
        fit_to_headers(&mut long, 2);
        assert_eq!(long.iter().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_minimal_columns_accepted() {
        let csv = "Title,Duration,Start Time,Profile Name\nDark,0:50:00,2024-03-01 21:00:00,Pati\n";
        let history = HistoryLoader::new().load_reader(csv.as_bytes()).unwrap();

        assert_eq!(history.events.len(), 1);
        assert_eq!(history.events[0].title, "Dark");
        assert_eq!(history.events[0].duration.seconds(), 3000);
    }

    #[test]
    fn test_missing_required_columns() {
        let err = HistoryLoader::new()
            .load_reader("Profile Name,Title\nPati,Dark\n".as_bytes())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Start Time"));
        assert!(message.contains("Duration"));

        assert!(HistoryLoader::new().load_reader("".as_bytes()).is_err());
    }

    #[test]
    fn test_invalid_utf8_row_skipped() {
        let mut bytes = format!("{CSV_HEADER}\n").into_bytes();
        bytes.extend_from_slice(b"Pati,2024-03-01 20:15:00,1:00:00,,\xff\xfe,,TV,,,PT\n");
        bytes.extend_from_slice(b"Pati,2024-03-01 21:15:00,1:00:00,,Dark,,TV,,,PT\n");

        let history = HistoryLoader::new().load_reader(bytes.as_slice()).unwrap();
        assert_eq!(history.events.len(), 1);
        assert_eq!(history.stats.rows_read, 2);
        assert_eq!(history.stats.rows_skipped, 1);
    }

    #[test]
    fn test_missing_file() {
        let result = HistoryLoader::new().load_path("/nonexistent/ViewingActivity.csv");
        assert!(result.unwrap_err().to_string().contains("ViewingActivity.csv"));
    }
}
