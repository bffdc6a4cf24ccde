//! Full report for one profile selection

use std::fmt;
use std::path::Path;

use chrono::Weekday;
use serde::{Serialize, Serializer};
use tracing::{info, instrument};
use viewstats_common::{
    format_hour, format_hours, truncate_string, DeviceCategory, ProfileFilter, Result,
    ViewingEvent,
};
use viewstats_config::Config;

use crate::aggregator::{weekday_name, AggregationManager, Bucket};
use crate::habits::{BandShare, HabitClassifier};
use crate::summary::{summarize, ViewingSummary};

const TITLE_WIDTH: usize = 48;

/// Summary plus every ranked and bucketed breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewingReport {
    pub summary: ViewingSummary,
    pub top_devices: Vec<Bucket<DeviceCategory>>,
    pub top_countries: Vec<Bucket<String>>,
    pub top_titles: Vec<Bucket<String>>,
    /// Hours that occur, ascending
    pub hourly: Vec<Bucket<u32>>,
    /// Weekdays that occur, Sunday first; keys serialized as full names
    #[serde(serialize_with = "weekday_by_name")]
    pub weekday: Vec<Bucket<Weekday>>,
    pub habits: Vec<BandShare>,
}

fn weekday_by_name<S: Serializer>(
    buckets: &[Bucket<Weekday>],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(buckets.iter().map(|bucket| Bucket {
        key: weekday_name(bucket.key),
        hours: bucket.hours,
        views: bucket.views,
    }))
}

impl ViewingReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "Wrote report");
        Ok(())
    }

    /// Hours watched for each of the 24 hours, zero where nothing was watched
    pub fn hourly_filled(&self) -> [f64; 24] {
        let mut hours = [0.0; 24];
        for bucket in &self.hourly {
            if let Some(slot) = hours.get_mut(bucket.key as usize) {
                *slot = bucket.hours;
            }
        }
        hours
    }
}

/// Runs the filter, aggregation, summary and habit steps for one selection
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    aggregations: AggregationManager,
    habits: HabitClassifier,
}

impl ReportBuilder {
    pub fn new(aggregations: AggregationManager, habits: HabitClassifier) -> Self {
        Self {
            aggregations,
            habits,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AggregationManager::from_config(config),
            HabitClassifier::from_config(config),
        )
    }

    /// Build the report for `filter`, recomputing everything from `events`.
    #[instrument(skip(self, events), fields(events = events.len(), profile = %filter))]
    pub fn build(&self, events: &[ViewingEvent], filter: &ProfileFilter) -> Result<ViewingReport> {
        let selected = filter.apply(events);

        let report = ViewingReport {
            summary: summarize(
                &selected,
                filter,
                self.aggregations.classifier(),
                &self.habits,
            ),
            top_devices: self.aggregations.top_devices(&selected)?,
            top_countries: self.aggregations.top_countries(&selected)?,
            top_titles: self.aggregations.top_titles(&selected)?,
            hourly: self.aggregations.hourly(&selected)?,
            weekday: self.aggregations.weekday(&selected)?,
            habits: self.habits.totals(&selected).shares(),
        };

        info!(
            views = report.summary.total_views,
            hours = report.summary.total_hours,
            "Built viewing report"
        );
        Ok(report)
    }
}

fn write_ranking<K, F>(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    buckets: &[Bucket<K>],
    mut label: F,
) -> fmt::Result
where
    F: FnMut(&K) -> String,
{
    writeln!(f)?;
    writeln!(f, "{heading}")?;
    if buckets.is_empty() {
        return writeln!(f, "  (no data)");
    }
    for (rank, bucket) in buckets.iter().enumerate() {
        writeln!(
            f,
            "  {:>2}. {:<width$} {:>10} {:>5} views",
            rank + 1,
            truncate_string(&label(&bucket.key), TITLE_WIDTH),
            format_hours(bucket.hours),
            bucket.views,
            width = TITLE_WIDTH,
        )?;
    }
    Ok(())
}

impl fmt::Display for ViewingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        writeln!(f, "Viewing report: {}", summary.profile)?;
        writeln!(f, "  Total views:        {}", summary.total_views)?;
        writeln!(f, "  Total hours:        {:.2}", summary.total_hours)?;
        writeln!(f, "  Average duration:   {:.2} min", summary.average_duration_minutes)?;
        writeln!(
            f,
            "  Most watched title: {}",
            summary.most_watched_title.as_deref().unwrap_or("-")
        )?;
        writeln!(
            f,
            "  Preferred device:   {}",
            summary
                .preferred_device
                .map_or_else(|| "-".to_string(), |device| device.to_string())
        )?;
        writeln!(f, "  Viewing habit:      {}", summary.viewing_habit)?;

        write_ranking(f, "Top devices", &self.top_devices, |device| device.to_string())?;
        write_ranking(f, "Top countries", &self.top_countries, |country| {
            if country.is_empty() {
                "(unknown)".to_string()
            } else {
                country.clone()
            }
        })?;
        write_ranking(f, "Top titles", &self.top_titles, String::clone)?;
        write_ranking(f, "Hours by time of day", &self.hourly, |hour| format_hour(*hour))?;
        write_ranking(f, "Hours by day of week", &self.weekday, |day| {
            weekday_name(*day).to_string()
        })?;

        writeln!(f)?;
        writeln!(f, "Habit bands")?;
        for share in &self.habits {
            writeln!(f, "  {:<20} {:>10}", share.band.label(), format_hours(share.hours))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewstats_common::test_utils::sample_events;
    use viewstats_common::HabitBand;

    #[test]
    fn test_build_all_users() {
        let report = ReportBuilder::default()
            .build(&sample_events(), &ProfileFilter::All)
            .unwrap();

        assert_eq!(report.summary.total_views, 8);
        assert_eq!(report.top_devices.len(), 4);
        assert_eq!(report.top_countries.len(), 3);
        assert_eq!(report.top_titles.len(), 6);
        assert_eq!(report.hourly.len(), 6);
        assert_eq!(report.weekday.len(), 6);
        assert_eq!(report.habits.len(), 5);
    }

    #[test]
    fn test_build_is_recomputed_per_filter() {
        let builder = ReportBuilder::default();
        let events = sample_events();

        let pati = builder.build(&events, &ProfileFilter::profile("Pati")).unwrap();
        let nuno = builder.build(&events, &ProfileFilter::profile("Nuno")).unwrap();

        assert_eq!(pati.summary.total_views, 3);
        assert_eq!(nuno.summary.total_views, 4);
        assert_eq!(nuno.summary.viewing_habit, HabitBand::LateNight);
        assert_eq!(nuno.top_countries[0].key, "PT (Portugal)");
        assert_eq!(nuno.top_countries[1].key, "FR (France)");
    }

    #[test]
    fn test_hourly_filled() {
        let report = ReportBuilder::default()
            .build(&sample_events(), &ProfileFilter::All)
            .unwrap();
        let filled = report.hourly_filled();

        assert_eq!(filled[2], 2.0);
        assert_eq!(filled[3], 0.0);
        assert_eq!(filled[20], 1.0);
        assert_eq!(filled.iter().filter(|h| **h > 0.0).count(), 5);
    }

    #[test]
    fn test_json_shape() {
        let report = ReportBuilder::default()
            .build(&sample_events(), &ProfileFilter::profile("Pati"))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["summary"]["profile"], "Pati");
        assert_eq!(value["summary"]["viewing_habit"], "After Work Viewer");
        assert_eq!(value["summary"]["preferred_device"], "TV");
        assert_eq!(value["top_devices"][0]["key"], "TV");
        assert_eq!(value["hourly"][0]["key"], 9);
    }

    #[test]
    fn test_json_weekday_keys_are_full_names() {
        let report = ReportBuilder::default()
            .build(&sample_events(), &ProfileFilter::All)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let days = value["weekday"].as_array().unwrap();

        assert_eq!(days.len(), report.weekday.len());
        for (json, bucket) in days.iter().zip(&report.weekday) {
            assert_eq!(json["key"], weekday_name(bucket.key));
            assert_eq!(json["views"], bucket.views);
        }
        assert_eq!(days[0]["key"], "Sunday");
    }

    #[test]
    fn test_text_rendering() {
        let report = ReportBuilder::default()
            .build(&sample_events(), &ProfileFilter::All)
            .unwrap();
        let text = report.to_string();

        assert!(text.starts_with("Viewing report: All Users"));
        assert!(text.contains("Night Owl"));
        assert!(text.contains("Videogame"));
        assert!(text.contains("02:00"));
        assert!(text.contains("Sunday"));
    }

    #[test]
    fn test_text_rendering_empty() {
        let report = ReportBuilder::default()
            .build(&sample_events(), &ProfileFilter::profile("Nobody"))
            .unwrap();
        let text = report.to_string();

        assert!(text.contains("Most watched title: -"));
        assert!(text.contains("(no data)"));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = ReportBuilder::default()
            .build(&sample_events(), &ProfileFilter::All)
            .unwrap();

        report.write_json(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"total_views\": 8"));
    }
}
