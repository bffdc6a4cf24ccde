//! Per-profile viewing summary

use serde::{Deserialize, Serialize};
use viewstats_common::{round2, DeviceCategory, HabitBand, ProfileFilter, ViewingEvent};

use crate::aggregator::Rollup;
use crate::devices::DeviceClassifier;
use crate::habits::HabitClassifier;

/// Headline numbers for one profile selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingSummary {
    /// "All Users" or the selected profile name
    pub profile: String,
    pub total_views: usize,
    /// Total watch time in hours, two decimals
    pub total_hours: f64,
    /// Mean event length in minutes, two decimals; zero for an empty selection
    pub average_duration_minutes: f64,
    pub most_watched_title: Option<String>,
    pub preferred_device: Option<DeviceCategory>,
    /// Serialized as the habit name, e.g. "Night Owl"
    #[serde(with = "habit_label")]
    pub viewing_habit: HabitBand,
}

mod habit_label {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use viewstats_common::HabitBand;

    pub fn serialize<S: Serializer>(band: &HabitBand, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(band.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HabitBand, D::Error> {
        let label = String::deserialize(deserializer)?;
        HabitBand::from_label(&label)
            .ok_or_else(|| D::Error::custom(format!("unknown viewing habit '{label}'")))
    }
}

/// Compute the summary of already-filtered events.
///
/// Ties for the most watched title and preferred device go to whichever
/// appeared first in the export.
pub fn summarize(
    events: &[&ViewingEvent],
    filter: &ProfileFilter,
    devices: &DeviceClassifier,
    habits: &HabitClassifier,
) -> ViewingSummary {
    let total_seconds: u64 = events
        .iter()
        .map(|event| u64::from(event.duration.seconds()))
        .sum();
    let total_views = events.len();

    let average_duration_minutes = if total_views == 0 {
        0.0
    } else {
        round2(total_seconds as f64 / 60.0 / total_views as f64)
    };

    let most_watched_title = Rollup::new(events.iter().copied(), |event| Some(event.title.clone()))
        .sort_by_hours_desc()
        .into_buckets()
        .into_iter()
        .next()
        .map(|bucket| bucket.key);

    let preferred_device = Rollup::new(events.iter().copied(), |event| {
        Some(devices.categorize(&event.device_type))
    })
    .sort_by_hours_desc()
    .into_buckets()
    .into_iter()
    .next()
    .map(|bucket| bucket.key);

    ViewingSummary {
        profile: filter.label().to_string(),
        total_views,
        total_hours: round2(total_seconds as f64 / 3600.0),
        average_duration_minutes,
        most_watched_title,
        preferred_device,
        viewing_habit: habits.classify(events),
    }
}
