//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ViewStatsError;
use crate::history::ViewingEvent;

/// Label used by the export tooling for the unfiltered view.
pub const ALL_PROFILES_LABEL: &str = "All Users";

/// Length of a single viewing event, stored in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WatchDuration(u32);

impl WatchDuration {
    /// A zero-length duration, used for missing or malformed input.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from hour, minute and second components.
    ///
    /// Returns `None` if the total does not fit in a `u32`.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Option<Self> {
        hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)
            .map(Self)
    }

    /// Total seconds.
    pub const fn seconds(self) -> u32 {
        self.0
    }

    /// Fractional hours (`h + m/60 + s/3600`).
    pub fn hours(self) -> f64 {
        f64::from(self.0) / 3600.0
    }

    /// Fractional minutes.
    pub fn minutes(self) -> f64 {
        f64::from(self.0) / 60.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WatchDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{hours}:{minutes:02}:{seconds:02}")
    }
}

/// Restricts an event set to one profile or passes everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ProfileFilter {
    /// Every profile in the export.
    #[default]
    All,
    /// A single profile, matched by exact name.
    Profile(String),
}

impl ProfileFilter {
    /// Filter for a single named profile.
    pub fn profile(name: impl Into<String>) -> Self {
        Self::Profile(name.into())
    }

    /// Whether an event belonging to `profile` passes the filter.
    pub fn matches(&self, profile: &str) -> bool {
        match self {
            Self::All => true,
            Self::Profile(name) => name == profile,
        }
    }

    /// Events passing the filter, in export order.
    pub fn apply<'a>(&self, events: &'a [ViewingEvent]) -> Vec<&'a ViewingEvent> {
        events
            .iter()
            .filter(|event| self.matches(&event.profile))
            .collect()
    }

    /// Label shown in reports ("All Users" or the profile name).
    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_PROFILES_LABEL,
            Self::Profile(name) => name,
        }
    }
}

impl fmt::Display for ProfileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ProfileFilter {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_PROFILES_LABEL) {
            Self::All
        } else {
            Self::Profile(trimmed.to_string())
        }
    }
}

impl From<ProfileFilter> for String {
    fn from(value: ProfileFilter) -> Self {
        value.label().to_string()
    }
}

impl FromStr for ProfileFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// Normalized device bucket derived from the free-text device string.
///
/// Deserialization goes through [`FromStr`], so configured names are
/// case-insensitive (`tv`, `TV`, `Videogame`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum DeviceCategory {
    #[serde(rename = "TV")]
    Tv,
    Phone,
    Tablet,
    Laptop,
    #[serde(rename = "PC")]
    Pc,
    Videogame,
    Other,
}

impl DeviceCategory {
    /// All categories, fallback last.
    pub const ALL: [Self; 7] = [
        Self::Tv,
        Self::Phone,
        Self::Tablet,
        Self::Laptop,
        Self::Pc,
        Self::Videogame,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::Phone => "Phone",
            Self::Tablet => "Tablet",
            Self::Laptop => "Laptop",
            Self::Pc => "PC",
            Self::Videogame => "Videogame",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceCategory {
    type Err = ViewStatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ViewStatsError::validation_field(format!("Unknown device category '{s}'"), "category")
            })
    }
}

impl TryFrom<String> for DeviceCategory {
    type Error = ViewStatsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One of the five fixed time-of-day windows used to characterize viewing habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitBand {
    /// 05:00 - 12:00
    Morning,
    /// 12:00 - 18:00
    Afternoon,
    /// 18:00 - 21:00
    Evening,
    /// 21:00 - 24:00
    EarlyNight,
    /// 00:00 - 05:00
    LateNight,
}

impl HabitBand {
    /// Bands in tie-break order.
    pub const ALL: [Self; 5] = [
        Self::Morning,
        Self::Afternoon,
        Self::Evening,
        Self::EarlyNight,
        Self::LateNight,
    ];

    /// Habit name given to a profile whose viewing is dominated by this band.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning Viewer",
            Self::Afternoon => "Afternoon Viewer",
            Self::Evening => "After Work Viewer",
            Self::EarlyNight => "Before Bed Viewer",
            Self::LateNight => "Night Owl",
        }
    }

    /// Band whose habit name is `label`, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|band| band.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for HabitBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upper bound used for the early-night band.
///
/// Older dashboards compared the hour against `0` instead of `24`, which left
/// the 21:00 - 24:00 band permanently empty. `Legacy` keeps that behaviour for
/// reproducing their numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitBoundary {
    #[default]
    Corrected,
    Legacy,
}

impl HabitBoundary {
    /// Band a local start hour falls into, if any.
    pub fn band_for_hour(self, hour: u32) -> Option<HabitBand> {
        match hour {
            5..=11 => Some(HabitBand::Morning),
            12..=17 => Some(HabitBand::Afternoon),
            18..=20 => Some(HabitBand::Evening),
            21..=23 => match self {
                Self::Corrected => Some(HabitBand::EarlyNight),
                Self::Legacy => None,
            },
            0..=4 => Some(HabitBand::LateNight),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_duration_components() {
        let duration = WatchDuration::from_hms(1, 30, 0).unwrap();
        assert_eq!(duration.seconds(), 5400);
        assert!((duration.hours() - 1.5).abs() < f64::EPSILON);
        assert!((duration.minutes() - 90.0).abs() < f64::EPSILON);
        assert_eq!(duration.to_string(), "1:30:00");
    }

    #[test]
    fn test_watch_duration_overflow() {
        assert!(WatchDuration::from_hms(u32::MAX, 0, 0).is_none());
    }

    #[test]
    fn test_profile_filter_parsing() {
        assert_eq!("All Users".parse::<ProfileFilter>().unwrap(), ProfileFilter::All);
        assert_eq!("all users".parse::<ProfileFilter>().unwrap(), ProfileFilter::All);
        assert_eq!("".parse::<ProfileFilter>().unwrap(), ProfileFilter::All);
        assert_eq!(
            " Pati ".parse::<ProfileFilter>().unwrap(),
            ProfileFilter::profile("Pati")
        );
    }

    #[test]
    fn test_profile_filter_matching() {
        assert!(ProfileFilter::All.matches("anyone"));
        let filter = ProfileFilter::profile("Nuno");
        assert!(filter.matches("Nuno"));
        assert!(!filter.matches("nuno"));
        assert!(!filter.matches("Pedro"));
    }

    #[test]
    fn test_profile_filter_apply_keeps_order() {
        let events: Vec<ViewingEvent> = ["Pati", "Nuno", "Pati", "Kids"]
            .iter()
            .map(|profile| ViewingEvent::from_record(crate::history::HistoryRecord {
                profile_name: profile.to_string(),
                ..Default::default()
            }))
            .collect();

        assert_eq!(ProfileFilter::All.apply(&events).len(), 4);

        let pati = ProfileFilter::profile("Pati").apply(&events);
        assert_eq!(pati.len(), 2);
        assert!(std::ptr::eq(pati[0], &events[0]));
        assert!(std::ptr::eq(pati[1], &events[2]));

        assert!(ProfileFilter::profile("Nobody").apply(&events).is_empty());
    }

    #[test]
    fn test_device_category_round_trip_names() {
        for category in DeviceCategory::ALL {
            assert_eq!(category.as_str().parse::<DeviceCategory>().unwrap(), category);
        }
        assert!("Toaster".parse::<DeviceCategory>().is_err());
        assert_eq!(serde_json::to_string(&DeviceCategory::Tv).unwrap(), "\"TV\"");
    }

    #[test]
    fn test_habit_band_labels() {
        assert_eq!(HabitBand::Evening.label(), "After Work Viewer");
        assert_eq!(HabitBand::LateNight.to_string(), "Night Owl");
    }

    #[test]
    fn test_band_for_hour_boundaries() {
        let corrected = HabitBoundary::Corrected;
        assert_eq!(corrected.band_for_hour(4), Some(HabitBand::LateNight));
        assert_eq!(corrected.band_for_hour(5), Some(HabitBand::Morning));
        assert_eq!(corrected.band_for_hour(12), Some(HabitBand::Afternoon));
        assert_eq!(corrected.band_for_hour(18), Some(HabitBand::Evening));
        assert_eq!(corrected.band_for_hour(21), Some(HabitBand::EarlyNight));
        assert_eq!(corrected.band_for_hour(23), Some(HabitBand::EarlyNight));
        assert_eq!(corrected.band_for_hour(24), None);

        assert_eq!(HabitBoundary::Legacy.band_for_hour(22), None);
        assert_eq!(HabitBoundary::Legacy.band_for_hour(20), Some(HabitBand::Evening));
        assert_eq!(HabitBoundary::default(), HabitBoundary::Corrected);
    }
}
