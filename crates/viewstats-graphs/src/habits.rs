//! Time-of-day habit classification

use chrono::{FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use viewstats_common::{round2, HabitBand, HabitBoundary, ViewingEvent};
use viewstats_config::Config;

/// Watch time in one habit band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandShare {
    pub band: HabitBand,
    pub hours: f64,
}

/// Seconds watched per band, indexed in [`HabitBand::ALL`] order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HabitTotals {
    seconds: [u64; 5],
}

impl HabitTotals {
    fn slot(band: HabitBand) -> usize {
        HabitBand::ALL
            .iter()
            .position(|candidate| *candidate == band)
            .unwrap_or_default()
    }

    pub fn add(&mut self, band: HabitBand, seconds: u32) {
        self.seconds[Self::slot(band)] += u64::from(seconds);
    }

    pub fn hours(&self, band: HabitBand) -> f64 {
        self.seconds[Self::slot(band)] as f64 / 3600.0
    }

    /// Band with the most watch time; earlier bands win ties, so an empty
    /// total resolves to [`HabitBand::Morning`].
    pub fn dominant(&self) -> HabitBand {
        let mut best = HabitBand::ALL[0];
        let mut best_seconds = self.seconds[0];
        for (band, seconds) in HabitBand::ALL.iter().zip(self.seconds).skip(1) {
            if seconds > best_seconds {
                best = *band;
                best_seconds = seconds;
            }
        }
        best
    }

    /// Per-band hours rounded to two decimals, in band order
    pub fn shares(&self) -> Vec<BandShare> {
        HabitBand::ALL
            .iter()
            .map(|band| BandShare {
                band: *band,
                hours: round2(self.hours(*band)),
            })
            .collect()
    }
}

/// Sums watch time per time-of-day band and names the dominant habit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitClassifier {
    pub boundary: HabitBoundary,
    pub offset: FixedOffset,
}

impl HabitClassifier {
    pub fn new(boundary: HabitBoundary, offset: FixedOffset) -> Self {
        Self { boundary, offset }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.habits.boundary, config.time.offset())
    }

    /// Band of a single event; `None` without a start time or outside every band
    pub fn band_of(&self, event: &ViewingEvent) -> Option<HabitBand> {
        event
            .local_start(self.offset)
            .and_then(|start| self.boundary.band_for_hour(start.hour()))
    }

    pub fn totals(&self, events: &[&ViewingEvent]) -> HabitTotals {
        let mut totals = HabitTotals::default();
        for event in events {
            if let Some(band) = self.band_of(event) {
                totals.add(band, event.duration.seconds());
            }
        }
        totals
    }

    pub fn classify(&self, events: &[&ViewingEvent]) -> HabitBand {
        self.totals(events).dominant()
    }
}

impl Default for HabitClassifier {
    fn default() -> Self {
        Self::new(HabitBoundary::default(), Utc.fix())
    }
}
