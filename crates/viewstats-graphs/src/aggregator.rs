//! Aggregation engine: group events, sum watch time, order and slice.
//!
//! Every ranked or bucketed report in a [`crate::ViewingReport`] is a
//! [`Rollup`] over the filtered events with a different key.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{Datelike, FixedOffset, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use viewstats_common::{DeviceCategory, Result, ViewingEvent};
use viewstats_config::Config;

use crate::devices::DeviceClassifier;

/// Summed watch time for one aggregation key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket<K> {
    pub key: K,
    /// Total watch time in hours
    pub hours: f64,
    /// Number of events in the bucket
    pub views: usize,
}

/// Group-by with summed durations, kept in first-appearance order until sorted.
#[derive(Debug, Clone)]
pub struct Rollup<K> {
    buckets: Vec<Bucket<K>>,
    seconds: Vec<u64>,
}

impl<K> Rollup<K>
where
    K: Eq + Hash + Clone,
{
    /// Group `events` by `key_fn`. Events for which it returns `None` are left out.
    pub fn new<'a, I, F>(events: I, mut key_fn: F) -> Self
    where
        I: IntoIterator<Item = &'a ViewingEvent>,
        F: FnMut(&ViewingEvent) -> Option<K>,
    {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut keys: Vec<K> = Vec::new();
        let mut seconds: Vec<u64> = Vec::new();
        let mut views: Vec<usize> = Vec::new();

        for event in events {
            let Some(key) = key_fn(event) else {
                continue;
            };
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                keys.push(key);
                seconds.push(0);
                views.push(0);
                keys.len() - 1
            });
            seconds[slot] += u64::from(event.duration.seconds());
            views[slot] += 1;
        }

        let buckets = keys
            .into_iter()
            .zip(&seconds)
            .zip(views)
            .map(|((key, secs), views)| Bucket {
                key,
                hours: *secs as f64 / 3600.0,
                views,
            })
            .collect();

        Self { buckets, seconds }
    }

    /// Largest total first. Stable, so ties keep first-appearance order.
    pub fn sort_by_hours_desc(mut self) -> Self {
        let mut paired: Vec<(Bucket<K>, u64)> =
            self.buckets.into_iter().zip(self.seconds).collect();
        paired.sort_by(|a, b| b.1.cmp(&a.1));
        let (buckets, seconds): (Vec<Bucket<K>>, Vec<u64>) = paired.into_iter().unzip();
        self.buckets = buckets;
        self.seconds = seconds;
        self
    }

    /// Order by a rank derived from the key, ascending.
    pub fn sort_by_rank<R, F>(mut self, mut rank: F) -> Self
    where
        R: Ord,
        F: FnMut(&K) -> R,
    {
        let mut paired: Vec<(Bucket<K>, u64)> =
            self.buckets.into_iter().zip(self.seconds).collect();
        paired.sort_by_key(|(bucket, _)| rank(&bucket.key));
        let (buckets, seconds): (Vec<Bucket<K>>, Vec<u64>) = paired.into_iter().unzip();
        self.buckets = buckets;
        self.seconds = seconds;
        self
    }

    /// Keep at most `limit` buckets; `None` keeps all.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        if let Some(limit) = limit {
            self.buckets.truncate(limit);
            self.seconds.truncate(limit);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn into_buckets(self) -> Vec<Bucket<K>> {
        self.buckets
    }
}

impl<K> Rollup<K>
where
    K: Eq + Hash + Clone + Ord,
{
    pub fn sort_by_key_asc(self) -> Self {
        self.sort_by_rank(K::clone)
    }
}

/// Group and sum in first-appearance order
pub fn rollup<'a, K, I, F>(events: I, key_fn: F) -> Vec<Bucket<K>>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = &'a ViewingEvent>,
    F: FnMut(&ViewingEvent) -> Option<K>,
{
    Rollup::new(events, key_fn).into_buckets()
}

/// Position of a weekday in a Sunday-first week
pub fn weekday_rank(day: &Weekday) -> u32 {
    day.num_days_from_sunday()
}

/// Full English name of a weekday
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Trait for aggregating viewing events into one report
pub trait DataAggregator<T> {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Aggregate already-filtered events
    fn aggregate(&self, events: &[&ViewingEvent]) -> Result<Vec<T>>;
}

/// Watch time per device category, largest first
#[derive(Debug, Clone)]
pub struct TopDevicesAggregator {
    pub classifier: DeviceClassifier,
    pub limit: Option<usize>,
}

impl DataAggregator<Bucket<DeviceCategory>> for TopDevicesAggregator {
    fn name(&self) -> &'static str {
        "top_devices"
    }

    #[instrument(skip_all, fields(events = events.len()))]
    fn aggregate(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<DeviceCategory>>> {
        let result = Rollup::new(events.iter().copied(), |event| {
            Some(self.classifier.categorize(&event.device_type))
        })
        .sort_by_hours_desc()
        .limit(self.limit)
        .into_buckets();

        debug!("Aggregated {} device buckets", result.len());
        Ok(result)
    }
}

/// Watch time per raw country string, largest first
#[derive(Debug, Clone, Default)]
pub struct TopCountriesAggregator {
    pub limit: Option<usize>,
}

impl DataAggregator<Bucket<String>> for TopCountriesAggregator {
    fn name(&self) -> &'static str {
        "top_countries"
    }

    #[instrument(skip_all, fields(events = events.len()))]
    fn aggregate(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<String>>> {
        let result = Rollup::new(events.iter().copied(), |event| Some(event.country.clone()))
            .sort_by_hours_desc()
            .limit(self.limit)
            .into_buckets();

        debug!("Aggregated {} country buckets", result.len());
        Ok(result)
    }
}

/// Watch time per title, largest first
#[derive(Debug, Clone, Default)]
pub struct TopTitlesAggregator {
    pub limit: Option<usize>,
}

impl DataAggregator<Bucket<String>> for TopTitlesAggregator {
    fn name(&self) -> &'static str {
        "top_titles"
    }

    #[instrument(skip_all, fields(events = events.len()))]
    fn aggregate(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<String>>> {
        let result = Rollup::new(events.iter().copied(), |event| Some(event.title.clone()))
            .sort_by_hours_desc()
            .limit(self.limit)
            .into_buckets();

        debug!("Aggregated {} title buckets", result.len());
        Ok(result)
    }
}

/// Watch time per local start hour, ascending by hour.
///
/// Only hours that occur are listed; events without a start time are skipped.
#[derive(Debug, Clone)]
pub struct HourlyAggregator {
    pub offset: FixedOffset,
}

impl DataAggregator<Bucket<u32>> for HourlyAggregator {
    fn name(&self) -> &'static str {
        "hourly"
    }

    #[instrument(skip_all, fields(events = events.len()))]
    fn aggregate(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<u32>>> {
        let result = Rollup::new(events.iter().copied(), |event| {
            event.local_start(self.offset).map(|start| start.hour())
        })
        .sort_by_key_asc()
        .into_buckets();

        debug!("Aggregated {} hourly buckets", result.len());
        Ok(result)
    }
}

/// Watch time per local weekday, Sunday first.
///
/// Only weekdays that occur are listed; events without a start time are skipped.
#[derive(Debug, Clone)]
pub struct WeekdayAggregator {
    pub offset: FixedOffset,
}

impl DataAggregator<Bucket<Weekday>> for WeekdayAggregator {
    fn name(&self) -> &'static str {
        "weekday"
    }

    #[instrument(skip_all, fields(events = events.len()))]
    fn aggregate(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<Weekday>>> {
        let result = Rollup::new(events.iter().copied(), |event| {
            event.local_start(self.offset).map(|start| start.weekday())
        })
        .sort_by_rank(weekday_rank)
        .into_buckets();

        debug!("Aggregated {} weekday buckets", result.len());
        Ok(result)
    }
}

/// Limits and clock shared by the report aggregators
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    pub top_devices: usize,
    pub top_countries: usize,
    pub top_titles: usize,
    pub offset: FixedOffset,
}

impl AggregationConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_devices: config.report.top_devices,
            top_countries: config.report.top_countries,
            top_titles: config.report.top_titles,
            offset: config.time.offset(),
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Runs every report aggregator with one set of limits
#[derive(Debug, Clone)]
pub struct AggregationManager {
    config: AggregationConfig,
    classifier: DeviceClassifier,
}

impl AggregationManager {
    pub fn new(config: AggregationConfig, classifier: DeviceClassifier) -> Self {
        Self { config, classifier }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AggregationConfig::from_config(config),
            DeviceClassifier::from_config(&config.devices),
        )
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn classifier(&self) -> &DeviceClassifier {
        &self.classifier
    }

    pub fn top_devices(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<DeviceCategory>>> {
        TopDevicesAggregator {
            classifier: self.classifier.clone(),
            limit: Some(self.config.top_devices),
        }
        .aggregate(events)
    }

    pub fn top_countries(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<String>>> {
        TopCountriesAggregator {
            limit: Some(self.config.top_countries),
        }
        .aggregate(events)
    }

    pub fn top_titles(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<String>>> {
        TopTitlesAggregator {
            limit: Some(self.config.top_titles),
        }
        .aggregate(events)
    }

    pub fn hourly(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<u32>>> {
        HourlyAggregator {
            offset: self.config.offset,
        }
        .aggregate(events)
    }

    pub fn weekday(&self, events: &[&ViewingEvent]) -> Result<Vec<Bucket<Weekday>>> {
        WeekdayAggregator {
            offset: self.config.offset,
        }
        .aggregate(events)
    }
}

impl Default for AggregationManager {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
