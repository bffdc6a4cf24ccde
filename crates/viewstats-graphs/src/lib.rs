//! # viewstats graphs
//!
//! Aggregation engine and chart rendering for viewing-history exports.
//!
//! Events are loaded by [`HistoryLoader`], narrowed with a
//! [`ProfileFilter`](viewstats_common::ProfileFilter), reduced into a
//! [`ViewingReport`] by [`ReportBuilder`] and finally drawn with plotters
//! by [`GraphManager`].

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod data_fetcher;
pub mod devices;
pub mod habits;
pub mod manager;
pub mod renderer;
pub mod report;
pub mod summary;
pub mod types;

// Chart implementations
pub mod day_of_week;
pub mod device_pie;
pub mod hourly_distribution;
pub mod top_items;

pub use aggregator::{
    rollup, weekday_name, weekday_rank, AggregationConfig, AggregationManager, Bucket,
    DataAggregator, Rollup,
};
pub use data_fetcher::{profiles, HistoryLoader, LoadStats, LoadedHistory, REQUIRED_COLUMNS};
pub use day_of_week::DayOfWeekChart;
pub use device_pie::DevicePieChart;
pub use devices::{categorize_device, DeviceClassifier};
pub use habits::{BandShare, HabitClassifier, HabitTotals};
pub use hourly_distribution::HourlyDistributionChart;
pub use manager::{GraphManager, PlannedChart};
pub use renderer::{render_chart, ChartDrawing, GraphRenderer};
pub use report::{ReportBuilder, ViewingReport};
pub use summary::{summarize, ViewingSummary};
pub use top_items::{RankedItem, TopItemsChart};
pub use types::*;
