//! Configuration management for viewstats

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{
    ChartFormat, ChartSelection, ChartsConfig, Config, DeviceRule, DevicesConfig, HabitsConfig,
    InputConfig, ReportConfig, TimeConfig,
};
