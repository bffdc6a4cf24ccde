//! Application configuration structures

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};
use viewstats_common::{DeviceCategory, HabitBoundary, LoggingConfig};

use crate::validation::{validate_log_level, validate_palette};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// History file handling
    pub input: InputConfig,

    /// Ranking limits and default profile
    #[validate]
    pub report: ReportConfig,

    /// Time-of-day habit classification
    pub habits: HabitsConfig,

    /// Device categorization table
    pub devices: DevicesConfig,

    /// Chart rendering settings
    #[validate]
    pub charts: ChartsConfig,

    /// Clock used for hour and weekday bucketing
    pub time: TimeConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        // Derived rules first, then the checks the derive cannot express
        self.validate()?;

        let mut errors = ValidationErrors::new();

        if let Err(err) = self.devices.validate_rules() {
            errors.add("devices", err);
        }

        if let Err(err) = validate_palette(&self.charts.palette) {
            errors.add("palette", err);
        }

        if let Err(err) = self.time.validate_offset() {
            errors.add("utc_offset_minutes", err);
        }

        if let Err(err) = validate_log_level(&self.logging.level) {
            errors.add("level", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Input handling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// History CSV used when none is given on the command line
    pub path: Option<String>,

    /// Drop trailers, teasers and other supplemental videos while loading
    pub exclude_supplemental: bool,
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of device categories kept in the device ranking
    #[validate(range(min = 1, max = 100, message = "Top devices must be between 1 and 100"))]
    pub top_devices: usize,

    /// Number of countries kept in the country ranking
    #[validate(range(min = 1, max = 100, message = "Top countries must be between 1 and 100"))]
    pub top_countries: usize,

    /// Number of titles kept in the title ranking
    #[validate(range(min = 1, max = 100, message = "Top titles must be between 1 and 100"))]
    pub top_titles: usize,

    /// Profile selected when `--profile` is not given; all profiles when absent
    pub default_profile: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_devices: 5,
            top_countries: 7,
            top_titles: 10,
            default_profile: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitsConfig {
    pub boundary: HabitBoundary,
}

/// One row of the device table: a category and the substrings that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRule {
    pub category: DeviceCategory,
    pub patterns: Vec<String>,
}

/// Device categorization table.
///
/// Rules are tried in order. An empty list selects the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    pub categories: Vec<DeviceRule>,
}

impl DevicesConfig {
    /// Checks that every rule carries at least one non-blank pattern and that
    /// the fallback category is not claimed by a rule.
    pub fn validate_rules(&self) -> Result<(), ValidationError> {
        for rule in &self.categories {
            if rule.category == DeviceCategory::Other {
                let mut err = ValidationError::new("fallback_category_in_table");
                err.message = Some("'Other' is the fallback and cannot have patterns".into());
                return Err(err);
            }
            if rule.patterns.is_empty() || rule.patterns.iter().any(|p| p.trim().is_empty()) {
                let mut err = ValidationError::new("empty_device_patterns");
                err.message = Some(format!("Category {} needs non-empty patterns", rule.category).into());
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Output image format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// Which charts are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSelection {
    pub devices: bool,
    pub countries: bool,
    pub hourly: bool,
    pub weekday: bool,
    pub titles: bool,
}

impl Default for ChartSelection {
    fn default() -> Self {
        Self {
            devices: true,
            countries: true,
            hourly: true,
            weekday: true,
            titles: true,
        }
    }
}

/// Chart rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartsConfig {
    /// Whether charts are rendered at all
    pub enabled: bool,

    /// Directory receiving charts and `report.json`
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Output directory is not a valid path"))]
    pub output_dir: String,

    pub format: ChartFormat,

    /// Chart width in pixels
    #[validate(range(min = 200, max = 4000, message = "Width must be between 200 and 4000 pixels"))]
    pub width: u32,

    /// Chart height in pixels
    #[validate(range(min = 200, max = 4000, message = "Height must be between 200 and 4000 pixels"))]
    pub height: u32,

    pub font_family: String,

    /// Font size for labels; captions are drawn slightly larger
    #[validate(range(min = 8, max = 72, message = "Font size must be between 8 and 72"))]
    pub font_size: u32,

    /// Background color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Background color must be valid hex color"))]
    pub background_color: String,

    /// Color for axes and labels (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Text color must be valid hex color"))]
    pub text_color: String,

    /// Color of single-series bars and lines (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Accent color must be valid hex color"))]
    pub accent_color: String,

    /// Slice colors for the device pie chart
    pub palette: Vec<String>,

    pub selection: ChartSelection,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: "viewstats-output".to_string(),
            format: ChartFormat::Png,
            width: 1000,
            height: 600,
            font_family: "sans-serif".to_string(),
            font_size: 14,
            background_color: "#FFFFFF".to_string(),
            text_color: "#221F1F".to_string(),
            accent_color: "#E50914".to_string(),
            palette: vec![
                "#E50914".to_string(),
                "#A6000F".to_string(),
                "#80000B".to_string(),
                "#500008".to_string(),
                "#2B0005".to_string(),
            ],
            selection: ChartSelection::default(),
        }
    }
}

/// Clock configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Minutes added to export timestamps before bucketing by hour and weekday
    pub utc_offset_minutes: i32,
}

impl TimeConfig {
    pub const MIN_OFFSET_MINUTES: i32 = -720;
    pub const MAX_OFFSET_MINUTES: i32 = 840;

    /// Offsets run from UTC-12:00 to UTC+14:00.
    pub fn validate_offset(&self) -> Result<(), ValidationError> {
        if (Self::MIN_OFFSET_MINUTES..=Self::MAX_OFFSET_MINUTES).contains(&self.utc_offset_minutes) {
            Ok(())
        } else {
            let mut err = ValidationError::new("utc_offset_out_of_range");
            err.message = Some("UTC offset must be between -720 and 840 minutes".into());
            Err(err)
        }
    }

    /// The configured offset; UTC if it is out of range.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}
