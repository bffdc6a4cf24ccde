//! Graph types and styling configuration

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use viewstats_config::{ChartFormat, ChartsConfig};

/// Configuration for one rendered chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub format: ChartFormat,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub style: StyleConfig,
}

impl GraphConfig {
    /// Chart titled `title` using the sizes and colours of `charts`
    pub fn from_charts_config(title: impl Into<String>, charts: &ChartsConfig) -> Self {
        Self {
            title: title.into(),
            width: charts.width,
            height: charts.height,
            format: charts.format,
            x_label: None,
            y_label: None,
            style: StyleConfig::from(charts),
        }
    }

    pub fn with_labels(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = Some(x_label.to_string());
        self.y_label = Some(y_label.to_string());
        self
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from_charts_config("Graph", &ChartsConfig::default())
    }
}

/// Font configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    pub family: String,
    pub size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 14,
        }
    }
}

/// Margin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginConfig {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            top: 20,
            right: 20,
            bottom: 50,
            left: 70,
        }
    }
}

/// Comprehensive styling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// `#RRGGBB` colours for multi-series elements such as pie slices
    pub palette: Vec<String>,
    pub background_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub title_font: FontConfig,
    pub label_font: FontConfig,
    pub margins: MarginConfig,
}

impl StyleConfig {
    pub fn background(&self) -> RGBColor {
        parse_color_or(&self.background_color, RGBColor(255, 255, 255))
    }

    pub fn text(&self) -> RGBColor {
        parse_color_or(&self.text_color, RGBColor(0, 0, 0))
    }

    pub fn accent(&self) -> RGBColor {
        parse_color_or(&self.accent_color, RGBColor(229, 9, 20))
    }

    /// Parsable palette colours in order; never empty
    pub fn colors(&self) -> Vec<RGBColor> {
        let colors: Vec<RGBColor> = self.palette.iter().filter_map(|c| parse_color(c)).collect();

        if colors.is_empty() {
            vec![self.accent()]
        } else {
            colors
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::from(&ChartsConfig::default())
    }
}

impl From<&ChartsConfig> for StyleConfig {
    fn from(charts: &ChartsConfig) -> Self {
        let label_font = FontConfig {
            family: charts.font_family.clone(),
            size: charts.font_size,
        };
        Self {
            palette: charts.palette.clone(),
            background_color: charts.background_color.clone(),
            text_color: charts.text_color.clone(),
            accent_color: charts.accent_color.clone(),
            title_font: FontConfig {
                size: charts.font_size + 6,
                ..label_font.clone()
            },
            label_font,
            margins: MarginConfig::default(),
        }
    }
}

/// Parse a `#RRGGBB` color
pub fn parse_color(color: &str) -> Option<RGBColor> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn parse_color_or(color: &str, fallback: RGBColor) -> RGBColor {
    parse_color(color).unwrap_or(fallback)
}
