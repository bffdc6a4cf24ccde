//! Graph rendering traits and the shared file backend

use std::path::Path;

use async_trait::async_trait;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;
use viewstats_common::{Result, ViewStatsError};
use viewstats_config::ChartFormat;

use crate::types::{GraphConfig, StyleConfig};

/// A chart that can be written to disk
#[async_trait]
pub trait GraphRenderer: Send + Sync {
    /// Short name, also used as the output file stem
    fn name(&self) -> &'static str;

    /// True when there is nothing worth plotting
    fn is_empty(&self) -> bool;

    /// Render the chart to `path` in `config.format`
    async fn render_to_file(&self, config: &GraphConfig, path: &Path) -> Result<()>;
}

/// Backend-independent drawing of a chart onto a prepared area
pub trait ChartDrawing: GraphRenderer {
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        config: &GraphConfig,
    ) -> Result<()>
    where
        DB::ErrorType: 'static;
}

/// Draw `chart` into a PNG or SVG file at `path`.
///
/// Fails without touching the file system when the chart has no data.
pub fn render_chart<C: ChartDrawing>(chart: &C, config: &GraphConfig, path: &Path) -> Result<()> {
    if chart.is_empty() {
        return Err(ViewStatsError::graph(format!(
            "No data available for the {} chart",
            chart.name()
        )));
    }

    let size = (config.width, config.height);
    match config.format {
        ChartFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            chart.draw(&root, config)?;
            root.present()?;
        }
        ChartFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            chart.draw(&root, config)?;
            root.present()?;
        }
    }

    debug!(chart = chart.name(), path = %path.display(), "Rendered chart");
    Ok(())
}

/// Upper bound for a value axis, with headroom for labels
pub fn axis_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}

/// Caption style from the title font
pub fn title_style(style: &StyleConfig) -> TextStyle<'_> {
    (
        style.title_font.family.as_str(),
        f64::from(style.title_font.size),
    )
        .into_font()
        .color(&style.text())
}

/// Axis and label style from the label font
pub fn label_style(style: &StyleConfig) -> TextStyle<'_> {
    (
        style.label_font.family.as_str(),
        f64::from(style.label_font.size),
    )
        .into_font()
        .color(&style.text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_max() {
        assert_eq!(axis_max(std::iter::empty()), 1.0);
        assert_eq!(axis_max([0.0, 0.0]), 1.0);
        assert!((axis_max([1.0, 2.0]) - 2.3).abs() < 1e-9);
    }
}
