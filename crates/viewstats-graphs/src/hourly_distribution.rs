//! Hour of day line chart

use std::path::Path;

use async_trait::async_trait;
use plotters::coord::Shift;
use plotters::prelude::*;
use viewstats_common::{format_hour, Result};

use crate::renderer::{axis_max, label_style, render_chart, title_style, ChartDrawing, GraphRenderer};
use crate::types::GraphConfig;

/// Watch time for each hour of the day
#[derive(Debug, Clone, Default)]
pub struct HourlyDistributionChart {
    /// Hours watched, indexed by local hour
    pub hours: [f64; 24],
    /// Whether any event had a usable start time
    pub has_data: bool,
}

impl HourlyDistributionChart {
    pub fn new(hours: [f64; 24], has_data: bool) -> Self {
        Self { hours, has_data }
    }
}

#[async_trait]
impl GraphRenderer for HourlyDistributionChart {
    fn name(&self) -> &'static str {
        "hourly"
    }

    fn is_empty(&self) -> bool {
        !self.has_data
    }

    async fn render_to_file(&self, config: &GraphConfig, path: &Path) -> Result<()> {
        render_chart(self, config, path)
    }
}

impl ChartDrawing for HourlyDistributionChart {
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        config: &GraphConfig,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let style = &config.style;
        root.fill(&style.background())?;

        let accent = style.accent();
        let y_max = axis_max(self.hours);
        let points: Vec<(u32, f64)> = (0u32..)
            .zip(self.hours.iter().copied())
            .collect();

        let mut chart = ChartBuilder::on(root)
            .caption(&config.title, title_style(style))
            .margin(style.margins.top)
            .x_label_area_size(style.margins.bottom)
            .y_label_area_size(style.margins.left)
            .build_cartesian_2d(0u32..23u32, 0.0..y_max)?;

        chart
            .configure_mesh()
            .x_desc(config.x_label.as_deref().unwrap_or("Hour of Day"))
            .y_desc(config.y_label.as_deref().unwrap_or("Total Hours Watched"))
            .x_labels(12)
            .x_label_formatter(&|hour: &u32| format_hour(*hour))
            .axis_style(style.text().stroke_width(1))
            .label_style(label_style(style))
            .draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), accent.stroke_width(2)))?;
        chart.draw_series(
            points
                .iter()
                .map(|point| Circle::new(*point, 3, accent.filled())),
        )?;

        Ok(())
    }
}
