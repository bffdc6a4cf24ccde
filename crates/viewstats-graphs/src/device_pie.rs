//! Device share pie chart

use std::path::Path;

use async_trait::async_trait;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use viewstats_common::{DeviceCategory, Result};

use crate::aggregator::Bucket;
use crate::renderer::{label_style, render_chart, title_style, ChartDrawing, GraphRenderer};
use crate::types::GraphConfig;

/// Pie of watch time per device category
#[derive(Debug, Clone, Default)]
pub struct DevicePieChart {
    /// Hours per category, largest first
    pub data: Vec<Bucket<DeviceCategory>>,
}

impl DevicePieChart {
    pub fn new(data: Vec<Bucket<DeviceCategory>>) -> Self {
        Self { data }
    }

    /// Categories with watch time, as drawn
    fn slices(&self) -> Vec<&Bucket<DeviceCategory>> {
        self.data.iter().filter(|bucket| bucket.hours > 0.0).collect()
    }
}

#[async_trait]
impl GraphRenderer for DevicePieChart {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn is_empty(&self) -> bool {
        self.slices().is_empty()
    }

    async fn render_to_file(&self, config: &GraphConfig, path: &Path) -> Result<()> {
        render_chart(self, config, path)
    }
}

impl ChartDrawing for DevicePieChart {
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
        let area = root.titled(&config.title, title_style(style))?;

        let slices = self.slices();
        let palette = style.colors();
        let sizes: Vec<f64> = slices.iter().map(|bucket| bucket.hours).collect();
        let colors: Vec<RGBColor> = (0..slices.len())
            .map(|i| palette[i % palette.len()])
            .collect();
        let labels: Vec<String> = slices.iter().map(|bucket| bucket.key.to_string()).collect();

        let (width, height) = area.dim_in_pixel();
        let center = ((width / 2) as i32, (height / 2) as i32);
        let radius = f64::from(width.min(height)) * 0.35;

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(label_style(style));
        let background = style.background();
        pie.percentages(label_style(style).color(&background));
        area.draw(&pie)?;

        Ok(())
    }
}
