//! Ranked horizontal bar chart for countries and titles

use std::path::Path;

use async_trait::async_trait;
use plotters::coord::Shift;
use plotters::prelude::*;
use viewstats_common::{format_hours, truncate_string, Result};

use crate::aggregator::Bucket;
use crate::renderer::{axis_max, label_style, render_chart, title_style, ChartDrawing, GraphRenderer};
use crate::types::GraphConfig;

const LABEL_WIDTH: usize = 28;

/// One ranked bar
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem {
    pub label: String,
    pub hours: f64,
}

/// Horizontal bars, first item at the top
#[derive(Debug, Clone)]
pub struct TopItemsChart {
    name: &'static str,
    pub data: Vec<RankedItem>,
}

impl TopItemsChart {
    pub fn countries(buckets: &[Bucket<String>]) -> Self {
        Self::from_buckets("countries", buckets, |country| {
            if country.is_empty() {
                "(unknown)".to_string()
            } else {
                country.clone()
            }
        })
    }

    pub fn titles(buckets: &[Bucket<String>]) -> Self {
        Self::from_buckets("titles", buckets, String::clone)
    }

    fn from_buckets<K>(
        name: &'static str,
        buckets: &[Bucket<K>],
        label: impl Fn(&K) -> String,
    ) -> Self {
        let data = buckets
            .iter()
            .map(|bucket| RankedItem {
                label: truncate_string(&label(&bucket.key), LABEL_WIDTH),
                hours: bucket.hours,
            })
            .collect();
        Self { name, data }
    }

    /// Label for a bar slot; slot 0 is the bottom of the chart
    fn slot_label(&self, slot: usize) -> String {
        self.data
            .len()
            .checked_sub(slot + 1)
            .and_then(|index| self.data.get(index))
            .map(|item| item.label.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GraphRenderer for TopItemsChart {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    async fn render_to_file(&self, config: &GraphConfig, path: &Path) -> Result<()> {
        render_chart(self, config, path)
    }
}

impl ChartDrawing for TopItemsChart {
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

        let count = self.data.len();
        let x_max = axis_max(self.data.iter().map(|item| item.hours));

        let mut chart = ChartBuilder::on(root)
            .caption(&config.title, title_style(style))
            .margin(style.margins.top)
            .x_label_area_size(style.margins.bottom)
            .y_label_area_size(style.margins.left * 3)
            .build_cartesian_2d(0.0..x_max, (0usize..count).into_segmented())?;

        let formatter = |value: &SegmentValue<usize>| match value {
            SegmentValue::Exact(slot) | SegmentValue::CenterOf(slot) => self.slot_label(*slot),
            SegmentValue::Last => String::new(),
        };
        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc(config.x_label.as_deref().unwrap_or("Total Hours Watched"))
            .y_desc(config.y_label.as_deref().unwrap_or(""))
            .y_labels(count)
            .y_label_formatter(&formatter)
            .axis_style(style.text().stroke_width(1))
            .label_style(label_style(style))
            .draw()?;

        chart.draw_series(
            Histogram::horizontal(&chart)
                .style(style.accent().filled())
                .margin(4)
                .data(
                    self.data
                        .iter()
                        .enumerate()
                        .map(|(rank, item)| (count - 1 - rank, item.hours)),
                ),
        )?;

        chart.draw_series(self.data.iter().enumerate().map(|(rank, item)| {
            Text::new(
                format_hours(item.hours),
                (item.hours, SegmentValue::CenterOf(count - 1 - rank)),
                label_style(style),
            )
        }))?;

        Ok(())
    }
}
