//! Day of week bar chart

use std::path::Path;

use async_trait::async_trait;
use chrono::Weekday;
use plotters::coord::Shift;
use plotters::prelude::*;
use viewstats_common::Result;

use crate::aggregator::{weekday_name, weekday_rank, Bucket};
use crate::renderer::{axis_max, label_style, render_chart, title_style, ChartDrawing, GraphRenderer};
use crate::types::GraphConfig;

const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Vertical bars of watch time per weekday, Sunday first
#[derive(Debug, Clone, Default)]
pub struct DayOfWeekChart {
    pub data: Vec<Bucket<Weekday>>,
}

impl DayOfWeekChart {
    pub fn new(data: Vec<Bucket<Weekday>>) -> Self {
        Self { data }
    }

    /// Hours for all seven days, zero where nothing was watched
    pub fn filled(&self) -> [f64; 7] {
        let mut hours = [0.0; 7];
        for bucket in &self.data {
            hours[weekday_rank(&bucket.key) as usize] = bucket.hours;
        }
        hours
    }
}

#[async_trait]
impl GraphRenderer for DayOfWeekChart {
    fn name(&self) -> &'static str {
        "weekday"
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    async fn render_to_file(&self, config: &GraphConfig, path: &Path) -> Result<()> {
        render_chart(self, config, path)
    }
}

impl ChartDrawing for DayOfWeekChart {
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

        let hours = self.filled();
        let y_max = axis_max(hours);

        let mut chart = ChartBuilder::on(root)
            .caption(&config.title, title_style(style))
            .margin(style.margins.top)
            .x_label_area_size(style.margins.bottom)
            .y_label_area_size(style.margins.left)
            .build_cartesian_2d((0usize..WEEK.len()).into_segmented(), 0.0..y_max)?;

        let formatter = |value: &SegmentValue<usize>| match value {
            SegmentValue::Exact(day) | SegmentValue::CenterOf(day) => WEEK
                .get(*day)
                .map(|day| weekday_name(*day).to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(config.x_label.as_deref().unwrap_or("Day of Week"))
            .y_desc(config.y_label.as_deref().unwrap_or("Total Hours Watched"))
            .x_labels(WEEK.len())
            .x_label_formatter(&formatter)
            .axis_style(style.text().stroke_width(1))
            .label_style(label_style(style))
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(style.accent().filled())
                .margin(10)
                .data(hours.iter().enumerate().map(|(day, hours)| (day, *hours))),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_filled_is_sunday_first() {
        let chart = DayOfWeekChart::new(vec![
            Bucket {
                key: Weekday::Sun,
                hours: 1.5,
                views: 2,
            },
            Bucket {
                key: Weekday::Sat,
                hours: 0.25,
                views: 1,
            },
        ]);
        let filled = chart.filled();

        assert_eq!(filled[0], 1.5);
        assert_eq!(filled[6], 0.25);
        assert_eq!(filled[1..6], [0.0; 5]);
    }

    #[tokio::test]
    async fn test_render_empty_data_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("weekday.svg");

        let result = DayOfWeekChart::default()
            .render_to_file(&GraphConfig::default(), &path)
            .await;
        assert!(result.is_err());
    }
}
