//! Chart generation for a finished report

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use viewstats_common::Result;
use viewstats_config::ChartsConfig;

use crate::day_of_week::DayOfWeekChart;
use crate::device_pie::DevicePieChart;
use crate::hourly_distribution::HourlyDistributionChart;
use crate::renderer::GraphRenderer;
use crate::report::ViewingReport;
use crate::top_items::TopItemsChart;
use crate::types::GraphConfig;

/// A renderer paired with the configuration it is drawn with
pub struct PlannedChart {
    pub renderer: Box<dyn GraphRenderer>,
    pub config: GraphConfig,
}

/// Builds and renders every selected chart of a report
#[derive(Debug, Clone, Default)]
pub struct GraphManager {
    config: ChartsConfig,
}

impl GraphManager {
    pub fn new(config: ChartsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChartsConfig {
        &self.config
    }

    /// Path a chart named `name` is written to inside `output_dir`
    pub fn output_path(&self, output_dir: &Path, name: &str) -> PathBuf {
        output_dir.join(format!("{name}.{}", self.config.format.extension()))
    }

    /// Charts enabled by the selection, in output order
    pub fn planned_charts(&self, report: &ViewingReport) -> Vec<PlannedChart> {
        let selection = &self.config.selection;
        let profile = &report.summary.profile;
        let graph_config = |title: &str, x_label: &str, y_label: &str| {
            GraphConfig::from_charts_config(format!("{title} - {profile}"), &self.config)
                .with_labels(x_label, y_label)
        };

        let mut charts = Vec::new();
        if selection.devices {
            charts.push(PlannedChart {
                renderer: Box::new(DevicePieChart::new(report.top_devices.clone())),
                config: graph_config("Watch Time by Device", "Device Type", "Total Hours Watched"),
            });
        }
        if selection.countries {
            charts.push(PlannedChart {
                renderer: Box::new(TopItemsChart::countries(&report.top_countries)),
                config: graph_config("Top Countries", "Total Hours Watched", "Country"),
            });
        }
        if selection.hourly {
            charts.push(PlannedChart {
                renderer: Box::new(HourlyDistributionChart::new(
                    report.hourly_filled(),
                    !report.hourly.is_empty(),
                )),
                config: graph_config("Watch Time by Hour", "Hour of Day", "Total Hours Watched"),
            });
        }
        if selection.weekday {
            charts.push(PlannedChart {
                renderer: Box::new(DayOfWeekChart::new(report.weekday.clone())),
                config: graph_config("Watch Time by Day", "Day of Week", "Total Hours Watched"),
            });
        }
        if selection.titles {
            charts.push(PlannedChart {
                renderer: Box::new(TopItemsChart::titles(&report.top_titles)),
                config: graph_config("Top Titles", "Total Hours Watched", "Title"),
            });
        }
        charts
    }

    /// Render every selected chart into `output_dir`.
    ///
    /// Charts without data are skipped and a failing chart is logged without
    /// stopping the others. Returns the files written.
    #[instrument(skip(self, report), fields(profile = %report.summary.profile))]
    pub async fn generate_all(
        &self,
        report: &ViewingReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        if !self.config.enabled {
            debug!("Chart generation disabled");
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(output_dir).await?;

        let mut written = Vec::new();
        for chart in self.planned_charts(report) {
            let name = chart.renderer.name();
            if chart.renderer.is_empty() {
                debug!(chart = name, "Skipping chart without data");
                continue;
            }

            let path = self.output_path(output_dir, name);
            match chart.renderer.render_to_file(&chart.config, &path).await {
                Ok(()) => written.push(path),
                Err(e) => warn!(chart = name, error = %e, "Failed to render chart"),
            }
        }

        info!(charts = written.len(), dir = %output_dir.display(), "Generated charts");
        Ok(written)
    }
}
