//! # sweeper-viz
//!
//! Visualization for sweeper.
//!
//! Picks the numeric series worth charting out of a table and turns them
//! into chart specifications that can be rendered as:
//! - JSON for a frontend
//! - standalone HTML/Chart.js output

use serde::{Deserialize, Serialize};
use sweeper_table::Table;

/// Most numeric columns shown in one chart.
pub const MAX_SERIES: usize = 2;

/// One numeric column, row-indexed; missing cells stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Up to two numeric columns sharing a row index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesPair {
    pub index: Vec<usize>,
    pub series: Vec<NumericSeries>,
}

impl SeriesPair {
    /// Select the first two numeric columns of a table, in column order.
    ///
    /// The table itself is not modified. A table without numeric columns
    /// yields an empty pair.
    #[must_use]
    pub fn from_table(table: &Table) -> Self {
        let series: Vec<NumericSeries> = table
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, field)| field.dtype.is_numeric())
            .take(MAX_SERIES)
            .map(|(idx, field)| NumericSeries {
                name: field.name.clone(),
                values: table.rows().iter().map(|row| row[idx].as_float()).collect(),
            })
            .collect();

        let index = if series.is_empty() {
            Vec::new()
        } else {
            (0..table.row_count()).collect()
        };

        SeriesPair { index, series }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Chart specification for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartKind,
    pub title: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Chart type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
}

/// Chart data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A dataset in a chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// Chart rendering options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    pub show_legend: bool,
}

const PALETTE: [&str; MAX_SERIES] = ["rgba(54, 162, 235, 0.6)", "rgba(255, 99, 132, 0.6)"];

/// Escape HTML special characters to prevent XSS.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

impl ChartSpec {
    /// Create a new chart specification.
    #[must_use]
    pub fn new(chart_type: ChartKind, title: impl Into<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            data: ChartData {
                labels: Vec::new(),
                datasets: Vec::new(),
            },
            options: ChartOptions::default(),
        }
    }

    /// Bar chart of a series pair, one dataset per series.
    #[must_use]
    pub fn bar(title: impl Into<String>, pair: &SeriesPair) -> Self {
        let mut chart = Self::new(ChartKind::Bar, title);
        chart.data.labels = pair.index.iter().map(ToString::to_string).collect();
        chart.data.datasets = pair
            .series
            .iter()
            .zip(PALETTE)
            .map(|(series, color)| Dataset {
                label: series.name.clone(),
                data: series.values.clone(),
                background_color: Some(color.to_string()),
            })
            .collect();
        chart.options.x_axis_label = Some("row".to_string());
        chart.options.show_legend = true;
        chart
    }

    /// Convert to JSON string for frontend rendering.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Generate HTML with embedded Chart.js.
    #[must_use]
    pub fn to_html(&self) -> String {
        // Escape title for HTML context and JSON for script context
        let title = escape_html(&self.title);
        let json = serde_json::to_string(&self)
            .unwrap_or_default()
            .replace("</", "<\\/"); // Prevent script tag breakout

        let chart_type = match self.chart_type {
            ChartKind::Bar => "bar",
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <canvas id="chart"></canvas>
    <script>
        const spec = {json};
        const datasets = spec.data.datasets.map(d => ({{
            label: d.label,
            data: d.data,
            backgroundColor: d.background_color
        }}));
        const ctx = document.getElementById('chart').getContext('2d');
        new Chart(ctx, {{
            type: '{chart_type}',
            data: {{ labels: spec.data.labels, datasets: datasets }},
            options: {{
                responsive: true,
                scales: {{
                    x: {{
                        title: {{
                            display: Boolean(spec.options.x_axis_label),
                            text: spec.options.x_axis_label
                        }}
                    }}
                }},
                plugins: {{
                    title: {{
                        display: true,
                        text: spec.title
                    }},
                    legend: {{
                        display: spec.options.show_legend
                    }}
                }}
            }}
        }});
    </script>
</body>
</html>"#
        )
    }
}
