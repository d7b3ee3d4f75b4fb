//! Chart payloads
//!
//! Library-neutral descriptions of the three dashboard charts. A client
//! renders them with whatever plotting toolkit it likes.

use serde::Serialize;

use super::AggregateTables;

/// How a chart should be drawn
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Donut,
}

/// One chart: a labelled series plus presentation hints
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Chart {
    /// Stable identifier for the client widget
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    /// Draw point markers (line charts)
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub markers: bool,
    /// Print the value above each bar
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub value_labels: bool,
    /// Inner radius ratio for donut charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<f64>,
}

impl Chart {
    fn new(id: &str, kind: ChartKind, title: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            x_title: None,
            y_title: None,
            labels: Vec::new(),
            values: Vec::new(),
            markers: false,
            value_labels: false,
            hole: None,
        }
    }

    fn axes(mut self, x: &str, y: &str) -> Self {
        self.x_title = Some(x.to_string());
        self.y_title = Some(y.to_string());
        self
    }

    fn series(mut self, points: impl IntoIterator<Item = (String, u64)>) -> Self {
        let (labels, values) = points.into_iter().unzip();
        self.labels = labels;
        self.values = values;
        self
    }

    /// Number of data points
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build the trend line, top-pages bar and device donut charts
pub fn build_charts(tables: &AggregateTables) -> Vec<Chart> {
    let mut trend = Chart::new("traffic_trend", ChartKind::Line, "Daily Website Visits")
        .axes("Date", "Visits")
        .series(
            tables
                .trend
                .iter()
                .map(|p| (p.date.format("%Y-%m-%d").to_string(), p.visits)),
        );
    trend.markers = true;

    let mut pages = Chart::new("top_pages", ChartKind::Bar, "Top Pages by Visits")
        .axes("Page", "Visits")
        .series(tables.top_pages.iter().map(|p| (p.label.clone(), p.visits)));
    pages.value_labels = true;

    let mut devices = Chart::new("device_pie", ChartKind::Donut, "Traffic by Device")
        .series(tables.device_share.iter().map(|p| (p.label.clone(), p.visits)));
    devices.hole = Some(0.3);

    vec![trend, pages, devices]
}
