//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateTables, Chart, LabelTotal, TrendPoint};
use crate::dataset::FilterSpec;

// ============================================
// FILTER DTOs
// ============================================

/// Raw query-string pairs, in order, with repeated keys preserved
pub type QueryPairs = Vec<(String, String)>;

/// Query-string filter.
///
/// Keys may repeat and values may be comma separated, so
/// `?device=Desktop&device=Mobile` and `?device=Desktop,Mobile` are the same.
#[derive(Debug, Default)]
pub struct FilterParams {
    pub device: Vec<String>,
    pub location: Vec<String>,
}

impl FilterParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "device" => params.device.push(value.clone()),
                "location" => params.location.push(value.clone()),
                _ => {}
            }
        }
        params
    }

    pub fn to_filter(&self) -> FilterSpec {
        FilterSpec::from_csv_lists(
            Some(&self.device.join(",")),
            Some(&self.location.join(",")),
        )
    }
}

/// Dropdown options for the dashboard
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterOptionsResponse {
    /// Dashboard title
    pub title: String,
    /// Distinct device labels
    pub devices: Vec<String>,
    /// Distinct location labels
    pub locations: Vec<String>,
}

// ============================================
// AGGREGATE DTOs
// ============================================

/// Aggregate tables plus request metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub trend: Vec<TrendPointDto>,
    pub top_pages: Vec<LabelTotalDto>,
    pub device_share: Vec<LabelTotalDto>,
    pub meta: AggregateMeta,
}

/// Visits for one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPointDto {
    pub date: String,
    pub visits: u64,
}

impl From<&TrendPoint> for TrendPointDto {
    fn from(p: &TrendPoint) -> Self {
        Self {
            date: p.date.format("%Y-%m-%d").to_string(),
            visits: p.visits,
        }
    }
}

/// Visits for one page or device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelTotalDto {
    pub label: String,
    pub visits: u64,
}

impl From<&LabelTotal> for LabelTotalDto {
    fn from(t: &LabelTotal) -> Self {
        Self {
            label: t.label.clone(),
            visits: t.visits,
        }
    }
}

/// Aggregation metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct AggregateMeta {
    /// The filter that was applied
    pub filter: FilterSpec,
    /// Records that passed the filter
    pub matched_records: usize,
    /// Records in the whole dataset
    pub total_records: usize,
    /// Sum of visits across the selection
    pub total_visits: u64,
    /// Aggregation time in microseconds
    pub execution_time_us: u64,
}

impl AggregateResponse {
    pub fn new(tables: &AggregateTables, meta: AggregateMeta) -> Self {
        Self {
            trend: tables.trend.iter().map(Into::into).collect(),
            top_pages: tables.top_pages.iter().map(Into::into).collect(),
            device_share: tables.device_share.iter().map(Into::into).collect(),
            meta,
        }
    }
}

// ============================================
// CHART DTOs
// ============================================

/// Chart payloads for the three dashboard widgets
#[derive(Debug, Serialize)]
pub struct ChartsResponse {
    pub title: String,
    pub charts: Vec<Chart>,
}

// ============================================
// EXPORT DTOs
// ============================================

/// Export query parameters
#[derive(Debug)]
pub struct ExportParams {
    /// Output format: csv, json, ndjson (default: csv)
    pub format: String,
    pub filter: FilterParams,
}

impl ExportParams {
    /// The last `format` value wins
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let format = pairs
            .iter()
            .rev()
            .find(|(key, _)| key == "format")
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| "csv".to_string());

        Self {
            format,
            filter: FilterParams::from_pairs(pairs),
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Data source name
    pub source: String,
    /// Number of records loaded
    pub records: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Crate version
    pub version: String,
}
