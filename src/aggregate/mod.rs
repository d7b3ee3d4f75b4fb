//! Traffic Aggregator
//!
//! Narrows a [`Dataset`] with a [`FilterSpec`] and folds the surviving
//! records into three tables:
//!
//! ```text
//! Dataset + FilterSpec → Select → ┬→ by date   (trend, date ascending)
//!                                 ├→ by page   (top pages, visits descending)
//!                                 └→ by device (device share)
//! ```
//!
//! Every table sums to the same grand total. An empty selection yields three
//! empty tables; unknown filter values simply match nothing.

pub mod chart;

pub use chart::{build_charts, Chart, ChartKind};

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::dataset::{Dataset, FilterSpec};

/// Visits summed over one day
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub visits: u64,
}

/// Visits summed over one category label (page or device)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabelTotal {
    pub label: String,
    pub visits: u64,
}

impl LabelTotal {
    pub fn new(label: impl Into<String>, visits: u64) -> Self {
        Self {
            label: label.into(),
            visits,
        }
    }
}

/// The three aggregate views for one filter
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AggregateTables {
    /// Daily totals, date ascending
    pub trend: Vec<TrendPoint>,
    /// Page totals, visits descending (ties in encounter order)
    pub top_pages: Vec<LabelTotal>,
    /// Device totals in encounter order
    pub device_share: Vec<LabelTotal>,
    /// Number of records that survived the filter
    #[serde(skip)]
    pub matched_records: usize,
}

impl AggregateTables {
    /// Sum of visits across the selection
    pub fn grand_total(&self) -> u64 {
        self.trend.iter().map(|p| p.visits).sum()
    }

    /// True if nothing matched the filter
    pub fn is_empty(&self) -> bool {
        self.matched_records == 0
    }
}

/// Filter the dataset and compute trend, top pages and device share
pub fn aggregate(dataset: &Dataset, filter: &FilterSpec) -> AggregateTables {
    let mut trend: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut pages = OrderedSums::default();
    let mut devices = OrderedSums::default();
    let mut matched_records = 0;

    for record in dataset.select(filter) {
        matched_records += 1;
        *trend.entry(record.date).or_insert(0) += record.visits;
        pages.add(&record.page, record.visits);
        devices.add(&record.device, record.visits);
    }

    let mut top_pages = pages.into_totals();
    // sort_by is stable, so equal totals keep first-encounter order
    top_pages.sort_by(|a, b| b.visits.cmp(&a.visits));

    AggregateTables {
        trend: trend
            .into_iter()
            .map(|(date, visits)| TrendPoint { date, visits })
            .collect(),
        top_pages,
        device_share: devices.into_totals(),
        matched_records,
    }
}

/// Per-label sums that remember first-encounter order
#[derive(Default)]
struct OrderedSums {
    index: HashMap<String, usize>,
    totals: Vec<LabelTotal>,
}

impl OrderedSums {
    fn add(&mut self, label: &str, visits: u64) {
        match self.index.get(label) {
            Some(&i) => self.totals[i].visits += visits,
            None => {
                self.index.insert(label.to_string(), self.totals.len());
                self.totals.push(LabelTotal::new(label, visits));
            }
        }
    }

    fn into_totals(self) -> Vec<LabelTotal> {
        self.totals
    }
}
