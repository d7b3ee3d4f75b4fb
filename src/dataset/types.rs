//! Core data types for traffic analysis
//!
//! - `Record`: one observation of traffic on a date/page/device/location
//! - `Dataset`: the immutable, non-empty collection of records
//! - `FilterSpec`: the per-request device/location restriction

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::{DatasetError, DatasetResult};

/// A single row of the traffic dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Calendar day of the observation
    pub date: NaiveDate,
    /// Page label ("Home", "Products", ...)
    pub page: String,
    /// Number of visits
    pub visits: u64,
    /// Device label ("Desktop", "Mobile", ...)
    pub device: String,
    /// Visitor location ("India", "USA", ...)
    pub location: String,
}

impl Record {
    /// Create a new record
    pub fn new(
        date: NaiveDate,
        page: impl Into<String>,
        visits: u64,
        device: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            date,
            page: page.into(),
            visits,
            device: device.into(),
            location: location.into(),
        }
    }
}

/// Immutable ordered collection of records.
///
/// Always holds at least one record.
#[allow(clippy::len_without_is_empty)]
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset, rejecting an empty record list
    pub fn new(records: Vec<Record>) -> DatasetResult<Self> {
        if records.is_empty() {
            return Err(DatasetError::InvalidDataset(
                "dataset has no records".to_string(),
            ));
        }
        Ok(Self { records })
    }

    /// All records in their original order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate over the records matching a filter without copying them
    pub fn select<'a>(&'a self, filter: &'a FilterSpec) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }

    /// Distinct device labels in first-encounter order
    pub fn devices(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.device.as_str()))
    }

    /// Distinct location labels in first-encounter order
    pub fn locations(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.location.as_str()))
    }

    /// Sum of visits over every record
    pub fn total_visits(&self) -> u64 {
        self.records.iter().map(|r| r.visits).sum()
    }

    /// Earliest and latest date present
    pub fn date_span(&self) -> (NaiveDate, NaiveDate) {
        let first = self.records[0].date;
        self.records
            .iter()
            .fold((first, first), |(lo, hi), r| (lo.min(r.date), hi.max(r.date)))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Device/location restriction chosen by the user.
///
/// An empty list places no restriction on that dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterSpec {
    #[serde(default, alias = "device", deserialize_with = "nullable_list")]
    pub devices: Vec<String>,
    #[serde(default, alias = "location", deserialize_with = "nullable_list")]
    pub locations: Vec<String>,
}

/// Accept `null` as well as a list, mirroring a cleared multi-select
fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FilterSpec {
    /// No restriction on either dimension
    pub fn all() -> Self {
        Self::default()
    }

    /// Builder method: allow a device
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.devices.push(device.into());
        self
    }

    /// Builder method: allow a location
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.locations.push(location.into());
        self
    }

    /// Parse comma-separated query values, e.g. `device=Desktop,Mobile`
    pub fn from_csv_lists(devices: Option<&str>, locations: Option<&str>) -> Self {
        Self {
            devices: split_list(devices),
            locations: split_list(locations),
        }
    }

    /// True if neither dimension is restricted
    pub fn is_unrestricted(&self) -> bool {
        self.devices.is_empty() && self.locations.is_empty()
    }

    /// Check whether a record passes both restrictions
    pub fn matches(&self, record: &Record) -> bool {
        allows(&self.devices, &record.device) && allows(&self.locations, &record.location)
    }
}

fn allows(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, day).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            Record::new(date(2), "Home", 10, "Desktop", "USA"),
            Record::new(date(1), "Products", 5, "Mobile", "USA"),
            Record::new(date(3), "Home", 20, "Desktop", "UK"),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = Dataset::new(Vec::new()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidDataset(_)));
    }

    #[test]
    fn test_distinct_values_keep_encounter_order() {
        let ds = sample();
        assert_eq!(ds.devices(), vec!["Desktop", "Mobile"]);
        assert_eq!(ds.locations(), vec!["USA", "UK"]);
    }

    #[test]
    fn test_totals_and_span() {
        let ds = sample();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.total_visits(), 35);
        assert_eq!(ds.date_span(), (date(1), date(3)));
    }

    #[test]
    fn test_filter_matching() {
        let ds = sample();
        let filter = FilterSpec::all().device("Desktop").location("UK");
        let selected: Vec<_> = ds.select(&filter).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].visits, 20);

        assert_eq!(ds.select(&FilterSpec::all()).count(), 3);
        assert_eq!(ds.select(&FilterSpec::all().device("Watch")).count(), 0);
    }

    #[test]
    fn test_from_csv_lists() {
        let filter = FilterSpec::from_csv_lists(Some("Desktop, Mobile,,"), None);
        assert_eq!(filter.devices, vec!["Desktop", "Mobile"]);
        assert!(filter.locations.is_empty());

        assert!(FilterSpec::from_csv_lists(Some(""), Some(" ")).is_unrestricted());
    }

    #[test]
    fn test_filter_deserialize_null_and_aliases() {
        let filter: FilterSpec =
            serde_json::from_str(r#"{"device": ["Tablet"], "locations": null}"#).unwrap();
        assert_eq!(filter.devices, vec!["Tablet"]);
        assert!(filter.locations.is_empty());

        let filter: FilterSpec = serde_json::from_str("{}").unwrap();
        assert!(filter.is_unrestricted());
    }
}
