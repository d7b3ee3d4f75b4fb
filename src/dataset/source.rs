//! Data Sources
//!
//! Pluggable loaders that produce a [`Dataset`]. The synthetic generator is
//! the default fixture; `CsvSource` reads real exports.

use chrono::{Duration, NaiveDate};
use std::path::{Path, PathBuf};

use super::error::{DatasetError, DatasetResult};
use super::types::{Dataset, Record};

/// Anything that can produce a dataset
pub trait DataSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Load the full dataset
    fn load(&self) -> DatasetResult<Dataset>;
}

/// Generates sinusoidal traffic for a fixed window of days.
///
/// Row `i` falls on `start + (i % days)` and cycles through the label lists,
/// with `visits = |trunc(base + amplitude * sin(i))|`.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub start: NaiveDate,
    pub days: u32,
    pub repetitions: u32,
    pub pages: Vec<String>,
    pub devices: Vec<String>,
    pub locations: Vec<String>,
    pub base: f64,
    pub amplitude: f64,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or_default(),
            days: 30,
            repetitions: 3,
            pages: labels(&["Home", "Products", "Contact"]),
            devices: labels(&["Desktop", "Mobile", "Tablet"]),
            locations: labels(&["India", "USA", "UK"]),
            base: 100.0,
            amplitude: 50.0,
        }
    }
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl SyntheticSource {
    /// Builder method: set the first date
    pub fn start(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    /// Builder method: set the window length and how often it repeats
    pub fn window(mut self, days: u32, repetitions: u32) -> Self {
        self.days = days;
        self.repetitions = repetitions;
        self
    }

    fn visits_at(&self, i: usize) -> u64 {
        (self.base + self.amplitude * (i as f64).sin()).trunc().abs() as u64
    }
}

impl DataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(&self) -> DatasetResult<Dataset> {
        if self.days == 0 || self.repetitions == 0 {
            return Err(DatasetError::InvalidDataset(
                "synthetic window must cover at least one day".to_string(),
            ));
        }
        if self.pages.is_empty() || self.devices.is_empty() || self.locations.is_empty() {
            return Err(DatasetError::InvalidDataset(
                "synthetic label lists cannot be empty".to_string(),
            ));
        }

        let rows = self.days as usize * self.repetitions as usize;
        let records = (0..rows)
            .map(|i| {
                let offset = (i % self.days as usize) as i64;
                let date = self
                    .start
                    .checked_add_signed(Duration::days(offset))
                    .ok_or_else(|| {
                        DatasetError::InvalidDataset(
                            "synthetic window runs past the last representable date".to_string(),
                        )
                    })?;
                Ok(Record::new(
                    date,
                    self.pages[i % self.pages.len()].clone(),
                    self.visits_at(i),
                    self.devices[i % self.devices.len()].clone(),
                    self.locations[i % self.locations.len()].clone(),
                ))
            })
            .collect::<DatasetResult<Vec<_>>>()?;

        Dataset::new(records)
    }
}

/// Reads `date,page,visits,device,location` rows from a headed CSV file
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Decode records from any reader
    pub fn read_from<R: std::io::Read>(reader: R) -> DatasetResult<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = reader
            .deserialize::<Record>()
            .collect::<Result<Vec<_>, _>>()?;

        Dataset::new(records)
    }
}

impl DataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self) -> DatasetResult<Dataset> {
        let file = std::fs::File::open(&self.path)?;
        let dataset = Self::read_from(file)?;
        tracing::debug!(path = ?self.path, rows = dataset.len(), "Loaded CSV dataset");
        Ok(dataset)
    }
}

/// Write records as CSV with the same header `CsvSource` expects
pub fn write_csv<'a, W: std::io::Write>(
    writer: W,
    records: impl IntoIterator<Item = &'a Record>,
) -> DatasetResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
