//! Traffic Dataset
//!
//! - **types**: `Record`, `Dataset`, `FilterSpec`
//! - **source**: pluggable loaders (synthetic generator, CSV file)
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use traffic_trends::dataset::{DataSource, FilterSpec, SyntheticSource};
//!
//! let dataset = SyntheticSource::default().load().unwrap();
//! let mobile = FilterSpec::all().device("Mobile");
//! assert!(dataset.select(&mobile).all(|r| r.device == "Mobile"));
//! ```

pub mod error;
pub mod source;
pub mod types;

pub use error::{DatasetError, DatasetResult};
pub use source::{write_csv, CsvSource, DataSource, SyntheticSource};
pub use types::{Dataset, FilterSpec, Record};
