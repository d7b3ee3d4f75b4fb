//! Dataset error types
//!
//! Defines the errors that can occur while building or loading a dataset.

use thiserror::Error;

/// Errors that can occur while constructing a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset is unusable (no rows, bad generator parameters, etc.)
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// CSV reading or row decoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
