//! # Traffic Trends
//!
//! Website Traffic Trend Analyzer - filter simulated (or imported) website
//! traffic by device and location, and recompute the dashboard views:
//! daily visits, top pages and device share.
//!
//! ## Modules
//!
//! - [`dataset`]: Records, the immutable dataset, filters and data sources
//! - [`aggregate`]: The filter-and-aggregate core plus chart payloads
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use traffic_trends::aggregate::aggregate;
//! use traffic_trends::dataset::{DataSource, FilterSpec, SyntheticSource};
//!
//! let dataset = SyntheticSource::default().load().unwrap();
//! let filter = FilterSpec::all().device("Desktop").location("India");
//!
//! let tables = aggregate(&dataset, &filter);
//! for point in &tables.trend {
//!     println!("{}: {}", point.date, point.visits);
//! }
//! // Desktop rows only ever land on every third day of the window
//! assert_eq!(tables.trend.len(), 10);
//! ```

pub mod aggregate;
pub mod api;
pub mod config;
pub mod dataset;

// Re-export top-level types for convenience
pub use aggregate::{
    aggregate, build_charts, AggregateTables, Chart, ChartKind, LabelTotal, TrendPoint,
};

pub use dataset::{
    CsvSource, DataSource, Dataset, DatasetError, DatasetResult, FilterSpec, Record,
    SyntheticSource,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, DatasetConfig, LoggingConfig, SourceKind};
