//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dataset::{CsvSource, DataSource, SyntheticSource};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which data source feeds the dashboard
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Synthetic,
    Csv,
}

impl std::str::FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synthetic" => Ok(SourceKind::Synthetic),
            "csv" => Ok(SourceKind::Csv),
            _ => Err(ConfigError::Invalid(format!(
                "Unknown dataset source: {}. Use synthetic or csv",
                s
            ))),
        }
    }
}

/// Dataset source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default)]
    pub source: SourceKind,

    /// Required when `source = "csv"`
    #[serde(default)]
    pub csv_path: Option<String>,

    #[serde(default = "default_synthetic_days")]
    pub synthetic_days: u32,

    #[serde(default = "default_synthetic_repetitions")]
    pub synthetic_repetitions: u32,

    /// First generated day, `YYYY-MM-DD` (default: 2025-07-01)
    #[serde(default)]
    pub synthetic_start: Option<String>,
}

fn default_synthetic_days() -> u32 {
    30
}

fn default_synthetic_repetitions() -> u32 {
    3
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            csv_path: None,
            synthetic_days: default_synthetic_days(),
            synthetic_repetitions: default_synthetic_repetitions(),
            synthetic_start: None,
        }
    }
}

impl DatasetConfig {
    /// Build the configured data source
    pub fn data_source(&self) -> Result<Box<dyn DataSource>, ConfigError> {
        match self.source {
            SourceKind::Synthetic => {
                let mut source = SyntheticSource::default()
                    .window(self.synthetic_days, self.synthetic_repetitions);
                if let Some(start) = &self.synthetic_start {
                    let date = NaiveDate::parse_from_str(start, "%Y-%m-%d").map_err(|e| {
                        ConfigError::Invalid(format!(
                            "dataset.synthetic_start '{}' is not a YYYY-MM-DD date: {}",
                            start, e
                        ))
                    })?;
                    source = source.start(date);
                }
                Ok(Box::new(source))
            }
            SourceKind::Csv => {
                let path = self.csv_path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("dataset.csv_path is required for csv source".to_string())
                })?;
                Ok(Box::new(CsvSource::new(path)))
            }
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Dashboard title reported to clients
    #[serde(default = "default_title")]
    pub title: String,

    /// Enable the filtered-record export endpoint
    #[serde(default = "default_enable_export")]
    pub enable_export: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_title() -> String {
    "Website Traffic Trend Analyzer".to_string()
}

fn default_enable_export() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            title: default_title(),
            enable_export: default_enable_export(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the configured level.
    pub fn init(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("traffic_trends={},tower_http=info", self.level))
        });

        let registry = tracing_subscriber::registry().with(filter);
        let result = if self.format.eq_ignore_ascii_case("json") {
            registry.with(tracing_subscriber::fmt::layer().json()).try_init()
        } else {
            registry.with(tracing_subscriber::fmt::layer()).try_init()
        };

        if let Err(e) = result {
            eprintln!("tracing subscriber already installed: {}", e);
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("traffic-trends").join("config.toml")),
            Some(PathBuf::from("/etc/traffic-trends/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Dataset overrides
        if let Ok(source) = std::env::var("TRAFFIC_DATASET_SOURCE") {
            match source.parse() {
                Ok(kind) => self.dataset.source = kind,
                Err(e) => tracing::warn!("Ignoring TRAFFIC_DATASET_SOURCE: {}", e),
            }
        }
        if let Ok(path) = std::env::var("TRAFFIC_CSV_PATH") {
            self.dataset.csv_path = Some(path);
        }

        // API overrides
        if let Ok(host) = std::env::var("TRAFFIC_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("TRAFFIC_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("TRAFFIC_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TRAFFIC_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Traffic Trends Configuration
#
# Environment variables override these settings:
# - TRAFFIC_DATASET_SOURCE
# - TRAFFIC_CSV_PATH
# - TRAFFIC_API_HOST
# - TRAFFIC_API_PORT
# - TRAFFIC_LOG_LEVEL
# - TRAFFIC_LOG_FORMAT

[dataset]
# Where records come from: synthetic or csv
source = "synthetic"

# CSV file with header date,page,visits,device,location
# csv_path = "./traffic.csv"

# Synthetic generator window (days) and how many times it repeats
synthetic_days = 30
synthetic_repetitions = 3

# First generated day (quoted, YYYY-MM-DD)
# synthetic_start = "2025-07-01"

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8050

# Dashboard title reported to clients
title = "Website Traffic Trend Analyzer"

# Enable the filtered-record export endpoint
enable_export = true

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.dataset.source, SourceKind::Synthetic);
        assert_eq!(config.dataset.synthetic_days, 30);
        assert_eq!(config.api.port, 8050);
        assert_eq!(config.api.title, "Website Traffic Trend Analyzer");
        assert!(config.api.enable_export);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.dataset.synthetic_repetitions, 3);
        assert_eq!(config.api.addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_csv_source_requires_path() {
        let config = Config::parse("[dataset]\nsource = \"csv\"\n").unwrap();
        assert!(matches!(
            config.dataset.data_source(),
            Err(ConfigError::Invalid(_))
        ));

        let config =
            Config::parse("[dataset]\nsource = \"csv\"\ncsv_path = \"traffic.csv\"\n").unwrap();
        assert_eq!(config.dataset.data_source().unwrap().name(), "csv");
    }

    #[test]
    fn test_synthetic_source_from_config() {
        let config = Config::parse("[dataset]\nsynthetic_days = 7\nsynthetic_repetitions = 2\n")
            .unwrap();
        let dataset = config.dataset.data_source().unwrap().load().unwrap();
        assert_eq!(dataset.len(), 14);
    }

    #[test]
    fn test_synthetic_start_from_config() {
        let config = Config::parse(
            "[dataset]\nsynthetic_days = 3\nsynthetic_repetitions = 1\nsynthetic_start = \"2024-12-31\"\n",
        )
        .unwrap();
        let dataset = config.dataset.data_source().unwrap().load().unwrap();
        assert_eq!(
            dataset.date_span(),
            (
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
            )
        );

        let config = Config::parse("[dataset]\nsynthetic_start = \"July 1st\"\n").unwrap();
        assert!(matches!(
            config.dataset.data_source(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("CSV".parse::<SourceKind>().unwrap(), SourceKind::Csv);
        assert!("parquet".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_load_from_file_errors() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = \"not a number\"").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
