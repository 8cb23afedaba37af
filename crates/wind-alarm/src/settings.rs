//! Application Settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `WIND_ALARM__*` environment variables (`__` separates nesting,
//! e.g. `WIND_ALARM__THRESHOLDS__MIN_AVG_SPEED=12`).

use classifier::ThresholdConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "WIND_ALARM";

/// Settings file looked up in the working directory when none is given
pub const DEFAULT_FILE: &str = "wind-alarm";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid thresholds: {0}")]
    Thresholds(#[from] classifier::ConfigError),

    #[error("Duplicate spot name: {0}")]
    DuplicateSpot(String),
}

/// A monitored spot and where its payload is saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotConfig {
    pub name: String,
    pub payload: PathBuf,
}

/// Export format for normalized rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Where normalized rows are persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

impl OutputConfig {
    /// Output file for a spot: `<directory>/<spot>.<ext>`, with the spot
    /// name reduced to characters safe in file names
    pub fn path_for(&self, spot: &str) -> PathBuf {
        let stem: String = spot
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.directory.join(format!("{}.{}", stem, self.format.extension()))
    }
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Trailing window length in hours
    pub window_hours: u64,
    pub thresholds: ThresholdConfig,
    pub spots: Vec<SpotConfig>,
    pub output: Option<OutputConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            thresholds: ThresholdConfig::default(),
            spots: Vec::new(),
            output: None,
        }
    }
}

impl AppConfig {
    /// Load settings from `path` (required) or `./wind-alarm.toml` (optional),
    /// overlaid with environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = settings.try_deserialize()?;
        app.validate()?;
        info!(
            "Loaded configuration: {} spots, {}h window",
            app.spots.len(),
            app.window_hours
        );
        Ok(app)
    }

    /// Parse settings from TOML text, without the environment overlay
    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        let app: AppConfig = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Check thresholds and spot names
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.thresholds.validate()?;

        let mut seen = std::collections::HashSet::new();
        for spot in &self.spots {
            if !seen.insert(spot.name.as_str()) {
                return Err(SettingsError::DuplicateSpot(spot.name.clone()));
            }
        }
        Ok(())
    }
}
