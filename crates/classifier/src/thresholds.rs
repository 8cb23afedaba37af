//! Classification Thresholds

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid threshold values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Thresholds for one classification call
///
/// Every field can be overridden on its own; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum average wind speed (mph)
    pub min_avg_speed: f64,
    /// Minimum direction consistency (0-100)
    pub min_dir_consistency: f64,
    /// Minimum number of rows in the window
    pub min_data_points: usize,
    /// Minimum run of consecutive qualifying rows
    pub min_consecutive_points: usize,
    /// Minimum speed for a single row to qualify (mph)
    pub min_point_speed: f64,
    /// Maximum direction deviation (degrees). Reserved: not consulted by the
    /// current decision rule.
    pub max_dir_deviation: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_avg_speed: 10.0,
            min_dir_consistency: 70.0,
            min_data_points: 4,
            min_consecutive_points: 4,
            min_point_speed: 8.0,
            max_dir_deviation: 40.0,
        }
    }
}

impl ThresholdConfig {
    /// Lower thresholds for lighter-air spots
    pub fn lenient() -> Self {
        Self {
            min_avg_speed: 7.0,
            min_dir_consistency: 50.0,
            min_data_points: 3,
            min_consecutive_points: 3,
            min_point_speed: 6.0,
            max_dir_deviation: 60.0,
        }
    }

    /// Check that every threshold is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_avg_speed", self.min_avg_speed),
            ("min_point_speed", self.min_point_speed),
            ("max_dir_deviation", self.max_dir_deviation),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(0.0..=100.0).contains(&self.min_dir_consistency) {
            return Err(ConfigError::OutOfRange {
                field: "min_dir_consistency",
                value: self.min_dir_consistency,
                min: 0.0,
                max: 100.0,
            });
        }

        if !(0.0..=180.0).contains(&self.max_dir_deviation) {
            return Err(ConfigError::OutOfRange {
                field: "max_dir_deviation",
                value: self.max_dir_deviation,
                min: 0.0,
                max: 180.0,
            });
        }

        Ok(())
    }
}
