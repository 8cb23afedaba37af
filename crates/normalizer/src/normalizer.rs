//! Batch Normalization with Trailing Window

use crate::convert::normalize_observation;
use crate::error::NormalizeError;
use chrono::{DateTime, Utc};
use observation::{NormalizedRow, RawObservation};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default trailing window: 24 hours
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Where the trailing window ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowAnchor {
    /// At the most recent sample in the batch
    #[default]
    LatestSample,
    /// At a fixed instant (replays, tests)
    At(DateTime<Utc>),
}

/// Normalizer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizerConfig {
    /// Length of the trailing window
    pub window: Duration,
    /// End of the trailing window
    pub anchor: WindowAnchor,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            anchor: WindowAnchor::LatestSample,
        }
    }
}

impl NormalizerConfig {
    /// Window of the given number of hours, anchored at the latest sample
    pub fn hours(hours: u64) -> Result<Self, NormalizeError> {
        let secs = hours
            .checked_mul(60 * 60)
            .ok_or_else(|| NormalizeError::InvalidWindow(format!("{} hours overflows", hours)))?;
        Ok(Self {
            window: Duration::from_secs(secs),
            ..Default::default()
        })
    }
}

/// Converts raw batches into windowed, chronologically ordered rows
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
    window: chrono::Duration,
}

impl Normalizer {
    /// Create a new normalizer
    pub fn new(config: NormalizerConfig) -> Result<Self, NormalizeError> {
        let window = chrono::Duration::from_std(config.window)
            .map_err(|e| NormalizeError::InvalidWindow(format!("{:?}: {}", config.window, e)))?;
        Ok(Self { config, window })
    }

    /// Current configuration
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize a batch and keep only rows inside the trailing window.
    ///
    /// Rows come out sorted by timestamp; rows with equal timestamps keep
    /// their input order. An empty result is an error.
    pub fn normalize(&self, observations: &[RawObservation]) -> Result<Vec<NormalizedRow>, NormalizeError> {
        let mut rows: Vec<NormalizedRow> = observations.iter().map(normalize_observation).collect();

        if !rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
            warn!("Observations arrived out of order, sorting {} rows by timestamp", rows.len());
            rows.sort_by_key(|row| row.timestamp);
        }

        let anchor = match self.config.anchor {
            WindowAnchor::At(instant) => Some(instant),
            WindowAnchor::LatestSample => rows.last().map(|row| row.timestamp),
        };
        let cutoff = anchor.and_then(|anchor| anchor.checked_sub_signed(self.window));

        let total = rows.len();
        if let Some(cutoff) = cutoff {
            rows.retain(|row| row.timestamp >= cutoff);
        }

        if rows.is_empty() {
            return Err(NormalizeError::EmptyWindow {
                observations: total,
                cutoff,
            });
        }

        let missing_speed = rows.iter().filter(|row| row.wind_speed.is_none()).count();
        if missing_speed > 0 {
            warn!("{} of {} retained rows have no usable speed", missing_speed, rows.len());
        }
        debug!("Window cutoff {:?}, dropped {} rows", cutoff, total - rows.len());
        info!("Normalized {} observations, {} inside window", total, rows.len());

        Ok(rows)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            config: NormalizerConfig::default(),
            window: chrono::Duration::hours(24),
        }
    }
}
