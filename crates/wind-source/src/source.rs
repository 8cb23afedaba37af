//! Observation Sources

use crate::error::FetchError;
use crate::payload::decode_graph_payload;
use chrono::{DateTime, Duration, TimeZone, Utc};
use observation::RawObservation;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Anything that yields one batch of raw observations per call
pub trait ObservationSource: Send + Sync {
    /// Human-readable name used in logs and reports
    fn name(&self) -> &str;

    /// Collect the current batch, in collection order
    fn fetch(&self) -> Result<Vec<RawObservation>, FetchError>;
}

/// Reads a saved graph payload (JSON or JSONP) from disk
pub struct FileSource {
    name: String,
    path: PathBuf,
}

impl FileSource {
    /// Create a new file source
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl ObservationSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<RawObservation>, FetchError> {
        info!("Reading graph payload for {} from {}", self.name, self.path.display());

        let body = std::fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })?;

        let observations = decode_graph_payload(&body)?.into_observations()?;
        debug!("{}: {} observations decoded", self.name, observations.len());
        Ok(observations)
    }
}

/// Canned condition profiles served by [`MockSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Steady ~12 mph from the south
    GoodConditions,
    /// Steady direction but only ~7-8 mph
    LowSpeed,
    /// Good speed, direction swinging between 178 and 260 degrees
    InconsistentDirection,
}

impl Scenario {
    /// All scenarios in a stable order
    pub fn all() -> [Scenario; 3] {
        [
            Scenario::GoodConditions,
            Scenario::LowSpeed,
            Scenario::InconsistentDirection,
        ]
    }

    /// Speed, gust (km/h) and direction (degrees) per sample
    fn samples(self) -> [(f64, f64, f64); 8] {
        match self {
            Scenario::GoodConditions => [
                (18.51, 22.85, 180.0),
                (19.31, 23.34, 185.0),
                (18.99, 22.37, 178.0),
                (19.63, 24.30, 182.0),
                (18.83, 22.53, 181.0),
                (19.15, 23.01, 183.0),
                (19.47, 23.66, 179.0),
                (19.31, 23.17, 180.0),
            ],
            Scenario::LowSpeed => [
                (12.07, 14.81, 180.0),
                (11.27, 15.29, 185.0),
                (12.55, 15.93, 178.0),
                (11.59, 16.25, 182.0),
                (12.39, 16.09, 181.0),
                (12.71, 16.58, 183.0),
                (13.04, 17.22, 179.0),
                (12.87, 16.74, 180.0),
            ],
            Scenario::InconsistentDirection => [
                (18.51, 22.85, 180.0),
                (19.31, 23.34, 220.0),
                (18.99, 22.37, 178.0),
                (19.63, 24.30, 240.0),
                (18.83, 22.53, 181.0),
                (19.15, 23.01, 260.0),
                (19.47, 23.66, 179.0),
                (19.31, 23.17, 230.0),
            ],
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::GoodConditions => write!(f, "good"),
            Scenario::LowSpeed => write!(f, "low-speed"),
            Scenario::InconsistentDirection => write!(f, "inconsistent-direction"),
        }
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Scenario::GoodConditions),
            "low-speed" => Ok(Scenario::LowSpeed),
            "inconsistent-direction" => Ok(Scenario::InconsistentDirection),
            other => Err(format!("unknown scenario: {}", other)),
        }
    }
}

/// Deterministic source for demos and tests (no network, no files)
pub struct MockSource {
    name: String,
    scenario: Scenario,
    start: DateTime<Utc>,
}

impl MockSource {
    /// Sample spacing of the canned batches
    pub const INTERVAL_MINUTES: i64 = 15;

    /// Create a mock source starting at 2025-05-17 03:00 UTC
    pub fn new(scenario: Scenario) -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 5, 17, 3, 0, 0)
            .single()
            .unwrap_or_default();
        Self::starting_at(scenario, start)
    }

    /// Create a mock source whose first sample is at `start`
    pub fn starting_at(scenario: Scenario, start: DateTime<Utc>) -> Self {
        info!("Creating mock source for scenario {}", scenario);
        Self {
            name: format!("mock:{}", scenario),
            scenario,
            start,
        }
    }

    /// Scenario served by this source
    pub fn scenario(&self) -> Scenario {
        self.scenario
    }
}

impl ObservationSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<RawObservation>, FetchError> {
        let observations = self
            .scenario
            .samples()
            .iter()
            .enumerate()
            .map(|(i, &(speed, gust, direction))| {
                RawObservation::new(
                    self.start + Duration::minutes(i as i64 * Self::INTERVAL_MINUTES),
                    Some(speed),
                    Some(gust),
                    Some(direction),
                )
            })
            .collect();
        Ok(observations)
    }
}
