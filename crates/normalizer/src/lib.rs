//! Wind Observation Normalization
//!
//! Converts raw collector readings into canonical rows (mph, degrees,
//! explicit absence) and restricts a batch to a trailing time window.

mod convert;
mod error;
mod normalizer;

pub use convert::{kph_to_mph, normalize_observation, round_hundredths, MPH_PER_KPH};
pub use error::NormalizeError;
pub use normalizer::{Normalizer, NormalizerConfig, WindowAnchor, DEFAULT_WINDOW};
