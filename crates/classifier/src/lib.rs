//! Wind Condition Classifier
//!
//! Turns a window of normalized rows into a [`Verdict`]: average speed,
//! circular direction consistency, the longest run of qualifying samples,
//! and a categorical [`Status`] decided against a [`ThresholdConfig`].

mod classifier;
mod statistics;
mod thresholds;
mod verdict;

pub use classifier::classify;
pub use statistics::{angular_distance, average_speed, longest_streak, DirectionStats};
pub use thresholds::{ConfigError, ThresholdConfig};
pub use verdict::{ConditionMetrics, Status, Verdict};
