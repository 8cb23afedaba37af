//! Classification Results

use crate::thresholds::ThresholdConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical outcome of a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Too few rows to decide
    InsufficientData,
    /// Speed is good, and direction is steady or a qualifying streak exists
    AlarmWorthy,
    /// Either the speed or the streak holds, not enough for an alarm
    Marginal,
    /// Neither speed nor streak holds
    NotWorthy,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::InsufficientData => write!(f, "INSUFFICIENT DATA"),
            Status::AlarmWorthy => write!(f, "ALARM WORTHY"),
            Status::Marginal => write!(f, "MARGINAL"),
            Status::NotWorthy => write!(f, "NOT WORTHY"),
        }
    }
}

/// The four sub-judgments behind a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionMetrics {
    pub has_enough_data: bool,
    pub is_speed_good: bool,
    pub is_direction_consistent: bool,
    pub has_consistent_streak: bool,
}

impl ConditionMetrics {
    /// Apply the decision rule; the first matching branch wins
    pub fn status(&self) -> Status {
        if !self.has_enough_data {
            Status::InsufficientData
        } else if self.is_speed_good && (self.is_direction_consistent || self.has_consistent_streak) {
            Status::AlarmWorthy
        } else if self.is_speed_good || self.has_consistent_streak {
            Status::Marginal
        } else {
            Status::NotWorthy
        }
    }
}

/// Result of classifying one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub avg_speed: f64,
    pub direction_consistency: f64,
    pub mean_direction: Option<f64>,
    pub max_consecutive_streak: usize,
    pub row_count: usize,
    pub status: Status,
    pub is_alarm_worthy: bool,
    pub metrics: ConditionMetrics,
}

impl Verdict {
    /// Multi-line report against the thresholds that produced this verdict
    pub fn summary(&self, thresholds: &ThresholdConfig) -> String {
        format!(
            "Avg speed: {:.1} mph (threshold: {} mph)\n\
             Direction consistency: {:.1}% (threshold: {}%)\n\
             Max consecutive streak: {} (threshold: {})\n\
             Status: {}\n\
             Alarm worthy: {}",
            self.avg_speed,
            thresholds.min_avg_speed,
            self.direction_consistency,
            thresholds.min_dir_consistency,
            self.max_consecutive_streak,
            thresholds.min_consecutive_points,
            self.status,
            if self.is_alarm_worthy { "YES" } else { "NO" },
        )
    }
}
