//! Condition Classification

use crate::statistics::{average_speed, longest_streak, DirectionStats};
use crate::thresholds::ThresholdConfig;
use crate::verdict::{ConditionMetrics, Status, Verdict};
use observation::NormalizedRow;
use tracing::debug;

/// Classify a window of rows, given in timestamp order.
///
/// Never fails: an empty or all-missing batch yields average speed 0,
/// consistency 100 and streak 0, and the row count decides whether there
/// is enough data.
pub fn classify(rows: &[NormalizedRow], thresholds: &ThresholdConfig) -> Verdict {
    let avg_speed = average_speed(rows);
    let direction = DirectionStats::from_rows(rows);
    let max_consecutive_streak = longest_streak(rows, thresholds.min_point_speed);

    let metrics = ConditionMetrics {
        has_enough_data: rows.len() >= thresholds.min_data_points,
        is_speed_good: avg_speed >= thresholds.min_avg_speed,
        is_direction_consistent: direction.consistency >= thresholds.min_dir_consistency,
        has_consistent_streak: max_consecutive_streak >= thresholds.min_consecutive_points,
    };
    let status = metrics.status();

    debug!(
        "Classified {} rows: avg {:.2} mph, consistency {:.1}, streak {} -> {}",
        rows.len(),
        avg_speed,
        direction.consistency,
        max_consecutive_streak,
        status
    );

    Verdict {
        avg_speed,
        direction_consistency: direction.consistency,
        mean_direction: direction.mean_direction,
        max_consecutive_streak,
        row_count: rows.len(),
        status,
        is_alarm_worthy: status == Status::AlarmWorthy,
        metrics,
    }
}
