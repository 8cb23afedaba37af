//! Wind Statistics

use observation::NormalizedRow;

/// Mean of the present speeds. Absent speeds count in neither numerator
/// nor denominator; with no speeds at all the average is 0.
pub fn average_speed(rows: &[NormalizedRow]) -> f64 {
    let (sum, count) = rows
        .iter()
        .filter_map(|row| row.wind_speed)
        .fold((0.0, 0usize), |(sum, count), speed| (sum + speed, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Shortest angular distance between two bearings, in degrees (0-180)
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Circular statistics over a set of bearings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionStats {
    /// Circular mean in [0, 360), `None` without samples
    pub mean_direction: Option<f64>,
    /// Mean shortest distance from each bearing to the circular mean
    pub average_deviation: f64,
    /// 100 at zero deviation, 0 at 180 degrees
    pub consistency: f64,
    /// Number of bearings used
    pub samples: usize,
}

impl Default for DirectionStats {
    fn default() -> Self {
        Self {
            mean_direction: None,
            average_deviation: 0.0,
            consistency: 100.0,
            samples: 0,
        }
    }
}

impl DirectionStats {
    /// Compute from bearings in degrees
    pub fn compute(directions: &[f64]) -> Self {
        if directions.is_empty() {
            return Self::default();
        }

        let (sin_sum, cos_sum) = directions.iter().fold((0.0f64, 0.0f64), |(s, c), d| {
            let rad = d.to_radians();
            (s + rad.sin(), c + rad.cos())
        });

        // atan2 handles the wrap at 0/360 that a linear mean gets wrong
        let mean = (sin_sum.atan2(cos_sum).to_degrees() + 360.0) % 360.0;

        let total_deviation: f64 = directions.iter().map(|&d| angular_distance(d, mean)).sum();
        let average_deviation = total_deviation / directions.len() as f64;

        Self {
            mean_direction: Some(mean),
            average_deviation,
            consistency: (100.0 - average_deviation / 1.8).max(0.0),
            samples: directions.len(),
        }
    }

    /// Compute from the present directions of a batch
    pub fn from_rows(rows: &[NormalizedRow]) -> Self {
        let directions: Vec<f64> = rows.iter().filter_map(|row| row.wind_direction).collect();
        Self::compute(&directions)
    }
}

/// Length of the longest run of consecutive rows whose speed is present and
/// at least `min_point_speed`. A row with a missing speed ends the run.
pub fn longest_streak(rows: &[NormalizedRow], min_point_speed: f64) -> usize {
    let mut current = 0;
    let mut longest = 0;

    for row in rows {
        match row.wind_speed {
            Some(speed) if speed >= min_point_speed => {
                current += 1;
                longest = longest.max(current);
            }
            _ => current = 0,
        }
    }

    longest
}
