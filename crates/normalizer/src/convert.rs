//! Unit Conversion

use chrono::SecondsFormat;
use observation::{NormalizedRow, RawObservation, RawValue};
use tracing::debug;

/// Miles per hour in one kilometer per hour
pub const MPH_PER_KPH: f64 = 0.621371;

/// Readings above this (km/h) are logged during conversion
const HIGH_READING_KPH: f64 = 60.0;

/// Round to two decimal places
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert km/h to mph, rounded to two decimals
pub fn kph_to_mph(kph: f64) -> f64 {
    round_hundredths(kph * MPH_PER_KPH)
}

fn convert_speed(raw: Option<&RawValue>) -> Option<f64> {
    let kph = raw?.as_number()?;
    let mph = kph_to_mph(kph);
    if kph > HIGH_READING_KPH {
        debug!("Converting high value: {} kph -> {:.2} mph", kph, mph);
    }
    Some(mph)
}

/// Convert one raw observation. Unparsable readings become `None`.
///
/// Direction is copied as-is when numeric; textual compass points are
/// treated as absent rather than translated.
pub fn normalize_observation(obs: &RawObservation) -> NormalizedRow {
    let row = NormalizedRow {
        timestamp: obs.timestamp,
        wind_speed: convert_speed(obs.speed.as_ref()),
        wind_gust: convert_speed(obs.gust.as_ref()),
        wind_direction: obs.direction.as_ref().and_then(RawValue::as_number),
    };

    if obs.speed.is_some() && row.wind_speed.is_none() {
        debug!(
            "Unparsable speed {:?} at {}",
            obs.speed,
            obs.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }

    row
}
