//! Raw Observations as Delivered by the Collector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reading as it arrives from the source feed: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Numeric interpretation of the reading, if any.
    ///
    /// Strings are parsed from their leading decimal prefix, so `"12.5 kph"`
    /// reads as 12.5 while `"SSW"` or `""` read as absent. Non-finite values
    /// are always absent.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) => Some(*v).filter(|v| v.is_finite()),
            RawValue::Text(s) => leading_number(s),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// One sample from the collector, in source units (km/h, degrees)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub timestamp: DateTime<Utc>,
    pub speed: Option<RawValue>,
    pub gust: Option<RawValue>,
    pub direction: Option<RawValue>,
}

impl RawObservation {
    /// Create an observation with numeric readings
    pub fn new(
        timestamp: DateTime<Utc>,
        speed: Option<f64>,
        gust: Option<f64>,
        direction: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            speed: speed.map(RawValue::Number),
            gust: gust.map(RawValue::Number),
            direction: direction.map(RawValue::Number),
        }
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            end = j;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
