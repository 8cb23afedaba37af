//! Station Graph Payload Decoding
//!
//! The station feed answers with an object of parallel series, each a list of
//! `[epoch_millis, value]` pairs, optionally wrapped in a JSONP callback:
//!
//! ```text
//! jQuery123({"wind_avg_data": [[1747450800000, 18.5], ...], "wind_gust_data": [...], ...})
//! ```
//!
//! Speed and gust are in km/h, direction in degrees. Pairing across series is
//! by position, anchored on the speed series.

use crate::error::FetchError;
use chrono::{DateTime, Utc};
use observation::{RawObservation, RawValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Series arrays of one graph response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub wind_avg_data: Option<Vec<Value>>,
    #[serde(default)]
    pub wind_gust_data: Option<Vec<Value>>,
    #[serde(default)]
    pub wind_dir_data: Option<Vec<Value>>,
    #[serde(default)]
    pub wind_direction_data: Option<Vec<Value>>,
    #[serde(default)]
    pub wind_dir_text_data: Option<Vec<Value>>,
}

/// Strip a JSONP callback wrapper (`name( ... )` with an optional trailing `;`).
///
/// Bodies that already start as JSON are returned trimmed and unchanged.
pub fn unwrap_jsonp(body: &str) -> Result<&str, FetchError> {
    let body = body.trim();
    if body.starts_with('{') || body.starts_with('[') {
        return Ok(body);
    }

    let open = body
        .find('(')
        .ok_or_else(|| FetchError::MalformedInput("payload is neither JSON nor JSONP".to_string()))?;
    let close = body
        .trim_end_matches(';')
        .trim_end()
        .strip_suffix(')')
        .map(|inner| inner.len())
        .ok_or_else(|| FetchError::MalformedInput("unterminated JSONP callback".to_string()))?;

    if open == 0 || close <= open {
        return Err(FetchError::MalformedInput("invalid JSONP callback".to_string()));
    }

    Ok(&body[open + 1..close])
}

/// Decode a (possibly JSONP-wrapped) graph response body
pub fn decode_graph_payload(body: &str) -> Result<GraphPayload, FetchError> {
    let json = unwrap_jsonp(body)?;
    serde_json::from_str(json)
        .map_err(|e| FetchError::MalformedInput(format!("graph payload is not valid JSON: {}", e)))
}

impl GraphPayload {
    /// Assemble observations in feed order.
    ///
    /// The speed series is required, strictly checked, and drives the
    /// timestamps. Gust and direction readings are paired by index and only
    /// their value is read; a missing or unusable partner is an absent
    /// reading. Direction comes from the first non-empty of the numeric
    /// direction series, falling back to the text series.
    pub fn into_observations(self) -> Result<Vec<RawObservation>, FetchError> {
        let speeds = self
            .wind_avg_data
            .filter(|series| !series.is_empty())
            .ok_or_else(|| FetchError::MalformedInput("missing wind_avg_data series".to_string()))?;
        let gusts = self.wind_gust_data.unwrap_or_default();
        if gusts.is_empty() {
            warn!("Graph payload carries no gust series");
        }

        let directions = [
            ("wind_dir_data", self.wind_dir_data),
            ("wind_direction_data", self.wind_direction_data),
            ("wind_dir_text_data", self.wind_dir_text_data),
        ]
        .into_iter()
        .find_map(|(name, series)| series.filter(|s| !s.is_empty()).map(|s| (name, s)));

        let directions = match directions {
            Some((name, series)) => {
                debug!("Using {} for wind direction ({} points)", name, series.len());
                series
            }
            None => {
                warn!("Graph payload carries no direction series");
                Vec::new()
            }
        };

        if !gusts.is_empty() && gusts.len() != speeds.len() {
            warn!(
                "Gust series length {} differs from speed series length {}",
                gusts.len(),
                speeds.len()
            );
        }

        let mut observations = Vec::with_capacity(speeds.len());
        for (i, entry) in speeds.iter().enumerate() {
            let (timestamp, speed) = decode_point("wind_avg_data", i, entry)?;
            let gust = gusts
                .get(i)
                .and_then(|entry| partner_value("wind_gust_data", i, entry));
            let direction = directions
                .get(i)
                .and_then(|entry| partner_value("wind direction", i, entry));

            observations.push(RawObservation {
                timestamp,
                speed,
                gust,
                direction,
            });
        }

        debug!("Assembled {} raw observations", observations.len());
        Ok(observations)
    }
}

fn decode_point(
    series: &str,
    index: usize,
    entry: &Value,
) -> Result<(DateTime<Utc>, Option<RawValue>), FetchError> {
    let pair = entry
        .as_array()
        .filter(|pair| pair.len() == 2)
        .ok_or_else(|| {
            FetchError::MalformedInput(format!("{}[{}] is not a [time, value] pair", series, index))
        })?;

    let millis = pair[0]
        .as_i64()
        .or_else(|| pair[0].as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64))
        .ok_or_else(|| {
            FetchError::MalformedInput(format!("{}[{}] has a non-integer timestamp", series, index))
        })?;
    let timestamp = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        FetchError::MalformedInput(format!("{}[{}] timestamp {} is out of range", series, index, millis))
    })?;

    let value = match &pair[1] {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(RawValue::Number),
        Value::String(s) => Some(RawValue::Text(s.clone())),
        other => {
            return Err(FetchError::MalformedInput(format!(
                "{}[{}] has a structured value: {}",
                series, index, other
            )))
        }
    };

    Ok((timestamp, value))
}

/// Value of a gust or direction entry. Its timestamp is not used, so only
/// the value slot is read; anything unusable is an absent reading.
fn partner_value(series: &str, index: usize, entry: &Value) -> Option<RawValue> {
    match entry.as_array().and_then(|pair| pair.get(1)) {
        Some(Value::Number(n)) => n.as_f64().map(RawValue::Number),
        Some(Value::String(s)) => Some(RawValue::Text(s.clone())),
        Some(Value::Null) => None,
        Some(other) => {
            warn!("{}[{}] has an unusable value {}, treating as absent", series, index, other);
            None
        }
        None => {
            warn!("{}[{}] is not a [time, value] pair, treating as absent", series, index);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const T0: i64 = 1_747_450_800_000; // 2025-05-17T03:00:00Z

    #[test]
    fn test_unwrap_jsonp() {
        assert_eq!(unwrap_jsonp(r#"cb({"a":1})"#).unwrap(), r#"{"a":1}"#);
        assert_eq!(unwrap_jsonp(" jQuery_1({\"a\":1});\n").unwrap(), r#"{"a":1}"#);
        assert_eq!(unwrap_jsonp(r#"{"a":1}"#).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_unwrap_jsonp_rejects_garbage() {
        assert!(unwrap_jsonp("<html>").is_err());
        assert!(unwrap_jsonp("cb({\"a\":1}").is_err());
        assert!(unwrap_jsonp("({\"a\":1})").is_err());
    }

    #[test]
    fn test_decode_pairs_series_by_index() {
        let body = format!(
            r#"cb({{
                "wind_avg_data": [[{t0}, 18.5], [{t1}, "19.3"]],
                "wind_gust_data": [[{t0}, 22.8]],
                "wind_dir_data": [[{t0}, 180], [{t1}, 185]]
            }})"#,
            t0 = T0,
            t1 = T0 + 900_000
        );
        let observations = decode_graph_payload(&body).unwrap().into_observations().unwrap();

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].timestamp, Utc.with_ymd_and_hms(2025, 5, 17, 3, 0, 0).unwrap());
        assert_eq!(observations[0].speed, Some(RawValue::Number(18.5)));
        assert_eq!(observations[0].gust, Some(RawValue::Number(22.8)));
        assert_eq!(observations[1].speed, Some(RawValue::Text("19.3".to_string())));
        assert_eq!(observations[1].gust, None);
        assert_eq!(observations[1].direction, Some(RawValue::Number(185.0)));
    }

    #[test]
    fn test_direction_falls_back_to_text_series() {
        let body = format!(
            r#"{{"wind_avg_data": [[{t0}, 10]], "wind_dir_data": [], "wind_dir_text_data": [[{t0}, "SSW"]]}}"#,
            t0 = T0
        );
        let observations = decode_graph_payload(&body).unwrap().into_observations().unwrap();
        assert_eq!(observations[0].direction, Some(RawValue::Text("SSW".to_string())));
        assert_eq!(observations[0].direction.as_ref().and_then(RawValue::as_number), None);
    }

    #[test]
    fn test_direction_uses_alternate_numeric_series() {
        let body = format!(
            r#"{{"wind_avg_data": [[{t0}, 10]], "wind_direction_data": [[{t0}, 270]]}}"#,
            t0 = T0
        );
        let observations = decode_graph_payload(&body).unwrap().into_observations().unwrap();
        assert_eq!(observations[0].direction, Some(RawValue::Number(270.0)));
    }

    #[test]
    fn test_null_readings_are_absent() {
        let body = format!(r#"{{"wind_avg_data": [[{t0}, null]]}}"#, t0 = T0);
        let observations = decode_graph_payload(&body).unwrap().into_observations().unwrap();
        assert_eq!(observations[0].speed, None);
        assert_eq!(observations[0].direction, None);
    }

    #[test]
    fn test_bad_partner_entries_are_absent() {
        let body = format!(
            r#"{{
                "wind_avg_data": [[{t0}, 18.5], [{t1}, 19.0], [{t2}, 19.3]],
                "wind_gust_data": [[{t0}, 22.0], null, [{t2}, {{"kph": 24}}]],
                "wind_dir_data": [["n/a", 180], [{t1}], [{t2}, 185]]
            }}"#,
            t0 = T0,
            t1 = T0 + 900_000,
            t2 = T0 + 1_800_000
        );
        let observations = decode_graph_payload(&body).unwrap().into_observations().unwrap();

        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].gust, Some(RawValue::Number(22.0)));
        assert_eq!(observations[0].direction, Some(RawValue::Number(180.0)));
        assert_eq!(observations[1].speed, Some(RawValue::Number(19.0)));
        assert_eq!(observations[1].gust, None);
        assert_eq!(observations[1].direction, None);
        assert_eq!(observations[2].gust, None);
        assert_eq!(observations[2].direction, Some(RawValue::Number(185.0)));
    }

    #[test]
    fn test_missing_gust_series_is_accepted() {
        let body = format!(r#"{{"wind_avg_data": [[{t0}, 18.5]]}}"#, t0 = T0);
        let observations = decode_graph_payload(&body).unwrap().into_observations().unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].gust, None);
    }

    #[test]
    fn test_missing_speed_series_is_malformed() {
        let result = decode_graph_payload(r#"{"wind_gust_data": []}"#)
            .unwrap()
            .into_observations();
        assert!(matches!(result, Err(FetchError::MalformedInput(_))));

        let result = decode_graph_payload(r#"{"wind_avg_data": []}"#)
            .unwrap()
            .into_observations();
        assert!(matches!(result, Err(FetchError::MalformedInput(_))));
    }

    #[test]
    fn test_structural_violations_are_malformed() {
        for body in [
            r#"{"wind_avg_data": [18.5]}"#,
            r#"{"wind_avg_data": [[1, 2, 3]]}"#,
            r#"{"wind_avg_data": [["yesterday", 2]]}"#,
            r#"{"wind_avg_data": [[1747450800000.5, 2]]}"#,
            r#"{"wind_avg_data": [[1747450800000, {"kph": 2}]]}"#,
        ] {
            let result = decode_graph_payload(body).unwrap().into_observations();
            assert!(
                matches!(result, Err(FetchError::MalformedInput(_))),
                "expected malformed input for {}",
                body
            );
        }
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        assert!(matches!(
            decode_graph_payload("cb(not json)"),
            Err(FetchError::MalformedInput(_))
        ));
        assert!(matches!(
            decode_graph_payload(r#"["not", "an", "object"]"#),
            Err(FetchError::MalformedInput(_))
        ));
    }
}
