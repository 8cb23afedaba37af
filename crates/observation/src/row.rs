//! Normalized Rows and their Export Shape

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column names of the exported row, in order
pub const EXPORT_HEADER: [&str; 4] = ["time", "windSpeed", "windGust", "windDirection"];

/// One sample after unit conversion (mph, degrees)
///
/// A reading that could not be parsed is `None`, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub timestamp: DateTime<Utc>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_direction: Option<f64>,
}

/// The string-typed shape handed to writers and renderers.
///
/// Speed and gust carry two fractional digits, direction is the plain
/// degree value, and a missing reading is an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub time: String,
    #[serde(rename = "windSpeed")]
    pub wind_speed: String,
    #[serde(rename = "windGust")]
    pub wind_gust: String,
    #[serde(rename = "windDirection")]
    pub wind_direction: String,
}

/// Errors when reading an exported row back
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowParseError {
    #[error("invalid timestamp: {0:?}")]
    Timestamp(String),
    #[error("{field} value {value:?} is not a number")]
    NotANumber { field: &'static str, value: String },
}

impl From<&NormalizedRow> for ExportRow {
    fn from(row: &NormalizedRow) -> Self {
        Self {
            time: row.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            wind_speed: row.wind_speed.map(|v| format!("{:.2}", v)).unwrap_or_default(),
            wind_gust: row.wind_gust.map(|v| format!("{:.2}", v)).unwrap_or_default(),
            wind_direction: row.wind_direction.map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

impl TryFrom<&ExportRow> for NormalizedRow {
    type Error = RowParseError;

    fn try_from(row: &ExportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: parse_time(&row.time)?,
            wind_speed: parse_cell("windSpeed", &row.wind_speed)?,
            wind_gust: parse_cell("windGust", &row.wind_gust)?,
            wind_direction: parse_cell("windDirection", &row.wind_direction)?,
        })
    }
}

/// Parse an export timestamp. Offsets are honoured; a bare local time is read as UTC.
fn parse_time(s: &str) -> Result<DateTime<Utc>, RowParseError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| RowParseError::Timestamp(s.to_string()))
}

fn parse_cell(field: &'static str, value: &str) -> Result<Option<f64>, RowParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| RowParseError::NotANumber {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn row(speed: Option<f64>, gust: Option<f64>, direction: Option<f64>) -> NormalizedRow {
        NormalizedRow {
            timestamp: Utc.with_ymd_and_hms(2025, 5, 17, 3, 0, 0).unwrap(),
            wind_speed: speed,
            wind_gust: gust,
            wind_direction: direction,
        }
    }

    #[test]
    fn test_export_formatting() {
        let export = ExportRow::from(&row(Some(11.5), Some(14.237), Some(180.0)));
        assert_eq!(export.time, "2025-05-17T03:00:00.000Z");
        assert_eq!(export.wind_speed, "11.50");
        assert_eq!(export.wind_gust, "14.24");
        assert_eq!(export.wind_direction, "180");
    }

    #[test]
    fn test_missing_readings_export_as_empty() {
        let export = ExportRow::from(&row(None, None, None));
        assert_eq!(export.wind_speed, "");
        assert_eq!(export.wind_gust, "");
        assert_eq!(export.wind_direction, "");
    }

    #[test]
    fn test_export_field_names() {
        let json = serde_json::to_value(ExportRow::from(&row(Some(1.0), None, Some(92.5)))).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for name in EXPORT_HEADER {
            assert!(keys.contains(&name), "missing field {}", name);
        }
        assert_eq!(json["windDirection"], "92.5");
    }

    #[test]
    fn test_parse_bare_local_time_as_utc() {
        let export = ExportRow {
            time: "2025-05-17T03:15:00".to_string(),
            wind_speed: "12.0".to_string(),
            wind_gust: "".to_string(),
            wind_direction: "185".to_string(),
        };
        let parsed = NormalizedRow::try_from(&export).unwrap();
        assert_eq!(parsed.timestamp, Utc.with_ymd_and_hms(2025, 5, 17, 3, 15, 0).unwrap());
        assert_eq!(parsed.wind_speed, Some(12.0));
        assert_eq!(parsed.wind_gust, None);
        assert_eq!(parsed.wind_direction, Some(185.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let mut export = ExportRow::from(&row(Some(1.0), None, None));
        export.wind_gust = "gusty".to_string();
        assert!(matches!(
            NormalizedRow::try_from(&export),
            Err(RowParseError::NotANumber { field: "windGust", .. })
        ));

        export.wind_gust.clear();
        export.time = "yesterday".to_string();
        assert!(matches!(NormalizedRow::try_from(&export), Err(RowParseError::Timestamp(_))));
    }

    proptest! {
        #[test]
        fn prop_presence_survives_export(
            speed in proptest::option::of(0.0f64..200.0),
            gust in proptest::option::of(0.0f64..200.0),
            direction in proptest::option::of(0.0f64..360.0),
        ) {
            let original = row(speed, gust, direction);
            let parsed = NormalizedRow::try_from(&ExportRow::from(&original)).unwrap();
            prop_assert_eq!(parsed.timestamp, original.timestamp);
            prop_assert_eq!(parsed.wind_speed.is_some(), speed.is_some());
            prop_assert_eq!(parsed.wind_gust.is_some(), gust.is_some());
            prop_assert_eq!(parsed.wind_direction, direction);
        }
    }
}
