//! Spot Evaluation Pipeline
//!
//! fetch → normalize → persist (optional) → classify, once per spot.

use crate::settings::{OutputConfig, OutputFormat};
use chrono::{DateTime, Utc};
use classifier::{classify, ThresholdConfig, Verdict};
use normalizer::{NormalizeError, Normalizer};
use observation::NormalizedRow;
use serde::Serialize;
use std::sync::Arc;
use storage::{CsvSink, JsonSink, RowSink, StorageError};
use thiserror::Error;
use tracing::{error, info, warn};
use wind_source::{FetchError, ObservationSource};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Spot task failed: {0}")]
    Task(String),
}

/// Outcome of evaluating one spot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotReport {
    pub spot: String,
    /// Observations delivered by the source
    pub fetched: usize,
    /// Rows left inside the trailing window
    pub retained: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub verdict: Verdict,
}

impl SpotReport {
    /// Human-readable report
    pub fn summary(&self, thresholds: &ThresholdConfig) -> String {
        let span = match (self.first, self.last) {
            (Some(first), Some(last)) => format!(
                "{} .. {}",
                first.format("%Y-%m-%d %H:%M"),
                last.format("%Y-%m-%d %H:%M")
            ),
            _ => "no rows".to_string(),
        };
        format!(
            "== {} ==\nRows: {} of {} ({})\n{}",
            self.spot,
            self.retained,
            self.fetched,
            span,
            self.verdict.summary(thresholds)
        )
    }
}

/// Result for one spot, labelled with the spot name
#[derive(Debug)]
pub struct SpotOutcome {
    pub spot: String,
    pub result: Result<SpotReport, PipelineError>,
}

/// Classify rows that are already normalized, e.g. read back from an export.
/// Rows are put in timestamp order first.
pub fn classify_rows(
    spot: impl Into<String>,
    mut rows: Vec<NormalizedRow>,
    thresholds: &ThresholdConfig,
) -> SpotReport {
    let spot = spot.into();
    if rows.windows(2).any(|w| w[0].timestamp > w[1].timestamp) {
        warn!("{}: rows out of order, sorting by timestamp", spot);
        rows.sort_by_key(|row| row.timestamp);
    }

    SpotReport {
        fetched: rows.len(),
        retained: rows.len(),
        first: rows.first().map(|row| row.timestamp),
        last: rows.last().map(|row| row.timestamp),
        verdict: classify(&rows, thresholds),
        spot,
    }
}

/// Evaluate a single spot
pub fn evaluate(
    source: &dyn ObservationSource,
    normalizer: &Normalizer,
    thresholds: &ThresholdConfig,
    sink: Option<&mut dyn RowSink>,
) -> Result<SpotReport, PipelineError> {
    let observations = source.fetch()?;
    let rows = normalizer.normalize(&observations)?;

    if let Some(sink) = sink {
        let written = sink.write_rows(&rows)?;
        info!("{}: persisted {} rows", source.name(), written);
    }

    let verdict = classify(&rows, thresholds);
    info!(
        "{}: {} ({} of {} observations in window)",
        source.name(),
        verdict.status,
        rows.len(),
        observations.len()
    );

    Ok(SpotReport {
        spot: source.name().to_string(),
        fetched: observations.len(),
        retained: rows.len(),
        first: rows.first().map(|row| row.timestamp),
        last: rows.last().map(|row| row.timestamp),
        verdict,
    })
}

/// Open the per-spot file sink, creating the output directory if needed
pub fn open_sink(output: &OutputConfig, spot: &str) -> Result<Box<dyn RowSink>, StorageError> {
    std::fs::create_dir_all(&output.directory)?;
    let path = output.path_for(spot);
    let sink: Box<dyn RowSink> = match output.format {
        OutputFormat::Csv => Box::new(CsvSink::create(path)?),
        OutputFormat::Json => Box::new(JsonSink::create(path)?),
    };
    Ok(sink)
}

fn evaluate_spot(
    source: &dyn ObservationSource,
    normalizer: &Normalizer,
    thresholds: &ThresholdConfig,
    output: Option<&OutputConfig>,
) -> Result<SpotReport, PipelineError> {
    match output {
        Some(output) => {
            let mut sink = open_sink(output, source.name())?;
            let sink: &mut dyn RowSink = sink.as_mut();
            evaluate(source, normalizer, thresholds, Some(sink))
        }
        None => evaluate(source, normalizer, thresholds, None),
    }
}

/// Evaluate every spot concurrently, one blocking task per spot.
/// Outcomes come back in the order the sources were given.
pub async fn run_spots(
    sources: Vec<Box<dyn ObservationSource>>,
    normalizer: Normalizer,
    thresholds: ThresholdConfig,
    output: Option<OutputConfig>,
) -> Vec<SpotOutcome> {
    let normalizer = Arc::new(normalizer);
    let thresholds = Arc::new(thresholds);
    let output = Arc::new(output);

    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let spot = source.name().to_string();
            let normalizer = Arc::clone(&normalizer);
            let thresholds = Arc::clone(&thresholds);
            let output = Arc::clone(&output);
            let handle = tokio::task::spawn_blocking(move || {
                evaluate_spot(source.as_ref(), &normalizer, &thresholds, (*output).as_ref())
            });
            (spot, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (spot, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(PipelineError::Task(e.to_string())),
        };
        if let Err(e) = &result {
            error!("{}: {}", spot, e);
        }
        outcomes.push(SpotOutcome { spot, result });
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use classifier::Status;
    use normalizer::{NormalizerConfig, WindowAnchor};
    use storage::MemorySink;
    use wind_source::{FileSource, MockSource, Scenario};

    #[test]
    fn test_evaluate_good_conditions() {
        let source = MockSource::new(Scenario::GoodConditions);
        let mut sink = MemorySink::default();

        let report = evaluate(
            &source,
            &Normalizer::default(),
            &ThresholdConfig::default(),
            Some(&mut sink),
        )
        .unwrap();

        assert_eq!(report.spot, "mock:good");
        assert_eq!(report.fetched, 8);
        assert_eq!(report.retained, 8);
        assert_eq!(sink.len(), 8);
        assert_eq!(report.first, Some(Utc.with_ymd_and_hms(2025, 5, 17, 3, 0, 0).unwrap()));
        assert_eq!(report.last, Some(Utc.with_ymd_and_hms(2025, 5, 17, 4, 45, 0).unwrap()));
        assert_eq!(report.verdict.status, Status::AlarmWorthy);
    }

    #[test]
    fn test_evaluate_low_speed() {
        let report = evaluate(
            &MockSource::new(Scenario::LowSpeed),
            &Normalizer::default(),
            &ThresholdConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(report.verdict.status, Status::NotWorthy);
        assert!(!report.verdict.is_alarm_worthy);
    }

    #[test]
    fn test_window_past_all_samples_is_an_error() {
        let normalizer = Normalizer::new(NormalizerConfig {
            anchor: WindowAnchor::At(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
            ..NormalizerConfig::hours(1).unwrap()
        })
        .unwrap();

        let result = evaluate(
            &MockSource::new(Scenario::GoodConditions),
            &normalizer,
            &ThresholdConfig::default(),
            None,
        );
        assert!(matches!(
            result,
            Err(PipelineError::Normalize(NormalizeError::EmptyWindow { observations: 8, .. }))
        ));
    }

    #[test]
    fn test_missing_payload_is_fetch_error() {
        let source = FileSource::new("nowhere", "/definitely/not/a/payload.json");
        let result = evaluate(&source, &Normalizer::default(), &ThresholdConfig::default(), None);
        assert!(matches!(result, Err(PipelineError::Fetch(FetchError::Io { .. }))));
    }

    #[test]
    fn test_evaluate_spot_persists_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            directory: dir.path().join("spots"),
            format: OutputFormat::Csv,
        };

        let report = evaluate_spot(
            &MockSource::new(Scenario::GoodConditions),
            &Normalizer::default(),
            &ThresholdConfig::default(),
            Some(&output),
        )
        .unwrap();
        assert_eq!(report.retained, 8);

        let rows = storage::read_csv_file(output.path_for("mock:good")).unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].timestamp, report.first.unwrap());
    }

    #[test]
    fn test_classify_rows_sorts_first() {
        let mut sink = MemorySink::default();
        evaluate(
            &MockSource::new(Scenario::GoodConditions),
            &Normalizer::default(),
            &ThresholdConfig::default(),
            Some(&mut sink),
        )
        .unwrap();

        let mut rows = sink.rows();
        rows.reverse();
        let report = classify_rows("replay", rows, &ThresholdConfig::default());

        assert_eq!(report.retained, 8);
        assert!(report.first < report.last);
        assert_eq!(report.verdict.max_consecutive_streak, 8);
        assert_eq!(report.verdict.status, Status::AlarmWorthy);
    }

    #[test]
    fn test_report_summary_and_json() {
        let thresholds = ThresholdConfig::default();
        let report = evaluate(
            &MockSource::new(Scenario::GoodConditions),
            &Normalizer::default(),
            &thresholds,
            None,
        )
        .unwrap();

        let summary = report.summary(&thresholds);
        assert!(summary.starts_with("== mock:good ==\nRows: 8 of 8 (2025-05-17 03:00 .. 2025-05-17 04:45)"));
        assert!(summary.contains("Status: ALARM WORTHY"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["spot"], "mock:good");
        assert_eq!(json["retained"], 8);
        assert_eq!(json["verdict"]["status"], "ALARM_WORTHY");
    }

    #[tokio::test]
    async fn test_run_spots_keeps_order_and_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            directory: dir.path().join("rows"),
            format: OutputFormat::Csv,
        };
        let sources: Vec<Box<dyn ObservationSource>> = vec![
            Box::new(MockSource::new(Scenario::LowSpeed)),
            Box::new(FileSource::new("broken", dir.path().join("missing.json"))),
            Box::new(MockSource::new(Scenario::GoodConditions)),
        ];

        let outcomes = run_spots(
            sources,
            Normalizer::default(),
            ThresholdConfig::default(),
            Some(output.clone()),
        )
        .await;

        let spots: Vec<&str> = outcomes.iter().map(|o| o.spot.as_str()).collect();
        assert_eq!(spots, ["mock:low-speed", "broken", "mock:good"]);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(outcomes[1].result, Err(PipelineError::Fetch(_))));
        assert_eq!(
            outcomes[2].result.as_ref().unwrap().verdict.status,
            Status::AlarmWorthy
        );

        let text = std::fs::read_to_string(output.path_for("mock:good")).unwrap();
        assert!(text.starts_with("time,windSpeed,windGust,windDirection"));
        assert_eq!(text.lines().count(), 9);
        assert!(dir.path().join("rows/mock_low-speed.csv").exists());
    }

    #[tokio::test]
    async fn test_run_spots_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            directory: dir.path().to_path_buf(),
            format: OutputFormat::Json,
        };
        let sources: Vec<Box<dyn ObservationSource>> =
            vec![Box::new(MockSource::new(Scenario::InconsistentDirection))];

        let outcomes = run_spots(
            sources,
            Normalizer::default(),
            ThresholdConfig::default(),
            Some(output.clone()),
        )
        .await;
        assert!(outcomes[0].result.is_ok());

        let text = std::fs::read_to_string(output.path_for("mock:inconsistent-direction")).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 8);
    }
}
