//! Wind Alarm
//!
//! Wires sources, normalization, storage and classification together and
//! decides the process outcome.

pub mod cli;
pub mod pipeline;
pub mod settings;

pub use cli::{Cli, Command, RunArgs};
pub use pipeline::{classify_rows, evaluate, open_sink, run_spots, PipelineError, SpotOutcome, SpotReport};
pub use settings::{AppConfig, OutputConfig, OutputFormat, SettingsError, SpotConfig};

use anyhow::Context;
use classifier::ThresholdConfig;
use normalizer::{Normalizer, NormalizerConfig};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wind_source::{FileSource, MockSource, ObservationSource, Scenario};

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every spot was evaluated
    Success,
    /// At least one spot could not be evaluated
    Failed,
    /// Evaluated, but nothing alarm-worthy under `--fail-unless-alarm`
    NoAlarm,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::from(1),
            Outcome::NoAlarm => ExitCode::from(2),
        }
    }
}

/// Initialize logging to stderr. `RUST_LOG` overrides the default `info` level.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = AppConfig::load(cli.config.as_deref()).context("loading settings")?;

    match cli.cmd {
        Command::Thresholds => {
            println!("{}", serde_json::to_string_pretty(&config.thresholds)?);
            Ok(Outcome::Success)
        }
        Command::Classify { file, fail_unless_alarm } => {
            classify_file(&file, &config.thresholds, cli.json, fail_unless_alarm)
        }
        Command::Run(args) => run_configured(config, args, cli.json).await,
    }
}

fn classify_file(
    file: &Path,
    thresholds: &ThresholdConfig,
    json: bool,
    fail_unless_alarm: bool,
) -> anyhow::Result<Outcome> {
    let rows = storage::read_csv_file(file)
        .with_context(|| format!("reading rows from {}", file.display()))?;
    let report = classify_rows(file.display().to_string(), rows, thresholds);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary(thresholds));
    }

    if fail_unless_alarm && !report.verdict.is_alarm_worthy {
        return Ok(Outcome::NoAlarm);
    }
    Ok(Outcome::Success)
}

async fn run_configured(config: AppConfig, args: RunArgs, json: bool) -> anyhow::Result<Outcome> {
    let window_hours = args.window_hours.unwrap_or(config.window_hours);
    let normalizer = NormalizerConfig::hours(window_hours)
        .and_then(Normalizer::new)
        .with_context(|| format!("window of {} hours", window_hours))?;

    let sources: Vec<Box<dyn ObservationSource>> = if args.demo {
        Scenario::all()
            .into_iter()
            .map(|scenario| Box::new(MockSource::new(scenario)) as Box<dyn ObservationSource>)
            .collect()
    } else {
        config
            .spots
            .iter()
            .map(|spot| {
                Box::new(FileSource::new(spot.name.clone(), spot.payload.clone()))
                    as Box<dyn ObservationSource>
            })
            .collect()
    };
    if sources.is_empty() {
        anyhow::bail!("no spots configured; add [[spots]] to the settings or pass --demo");
    }

    info!("Evaluating {} spots over a {}h window", sources.len(), window_hours);
    let outcomes = run_spots(sources, normalizer, config.thresholds.clone(), config.output.clone()).await;

    let reports: Vec<&SpotReport> = outcomes.iter().filter_map(|o| o.result.as_ref().ok()).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}\n", report.summary(&config.thresholds));
        }
    }

    let failed = outcomes.len() - reports.len();
    if failed > 0 {
        error!("{} of {} spots failed", failed, outcomes.len());
        return Ok(Outcome::Failed);
    }
    if args.fail_unless_alarm && !reports.iter().any(|r| r.verdict.is_alarm_worthy) {
        warn!("No spot is alarm-worthy");
        return Ok(Outcome::NoAlarm);
    }
    Ok(Outcome::Success)
}
