use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "wind-alarm", version, about = "Decide whether recent wind is worth getting up for.")]
pub struct Cli {
    /// Settings file (TOML); ./wind-alarm.toml is used when present
    #[arg(env = "WIND_ALARM_CONFIG", short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate every configured spot
    Run(RunArgs),
    /// Classify an exported CSV row file
    Classify {
        file: PathBuf,
        /// Exit with status 2 unless the rows are alarm-worthy
        #[arg(long)]
        fail_unless_alarm: bool,
    },
    /// Print the effective thresholds
    Thresholds,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Use the built-in mock scenarios instead of configured spots
    #[arg(long)]
    pub demo: bool,
    /// Override the trailing window length
    #[arg(long)]
    pub window_hours: Option<u64>,
    /// Exit with status 2 unless at least one spot is alarm-worthy
    #[arg(long)]
    pub fail_unless_alarm: bool,
}
