//! Wind Alarm - Main Entry Point

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use wind_alarm::{init_logging, run, Cli, Outcome};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    info!("=== Wind Alarm v{} ===", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            error!("{:#}", e);
            Outcome::Failed.exit_code()
        }
    }
}
