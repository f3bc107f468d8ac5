mod cli;
mod logging;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser as _;
use log::{error, info};

use drover_core::{UpdateError, UpdateOutcome, Updater};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Exit status for the install-succeeded-but-persist-failed state, so
/// wrapping scripts can tell the inconsistent outcome from a clean failure.
const EXIT_MARKER_STALE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Args::parse();
    logging::init(args.verbose);

    let config = args.into_config();

    if let Err(error) = config.paths.ensure_dirs() {
        error!(
            "failed to create installation directory {}: {error}",
            config.paths.install_dir.display()
        );
        return ExitCode::FAILURE;
    }

    let client = match build_client() {
        Ok(client) => client,
        Err(error) => {
            error!("failed to build HTTP client: {error}");
            return ExitCode::FAILURE;
        }
    };

    match Updater::with_http(&client, config).run().await {
        Ok(outcome) => {
            report(&outcome);
            ExitCode::SUCCESS
        }
        Err(error) => {
            report_failure(&error);
            ExitCode::from(failure_exit_code(&error))
        }
    }
}

fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("drover/", env!("CARGO_PKG_VERSION")))
        .build()
}

fn report(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::Bootstrapped { latest } => {
            info!("first run: recorded driver version {latest}, nothing downloaded");
        }
        UpdateOutcome::UpToDate { current, .. } => {
            info!("driver {current} is up to date");
        }
        UpdateOutcome::Updated { previous, latest } => {
            info!("driver updated {previous} -> {latest}");
        }
    }
}

fn report_failure(error: &UpdateError) {
    match error {
        UpdateError::Install { source, .. } => {
            error!("download new version failed: {source}");
        }
        UpdateError::PersistAfterInstall { installed, source } => {
            error!("write new version in the file failed: {source}");
            error!(
                "driver {installed} is installed but the version marker still records the \
                 previous release; the next run will download {installed} again"
            );
        }
        other => {
            error!("driver update failed: {other}");
        }
    }
}

fn failure_exit_code(error: &UpdateError) -> u8 {
    match error {
        UpdateError::PersistAfterInstall { .. } => EXIT_MARKER_STALE,
        _ => 1,
    }
}
