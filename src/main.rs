//! Review relay entrypoint for pull request workflows.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use review_relay::annotations::WorkflowAnnotations;
use review_relay::{RelayConfig, RelayError, RunReport, logging, run_from_config};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let result = run().await;
    let mut annotations = WorkflowAnnotations::new(io::stdout().lock());

    match result {
        Ok(report) => {
            if annotations.annotate(report.level, &report.summary).is_err() {
                return ExitCode::FAILURE;
            }
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(relay_error) => {
            error!(error = %relay_error, "review relay failed");
            if annotations.error(&relay_error.to_string()).is_err()
                && writeln!(io::stderr().lock(), "{relay_error}").is_err()
            {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunReport, RelayError> {
    let config = load_config()?;
    logging::init(config.debug_enabled());
    run_from_config(&config).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`RelayError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<RelayConfig, RelayError> {
    RelayConfig::load().map_err(|error| RelayError::Configuration {
        message: error.to_string(),
    })
}
