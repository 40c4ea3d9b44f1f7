//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `mail_auth_status` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C cancellation
//! - User-facing output formatting
//!
//! Exit status is 0 when every domain passes its mandatory checks, 2 when any
//! domain fails them (or times out) and 1 on startup errors.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use mail_auth_status::initialization::init_logger_with;
use mail_auth_status::{render_plain, run_verification, Config, OutputFormat, RunReport};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows keeping VMC_VALIDATOR_API_KEY in .env without exporting it manually
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {e}");
        }
    }

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; cancelling pending VMC retries");
            on_signal.cancel();
        }
    });

    match run_verification(&config, cancel).await {
        Ok(report) => {
            print_report(&report, config.output)?;
            log::info!(
                "Verified {} domain{} in {:.1}s",
                config.domains.len(),
                if config.domains.len() == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            if !report.all_passed() {
                process::exit(2);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("mail_auth_status error: {:#}", e);
            process::exit(1);
        }
    }
}

fn print_report(report: &RunReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Plain => {
            for domain in &report.reports {
                println!("{}", render_plain(domain));
            }
            for failure in &report.failures {
                println!("{}: {}\n", failure.domain, failure.error);
            }
        }
        OutputFormat::Json => {
            for domain in &report.reports {
                let line = serde_json::to_string(domain).context("Failed to serialize report")?;
                println!("{line}");
            }
            for failure in &report.failures {
                let line = serde_json::json!({
                    "domain": failure.domain,
                    "error": {
                        "kind": failure.error.kind(),
                        "message": failure.error.to_string(),
                    },
                });
                println!("{line}");
            }
        }
    }
    Ok(())
}
