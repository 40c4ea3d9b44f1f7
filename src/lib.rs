//! mail_auth_status library: email-authentication posture checks
//!
//! This library verifies that sending domains publish the DNS records a mail
//! provider expects (SPF include, DKIM CNAME, DMARC `p=reject`, primary MX and
//! BIMI), and optionally asks an external validation service whether the
//! domain's Verified Mark Certificate is valid, following that service's
//! retry hints while revocation status is still indeterminate.
//!
//! # Example
//!
//! ```no_run
//! use mail_auth_status::{run_verification, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     domains: vec!["example.com".to_string()],
//!     spf_include: "_spf.example-provider.com".to_string(),
//!     mx_target: "mx.example-provider.com".to_string(),
//!     dkim_selector: "s1".to_string(),
//!     ..Default::default()
//! };
//!
//! let report = run_verification(&config, CancellationToken::new()).await?;
//! for domain in &report.reports {
//!     println!("{}: {}", domain.domain, domain.all_mandatory_passed);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod dns;
pub mod error_handling;
pub mod initialization;
pub mod report;
pub mod retry;
pub mod validators;
pub mod verify;
pub mod vmc;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, OutputFormat};
pub use error_handling::{ConfigError, InitializationError, VerificationError};
pub use report::{render_plain, DomainReport};
pub use run::{run_verification, DomainFailure, RunReport};
pub use verify::{Expectations, Verifier};
pub use vmc::{VmcClient, VmcValidator};

// Internal run module (wires configuration into a verifier and checks every domain)
mod run {
    use anyhow::{Context, Result};
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::config::Config;
    use crate::error_handling::VerificationError;
    use crate::initialization::{init_client, init_resolver};
    use crate::report::DomainReport;
    use crate::verify::Verifier;
    use crate::vmc::VmcClient;

    /// A domain whose verification did not produce a report.
    #[derive(Debug)]
    pub struct DomainFailure {
        /// Domain as given on the command line
        pub domain: String,
        /// Why no report was produced
        pub error: VerificationError,
    }

    /// Results of one verification run, in input order.
    #[derive(Debug)]
    pub struct RunReport {
        /// Completed reports
        pub reports: Vec<DomainReport>,
        /// Domains whose verification timed out
        pub failures: Vec<DomainFailure>,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    impl RunReport {
        /// True if every domain produced a report with all mandatory records verified.
        pub fn all_passed(&self) -> bool {
            self.failures.is_empty() && self.reports.iter().all(|r| r.all_mandatory_passed)
        }
    }

    /// Verifies every domain in `config`, up to `max_concurrency` at a time.
    ///
    /// The VMC check runs only when `validator_url` is set. Cancelling
    /// `cancel` interrupts pending retry waits; the affected reports carry
    /// `VerificationError::Cancelled` as their VMC outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client or
    /// validator endpoint cannot be initialized. Per-domain problems never
    /// fail the run.
    pub async fn run_verification(config: &Config, cancel: CancellationToken) -> Result<RunReport> {
        config.validate().context("Invalid configuration")?;

        let resolver = init_resolver();
        let validator = match &config.validator_url {
            Some(url) => {
                let client = init_client(config).context("Failed to initialize HTTP client")?;
                let api_key = config.validator_api_key.clone().unwrap_or_default();
                let vmc = VmcClient::new(client, url, api_key)
                    .context("Failed to derive validator endpoint")?;
                info!("VMC validation enabled via {}", vmc.endpoint());
                Some(vmc)
            }
            None => {
                info!("No validator URL configured; skipping VMC validation");
                None
            }
        };
        let verifier = Verifier::new(resolver, validator, config);

        let start_time = std::time::Instant::now();
        info!(
            "Verifying {} domain(s), {} at a time",
            config.domains.len(),
            config.max_concurrency
        );
        let outcomes = verifier.verify_all(&config.domains, &cancel).await;

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (domain, outcome) in config.domains.iter().zip(outcomes) {
            match outcome {
                Ok(report) => reports.push(report),
                Err(error) => failures.push(DomainFailure {
                    domain: domain.clone(),
                    error,
                }),
            }
        }

        Ok(RunReport {
            reports,
            failures,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }
}
