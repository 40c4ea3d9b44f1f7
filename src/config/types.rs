//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::config::constants::{
    DEFAULT_BIMI_SELECTOR, DEFAULT_MAX_CONCURRENCY, HTTP_TIMEOUT_SECS, MAX_RETRIES_CAP,
    MAX_RETRIES_CEILING, MAX_RETRY_DELAY_CEILING_SECS, MAX_RETRY_DELAY_SECS,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How verification reports are written to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One summary block per domain
    Plain,
    /// One JSON document per domain
    Json,
}

/// Application configuration.
///
/// Loaded once at startup (CLI flags with environment fallbacks), checked by
/// [`Config::validate`], then passed by reference into every component.
///
/// # Examples
///
/// ```no_run
/// use mail_auth_status::Config;
///
/// let config = Config {
///     domains: vec!["example.com".to_string()],
///     spf_include: "_spf.example-provider.com".to_string(),
///     mx_target: "mx.example-provider.com".to_string(),
///     dkim_selector: "s1".to_string(),
///     ..Default::default()
/// };
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mail_auth_status",
    version,
    about = "Verify SPF, DKIM, DMARC, MX, BIMI and VMC records for sending domains"
)]
pub struct Config {
    /// Domains to verify
    #[arg(required = true)]
    pub domains: Vec<String>,

    /// Domain that must appear as `include:<domain>` in the SPF record
    #[arg(long, env = "SPF_INCLUDE")]
    pub spf_include: String,

    /// Exchange that must be the primary (priority 0) MX host
    #[arg(long, env = "MX_TARGET")]
    pub mx_target: String,

    /// DKIM selector, checked as a CNAME at `<selector>._domainkey.<domain>`
    #[arg(long, env = "DKIM_SELECTOR")]
    pub dkim_selector: String,

    /// BIMI selector, checked at `<selector>._bimi.<domain>`
    #[arg(long, default_value = DEFAULT_BIMI_SELECTOR)]
    pub bimi_selector: String,

    /// Base URL of the VMC validation service (VMC check skipped when unset)
    #[arg(long, env = "VMC_VALIDATOR_URL")]
    pub validator_url: Option<Url>,

    /// API key sent to the VMC validation service
    #[arg(long, env = "VMC_VALIDATOR_API_KEY", hide_env_values = true)]
    pub validator_api_key: Option<String>,

    /// Per-request timeout for the validation service in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Upper bound on the validator's suggested retry count
    #[arg(long, default_value_t = MAX_RETRIES_CAP)]
    pub max_retries_cap: u32,

    /// Upper bound on the validator's suggested retry delay in seconds
    #[arg(long, default_value_t = MAX_RETRY_DELAY_SECS)]
    pub max_retry_delay_secs: u64,

    /// Maximum number of domains verified concurrently
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Abort a single domain's verification after this many seconds
    #[arg(long)]
    pub verification_timeout_secs: Option<u64>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            spf_include: String::new(),
            mx_target: String::new(),
            dkim_selector: String::new(),
            bimi_selector: DEFAULT_BIMI_SELECTOR.to_string(),
            validator_url: None,
            validator_api_key: None,
            timeout_seconds: HTTP_TIMEOUT_SECS,
            max_retries_cap: MAX_RETRIES_CAP,
            max_retry_delay_secs: MAX_RETRY_DELAY_SECS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            verification_timeout_secs: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            output: OutputFormat::Plain,
        }
    }
}

impl Config {
    /// Checks the configuration once at startup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for domain in &self.domains {
            if !is_plausible_hostname(domain) {
                return Err(ConfigError::InvalidDomain(domain.clone()));
            }
        }
        for (field, value) in [
            ("spf-include", &self.spf_include),
            ("mx-target", &self.mx_target),
        ] {
            if !is_plausible_hostname(value) {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: value.clone(),
                });
            }
        }
        for (field, value) in [
            ("dkim-selector", &self.dkim_selector),
            ("bimi-selector", &self.bimi_selector),
        ] {
            if value.is_empty() || value.contains(char::is_whitespace) {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: value.clone(),
                });
            }
        }
        if let Some(url) = &self.validator_url {
            if url.scheme() != "https" && url.scheme() != "http" {
                return Err(ConfigError::InvalidValue {
                    field: "validator-url",
                    value: url.to_string(),
                });
            }
            if self.validator_api_key.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::MissingApiKey);
            }
        }
        if self.max_retries_cap > MAX_RETRIES_CEILING {
            return Err(ConfigError::InvalidValue {
                field: "max-retries-cap",
                value: self.max_retries_cap.to_string(),
            });
        }
        if self.max_retry_delay_secs > MAX_RETRY_DELAY_CEILING_SECS {
            return Err(ConfigError::InvalidValue {
                field: "max-retry-delay-secs",
                value: self.max_retry_delay_secs.to_string(),
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max-concurrency",
                value: "0".to_string(),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout-seconds",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// The overall per-domain deadline, if one was configured.
    pub fn verification_timeout(&self) -> Option<Duration> {
        self.verification_timeout_secs.map(Duration::from_secs)
    }
}

/// Loose hostname check: dot-separated labels of letters, digits, `-` and `_`.
///
/// Underscores are allowed because SPF include targets such as
/// `_spf.example.com` are common.
pub fn is_plausible_hostname(name: &str) -> bool {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > 253 || !name.contains('.') {
        return false;
    }
    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}
