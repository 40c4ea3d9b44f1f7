//! Configuration constants.
//!
//! This module defines the defaults used throughout the application,
//! including timeouts, retry caps and well-known DNS label prefixes.

// Network operation timeouts
/// DNS query timeout in seconds
/// Most DNS queries complete in <1s, 3s provides good buffer while failing fast
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// Number of attempts the resolver makes per query before giving up
pub const DNS_ATTEMPTS: usize = 2;
/// Per-request timeout for the VMC validator in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Default User-Agent string for validator requests.
pub const DEFAULT_USER_AGENT: &str = concat!("mail_auth_status/", env!("CARGO_PKG_VERSION"));

// Retry hint caps
/// Upper bound applied to the validator's `max_retries` hint
pub const MAX_RETRIES_CAP: u32 = 10;
/// Upper bound applied to the validator's `retry_after_seconds` hint
pub const MAX_RETRY_DELAY_SECS: u64 = 60;
/// Largest value accepted for `--max-retries-cap`
pub const MAX_RETRIES_CEILING: u32 = 100;
/// Largest value accepted for `--max-retry-delay-secs` (one hour)
pub const MAX_RETRY_DELAY_CEILING_SECS: u64 = 3600;

// Concurrency
/// Domains verified at the same time; each one issues five DNS queries
/// and at most one validator request at a time
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

// Selectors and labels
/// Default BIMI selector (`default._bimi.<domain>`)
pub const DEFAULT_BIMI_SELECTOR: &str = "default";
pub const DMARC_LABEL: &str = "_dmarc";
pub const BIMI_LABEL: &str = "_bimi";
pub const DKIM_LABEL: &str = "_domainkey";

// Validator API
/// Path of the validation endpoint, relative to the configured base URL
pub const VALIDATOR_PATH: &str = "validate";
/// Header carrying the validator API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Substrings (lowercase) that mark a validator message as a transient failure
pub const TRANSIENT_MESSAGE_PATTERNS: &[&str] = &["timeout", "network"];
