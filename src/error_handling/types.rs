//! Error type definitions.
//!
//! This module defines the error types used throughout the application.
//! Policy failures (a misconfigured record) are not errors: they are reported
//! as a `DomainRecordCheck` with `verified = false`.

use hickory_resolver::error::ResolveError;
use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error building the validator endpoint URL.
    #[error("Validator endpoint error: {0}")]
    EndpointError(#[from] url::ParseError),
}

/// Error types for configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A domain to verify is not a plausible hostname.
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    /// A configuration value failed validation.
    #[error("Invalid value for --{field}: {value:?}")]
    InvalidValue {
        /// CLI flag name
        field: &'static str,
        /// Rejected value
        value: String,
    },

    /// A validator URL was configured without an API key.
    #[error("--validator-url requires --validator-api-key (or VMC_VALIDATOR_API_KEY)")]
    MissingApiKey,
}

/// Errors that abort the verification of one record type.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum VerificationError {
    /// DNS lookup failed for a reason other than "no data".
    #[error("DNS {kind} lookup for {name} failed: {source}")]
    ResolutionError {
        /// Queried name
        name: String,
        /// Record kind (TXT, MX, CNAME)
        kind: &'static str,
        /// Underlying resolver error
        #[source]
        source: ResolveError,
    },

    /// The validation service answered with a non-2xx status.
    #[error("Validation service returned HTTP {status}")]
    ValidationServiceError {
        /// HTTP status code
        status: u16,
    },

    /// The validation service answered 2xx with a body that failed validation.
    #[error("Validation service response rejected: {0}")]
    SchemaViolationError(String),

    /// The request to the validation service did not complete.
    #[error("Validation service request failed: {0}")]
    TransportError(#[from] ReqwestError),

    /// The verification was cancelled while waiting to retry.
    #[error("Verification cancelled")]
    Cancelled,

    /// The verification exceeded its overall deadline.
    #[error("Verification timed out after {0}s")]
    TimedOut(u64),
}

impl VerificationError {
    /// Short machine-readable name used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationError::ResolutionError { .. } => "resolution_error",
            VerificationError::ValidationServiceError { .. } => "validation_service_error",
            VerificationError::SchemaViolationError(_) => "schema_violation_error",
            VerificationError::TransportError(_) => "transport_error",
            VerificationError::Cancelled => "cancelled",
            VerificationError::TimedOut(_) => "timed_out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_service_error_display() {
        let err = VerificationError::ValidationServiceError { status: 503 };
        assert_eq!(err.to_string(), "Validation service returned HTTP 503");
        assert_eq!(err.kind(), "validation_service_error");
    }

    #[test]
    fn test_schema_violation_display() {
        let err = VerificationError::SchemaViolationError("missing field `vmc`".into());
        assert!(err.to_string().contains("missing field `vmc`"));
        assert_eq!(err.kind(), "schema_violation_error");
    }

    #[test]
    fn test_resolution_error_names_query() {
        let err = VerificationError::ResolutionError {
            name: "_dmarc.example.com".into(),
            kind: "TXT",
            source: ResolveError::from("request timed out"),
        };
        let msg = err.to_string();
        assert!(msg.contains("TXT"));
        assert!(msg.contains("_dmarc.example.com"));
        assert_eq!(err.kind(), "resolution_error");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "mx-target",
            value: "nope".into(),
        };
        assert_eq!(err.to_string(), "Invalid value for --mx-target: \"nope\"");
        assert!(ConfigError::MissingApiKey
            .to_string()
            .contains("--validator-api-key"));
    }
}
