//! Validation of the validator service's response body.
//!
//! The body is untrusted input. It is deserialized into a private wire
//! struct, checked as a whole, and only then converted into a
//! [`VmcValidationResult`]. Nothing from a body that fails a check is ever
//! returned.

use serde::Deserialize;
use url::Url;

use super::types::{
    BimiSnapshot, DnsSnapshot, RetrySuggestion, SvgSnapshot, VmcStatus, VmcValidationResult,
};
use crate::error_handling::VerificationError;

/// Largest response body accepted from the validator (1MB)
pub const MAX_RESPONSE_BODY_SIZE: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
struct WireResponse {
    domain: String,
    status: VmcStatus,
    dns: DnsSnapshot,
    bimi: BimiSnapshot,
    svg: SvgSnapshot,
    vmc: WireVmc,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    retry_suggestion: Option<RetrySuggestion>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireVmc {
    exists: bool,
    authentic: bool,
    chain_ok: bool,
    valid_now: bool,
    #[serde(default)]
    revocation_ok: Option<bool>,
}

/// Parses and validates a 2xx response body for `requested_domain`.
///
/// # Errors
///
/// Returns `VerificationError::SchemaViolationError` if the body is not JSON,
/// does not match the schema, or fails a consistency check.
pub fn parse_response(
    requested_domain: &str,
    body: &[u8],
) -> Result<VmcValidationResult, VerificationError> {
    if body.len() > MAX_RESPONSE_BODY_SIZE {
        return Err(violation(format!(
            "body is {} bytes, limit is {MAX_RESPONSE_BODY_SIZE}",
            body.len()
        )));
    }

    let wire: WireResponse =
        serde_json::from_slice(body).map_err(|e| violation(e.to_string()))?;
    check(requested_domain, &wire)?;

    Ok(VmcValidationResult {
        domain: wire.domain,
        status: wire.status,
        vmc_exists: wire.vmc.exists,
        vmc_authentic: wire.vmc.authentic,
        chain_ok: wire.vmc.chain_ok,
        valid_now: wire.vmc.valid_now,
        revocation_ok: wire.vmc.revocation_ok,
        retry_suggestion: wire.retry_suggestion,
        message: wire.message,
        dns: wire.dns,
        bimi: wire.bimi,
        svg: wire.svg,
        recommendations: wire.recommendations,
    })
}

fn check(requested_domain: &str, wire: &WireResponse) -> Result<(), VerificationError> {
    if !same_domain(&wire.domain, requested_domain) {
        return Err(violation(format!(
            "response is for {:?}, requested {requested_domain:?}",
            wire.domain
        )));
    }

    for (field, value) in [
        ("bimi.logo_url", &wire.bimi.logo_url),
        ("bimi.authority_url", &wire.bimi.authority_url),
    ] {
        if let Some(value) = value {
            match Url::parse(value) {
                Ok(url) if url.scheme() == "https" => {}
                Ok(_) => return Err(violation(format!("{field} is not https: {value}"))),
                Err(e) => return Err(violation(format!("{field} is not a URL ({e}): {value}"))),
            }
        }
    }

    if let Some(hint) = wire.retry_suggestion {
        if hint.retry_after_seconds == 0 && hint.max_retries == 0 {
            return Err(violation(
                "retry_suggestion with zero delay and zero retries".to_string(),
            ));
        }
    }

    Ok(())
}

fn same_domain(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

fn violation(detail: String) -> VerificationError {
    VerificationError::SchemaViolationError(detail)
}
