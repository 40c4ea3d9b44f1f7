//! External VMC/BIMI validation.
//!
//! This module provides:
//! - The result types returned by the validation service
//! - Strict parsing and validation of the service's JSON response
//! - The `reqwest` client that calls the service
//!
//! Deeper checks (certificate chain, revocation, SVG profile) happen on the
//! service side; this crate only consumes the verdict.

mod client;
mod schema;
mod types;

// Re-export public API
pub use client::{VmcClient, VmcValidator};
pub use schema::{parse_response, MAX_RESPONSE_BODY_SIZE};
pub use types::{
    BimiSnapshot, DnsSnapshot, RetrySuggestion, SvgSnapshot, VmcStatus, VmcValidationResult,
};
