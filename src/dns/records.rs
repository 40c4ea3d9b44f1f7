//! DNS record queries (TXT, MX, CNAME).
//!
//! "No data" and NXDOMAIN answers are normalized to an empty vector. Every
//! other resolver failure (timeouts, SERVFAIL, malformed responses) is
//! propagated as [`VerificationError::ResolutionError`]; nothing is retried
//! at this layer.

use std::future::Future;

use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;

use crate::error_handling::VerificationError;

/// One resolved MX entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MxRecord {
    /// Mail exchanger hostname, without the trailing root dot
    pub exchange: String,
    /// MX preference (lower is preferred)
    pub priority: u16,
}

/// Source of TXT, MX and CNAME answers.
///
/// Implemented for hickory's `TokioAsyncResolver`; tests substitute an
/// in-memory table.
pub trait DnsLookup: Send + Sync {
    /// TXT values at `name`, one string per record with its character-strings joined.
    fn lookup_txt(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<String>, VerificationError>> + Send;

    /// MX entries at `name`, sorted by priority.
    fn lookup_mx(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<MxRecord>, VerificationError>> + Send;

    /// CNAME targets at `name`.
    fn lookup_cname(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<String>, VerificationError>> + Send;
}

impl DnsLookup for TokioAsyncResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, VerificationError> {
        lookup_txt_records(name, self).await
    }

    async fn lookup_mx(&self, name: &str) -> Result<Vec<MxRecord>, VerificationError> {
        lookup_mx_records(name, self).await
    }

    async fn lookup_cname(&self, name: &str) -> Result<Vec<String>, VerificationError> {
        lookup_cname_records(name, self).await
    }
}

/// Queries TXT (text) records for a name.
///
/// A TXT record may be split into several character-strings on the wire;
/// they are joined so validators always see the whole record.
pub async fn lookup_txt_records(
    name: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<String>, VerificationError> {
    match resolver.lookup(name, RecordType::TXT).await {
        Ok(lookup) => Ok(lookup
            .iter()
            .filter_map(|rdata| {
                if let RData::TXT(txt) = rdata {
                    Some(join_txt_segments(txt.iter().map(|bytes| &bytes[..])))
                } else {
                    None
                }
            })
            .collect()),
        Err(e) => empty_if_no_data(name, "TXT", e),
    }
}

/// Queries MX (mail exchanger) records for a name.
///
/// Returns entries sorted by priority (lower = higher priority).
pub async fn lookup_mx_records(
    name: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<MxRecord>, VerificationError> {
    match resolver.lookup(name, RecordType::MX).await {
        Ok(lookup) => {
            let mut mx_records: Vec<MxRecord> = lookup
                .iter()
                .filter_map(|rdata| {
                    if let RData::MX(mx) = rdata {
                        Some(MxRecord {
                            exchange: strip_root(mx.exchange().to_utf8()),
                            priority: mx.preference(),
                        })
                    } else {
                        None
                    }
                })
                .collect();
            mx_records.sort_by_key(|mx| mx.priority);
            Ok(mx_records)
        }
        Err(e) => empty_if_no_data(name, "MX", e),
    }
}

/// Queries CNAME records for a name.
pub async fn lookup_cname_records(
    name: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<String>, VerificationError> {
    match resolver.lookup(name, RecordType::CNAME).await {
        Ok(lookup) => Ok(lookup
            .iter()
            .filter_map(|rdata| {
                if let RData::CNAME(cname) = rdata {
                    Some(strip_root(cname.0.to_utf8()))
                } else {
                    None
                }
            })
            .collect()),
        Err(e) => empty_if_no_data(name, "CNAME", e),
    }
}

/// Maps "no records found" (including NXDOMAIN) to an empty answer and
/// everything else to a `ResolutionError`.
pub(crate) fn empty_if_no_data<T>(
    name: &str,
    kind: &'static str,
    e: ResolveError,
) -> Result<Vec<T>, VerificationError> {
    if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) {
        log::debug!("No {kind} records at {name}");
        return Ok(Vec::new());
    }
    if matches!(e.kind(), ResolveErrorKind::Timeout) {
        log::warn!("{kind} record lookup timed out for {name}: {e}");
    } else {
        log::warn!("Failed to lookup {kind} records for {name}: {e}");
    }
    Err(resolution_error(name, kind, e))
}

fn resolution_error(name: &str, kind: &'static str, source: ResolveError) -> VerificationError {
    VerificationError::ResolutionError {
        name: name.to_string(),
        kind,
        source,
    }
}

pub(crate) fn join_txt_segments<'a>(segments: impl Iterator<Item = &'a [u8]>) -> String {
    segments.map(String::from_utf8_lossy).collect()
}

pub(crate) fn strip_root(name: String) -> String {
    match name.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}
