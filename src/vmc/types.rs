//! VMC validation result types.
//!
//! Every type here is produced only by [`super::schema::parse_response`],
//! after the whole response body has passed validation.

use serde::{Deserialize, Serialize};

/// Overall verdict of the validation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VmcStatus {
    /// BIMI record, logo and VMC all check out
    Pass,
    /// BIMI record and logo are fine but no VMC is published
    PassWithoutVmc,
    /// Revocation status of the VMC could not be determined
    IndeterminateRevocation,
    Fail,
    /// Some checks passed, others failed
    Partial,
}

/// Server-supplied hint telling the caller when and how often to poll again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySuggestion {
    pub retry_after_seconds: u64,
    pub max_retries: u32,
}

/// DNS records as seen by the validation service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsSnapshot {
    #[serde(default)]
    pub bimi_record: Option<String>,
    #[serde(default)]
    pub dmarc_record: Option<String>,
    #[serde(default)]
    pub dmarc_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BimiSnapshot {
    pub found: bool,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub authority_url: Option<String>,
}

/// Result of fetching and checking the SVG logo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvgSnapshot {
    pub fetched: bool,
    #[serde(default)]
    pub tiny_ps: Option<bool>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// The service's assessment of a domain's BIMI/VMC chain.
///
/// `revocation_ok == None` means revocation could not be determined; a retry
/// may resolve it. A result with no `retry_suggestion` is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmcValidationResult {
    /// Domain the service validated
    pub domain: String,
    pub status: VmcStatus,
    /// A VMC was found at the BIMI `a=` location
    pub vmc_exists: bool,
    /// The VMC signature and mark verified
    pub vmc_authentic: bool,
    /// The VMC chains to a trusted root
    pub chain_ok: bool,
    /// The VMC is within its validity period
    pub valid_now: bool,
    /// `None` when revocation could not be determined
    pub revocation_ok: Option<bool>,
    /// When and how often to ask again; absent means the result is final
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_suggestion: Option<RetrySuggestion>,
    /// Free-form detail from the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub dns: DnsSnapshot,
    pub bimi: BimiSnapshot,
    pub svg: SvgSnapshot,
    /// Suggested fixes, in the service's order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

impl VmcValidationResult {
    /// True when the message reports a transient failure (`timeout`/`network`).
    pub fn has_transient_message(&self) -> bool {
        self.message.as_deref().is_some_and(|message| {
            let message = message.to_lowercase();
            crate::config::TRANSIENT_MESSAGE_PATTERNS
                .iter()
                .any(|pattern| message.contains(pattern))
        })
    }

    /// True while the result is one a later poll may change: the revocation
    /// check was indeterminate or the service hit a transient failure.
    pub fn is_pending(&self) -> bool {
        self.status == VmcStatus::IndeterminateRevocation || self.has_transient_message()
    }
}
