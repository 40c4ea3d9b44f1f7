//! Validation result types.

use serde::Serialize;
use strum_macros::{Display, EnumIter};

/// DNS record types checked for a sending domain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RecordType {
    Spf,
    Dkim,
    Dmarc,
    Mx,
    Bimi,
}

impl RecordType {
    /// SPF, DKIM and DMARC must all pass; MX and BIMI are optional.
    pub fn is_mandatory(self) -> bool {
        matches!(self, RecordType::Spf | RecordType::Dkim | RecordType::Dmarc)
    }
}

/// Outcome of one record check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// The record satisfies policy.
    Verified,
    /// The record is usable but not in the preferred role (MX at non-zero priority).
    Fallback,
    /// No records, or records that do not satisfy policy.
    Failed,
}

/// Validation outcome for one DNS record type.
///
/// `reason` is set exactly when `verified` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainRecordCheck {
    /// Record type this check covers
    pub record_type: RecordType,
    /// True only for `CheckStatus::Verified`
    pub verified: bool,
    pub status: CheckStatus,
    /// Why the check did not pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Values as published (MX entries as `"<priority> <exchange>"`)
    pub raw_values: Vec<String>,
}

impl DomainRecordCheck {
    pub fn verified(record_type: RecordType, raw_values: Vec<String>) -> Self {
        Self {
            record_type,
            verified: true,
            status: CheckStatus::Verified,
            reason: None,
            raw_values,
        }
    }

    pub fn fallback(record_type: RecordType, raw_values: Vec<String>, reason: String) -> Self {
        Self {
            record_type,
            verified: false,
            status: CheckStatus::Fallback,
            reason: Some(reason),
            raw_values,
        }
    }

    /// Nothing was published at the queried name.
    pub fn no_records(record_type: RecordType) -> Self {
        Self {
            record_type,
            verified: false,
            status: CheckStatus::Failed,
            reason: Some(format!("no records found for {record_type}")),
            raw_values: Vec::new(),
        }
    }

    /// Records exist but none satisfies the rule described by `detail`.
    pub fn policy_failure(record_type: RecordType, raw_values: Vec<String>, detail: &str) -> Self {
        Self {
            record_type,
            verified: false,
            status: CheckStatus::Failed,
            reason: Some(format!(
                "records found but do not satisfy policy: {detail}"
            )),
            raw_values,
        }
    }
}
