//! DMARC policy check.
//!
//! Only `p=reject` is accepted. `quarantine` and `none` are reported as
//! failures.

use super::tags::{parse_tags, tag_value};
use super::types::{DomainRecordCheck, RecordType};

/// Checks the TXT values published at `_dmarc.<domain>`.
pub fn check_dmarc(txt_values: &[String]) -> DomainRecordCheck {
    if txt_values.is_empty() {
        return DomainRecordCheck::no_records(RecordType::Dmarc);
    }

    let raw_values = txt_values.to_vec();
    let Some(record) = txt_values.iter().find(|v| is_dmarc_record(v)) else {
        return DomainRecordCheck::policy_failure(
            RecordType::Dmarc,
            raw_values,
            "no record starts with v=DMARC1",
        );
    };

    let tags = parse_tags(record);
    match tag_value(&tags, "p") {
        Some(policy) if policy.eq_ignore_ascii_case("reject") => {
            DomainRecordCheck::verified(RecordType::Dmarc, raw_values)
        }
        Some(policy) => DomainRecordCheck::policy_failure(
            RecordType::Dmarc,
            raw_values,
            &format!("DMARC policy is p={policy}; p=reject is required"),
        ),
        None => DomainRecordCheck::policy_failure(
            RecordType::Dmarc,
            raw_values,
            "DMARC record has no p= tag; p=reject is required",
        ),
    }
}

fn is_dmarc_record(txt: &str) -> bool {
    txt.trim()
        .get(..8)
        .is_some_and(|version| version.eq_ignore_ascii_case("v=DMARC1"))
}
