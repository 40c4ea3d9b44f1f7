//! SPF include check.

use super::types::{DomainRecordCheck, RecordType};

const SPF_VERSION: &str = "v=spf1";
const INCLUDE: &str = "include:";

/// Returns true if a TXT value is an SPF record.
///
/// The version tag must be followed by whitespace or end the record, so
/// `v=spf10` is not mistaken for SPF.
pub fn is_spf_record(txt: &str) -> bool {
    let txt = txt.trim();
    txt.get(..SPF_VERSION.len())
        .is_some_and(|version| version.eq_ignore_ascii_case(SPF_VERSION))
        && txt[SPF_VERSION.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
}

/// Checks that the domain's SPF record authorizes `include_domain`.
///
/// `txt_values` are all TXT records at the domain apex. Exactly one of them
/// may be an SPF record and it must carry an `include:<include_domain>` term
/// (any qualifier).
pub fn check_spf(txt_values: &[String], include_domain: &str) -> DomainRecordCheck {
    if txt_values.is_empty() {
        return DomainRecordCheck::no_records(RecordType::Spf);
    }

    let spf_records: Vec<&String> = txt_values.iter().filter(|v| is_spf_record(v)).collect();
    let raw_values = txt_values.to_vec();

    match spf_records.as_slice() {
        [] => DomainRecordCheck::policy_failure(
            RecordType::Spf,
            raw_values,
            &format!("no v=spf1 record; expected one with include:{include_domain}"),
        ),
        [record] if has_include(record, include_domain) => {
            DomainRecordCheck::verified(RecordType::Spf, raw_values)
        }
        [_] => DomainRecordCheck::policy_failure(
            RecordType::Spf,
            raw_values,
            &format!("SPF record is missing include:{include_domain}"),
        ),
        _ => DomainRecordCheck::policy_failure(
            RecordType::Spf,
            raw_values,
            &format!(
                "{} v=spf1 records published; exactly one is allowed",
                spf_records.len()
            ),
        ),
    }
}

fn has_include(record: &str, include_domain: &str) -> bool {
    let wanted = include_domain.trim_end_matches('.');
    record.split_whitespace().skip(1).any(|term| {
        let term = term.trim_start_matches(['+', '-', '~', '?']);
        term.get(..INCLUDE.len())
            .is_some_and(|mechanism| mechanism.eq_ignore_ascii_case(INCLUDE))
            && term[INCLUDE.len()..]
                .trim_end_matches('.')
                .eq_ignore_ascii_case(wanted)
    })
}
