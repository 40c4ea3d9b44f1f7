//! MX target check.

use super::types::{DomainRecordCheck, RecordType};
use crate::dns::MxRecord;

/// Checks that `target` is the primary (priority 0) mail exchanger.
///
/// The target at a non-zero priority yields a `Fallback` result: mail is
/// delivered there only when preferred hosts are unavailable.
pub fn check_mx(records: &[MxRecord], target: &str) -> DomainRecordCheck {
    if records.is_empty() {
        return DomainRecordCheck::no_records(RecordType::Mx);
    }

    let target = target.trim_end_matches('.');
    let raw_values: Vec<String> = records
        .iter()
        .map(|mx| format!("{} {}", mx.priority, mx.exchange))
        .collect();

    let best = records
        .iter()
        .filter(|mx| mx.exchange.trim_end_matches('.').eq_ignore_ascii_case(target))
        .map(|mx| mx.priority)
        .min();

    match best {
        Some(0) => DomainRecordCheck::verified(RecordType::Mx, raw_values),
        Some(priority) => DomainRecordCheck::fallback(
            RecordType::Mx,
            raw_values,
            format!(
                "{target} is published at priority {priority}; it will be used as fallback, not primary"
            ),
        ),
        None => DomainRecordCheck::policy_failure(
            RecordType::Mx,
            raw_values,
            &format!("no MX record points to {target}"),
        ),
    }
}
