//! DKIM presence check.
//!
//! The DKIM key is delegated to the sending provider with a CNAME at
//! `<selector>._domainkey.<domain>`. Only the presence of that alias is
//! checked, not the public key behind it.

use super::types::{DomainRecordCheck, RecordType};

/// Passes iff at least one CNAME target resolved.
pub fn check_cname_presence(targets: &[String]) -> DomainRecordCheck {
    if targets.is_empty() {
        DomainRecordCheck::no_records(RecordType::Dkim)
    } else {
        DomainRecordCheck::verified(RecordType::Dkim, targets.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_cname_passes() {
        let check = check_cname_presence(&["s1.dkim.example-provider.com".to_string()]);
        assert!(check.verified);
        assert_eq!(check.record_type, RecordType::Dkim);
        assert_eq!(check.raw_values, vec!["s1.dkim.example-provider.com"]);
    }

    #[test]
    fn test_missing_cname_fails() {
        let check = check_cname_presence(&[]);
        assert!(!check.verified);
        assert!(check.reason.unwrap().contains("no records found"));
    }
}
