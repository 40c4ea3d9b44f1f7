//! BIMI record check.

use serde::Serialize;

use super::tags::{parse_tags, tag_value};
use super::types::{DomainRecordCheck, RecordType};

/// Tags extracted from a BIMI record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BimiTags {
    /// `l=` logo location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// `a=` authority evidence (VMC) location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority_url: Option<String>,
}

/// Parses the first `v=BIMI1` record among `txt_values`.
///
/// Empty `l=` or `a=` values are treated as absent.
pub fn parse_bimi(txt_values: &[String]) -> Option<BimiTags> {
    txt_values.iter().find_map(|record| {
        let tags = parse_tags(record);
        let version = tags.first().filter(|(tag, _)| tag == "v")?;
        if !version.1.eq_ignore_ascii_case("BIMI1") {
            return None;
        }
        let non_empty = |tag: &str| {
            tag_value(&tags, tag)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Some(BimiTags {
            logo_url: non_empty("l"),
            authority_url: non_empty("a"),
        })
    })
}

/// Checks the TXT values published at `<selector>._bimi.<domain>`.
///
/// A record passes with `v=BIMI1` and a non-empty `l=`; `a=` is not
/// required here.
pub fn check_bimi(txt_values: &[String]) -> DomainRecordCheck {
    if txt_values.is_empty() {
        return DomainRecordCheck::no_records(RecordType::Bimi);
    }

    let raw_values = txt_values.to_vec();
    match parse_bimi(txt_values) {
        Some(BimiTags {
            logo_url: Some(_), ..
        }) => DomainRecordCheck::verified(RecordType::Bimi, raw_values),
        Some(_) => DomainRecordCheck::policy_failure(
            RecordType::Bimi,
            raw_values,
            "BIMI record has no logo URL (l=)",
        ),
        None => DomainRecordCheck::policy_failure(
            RecordType::Bimi,
            raw_values,
            "no record starts with v=BIMI1;",
        ),
    }
}
