//! DNS resolution and record querying.
//!
//! This module provides async DNS operations using `hickory-resolver`:
//! - Text record queries (TXT) for SPF, DMARC and BIMI
//! - Mail exchanger queries (MX)
//! - Alias queries (CNAME) for DKIM presence
//!
//! All operations are async and go through the [`DnsLookup`] trait so the
//! verification pipeline can run against any resolver.

mod records;

// Re-export public API
pub use records::{
    lookup_cname_records, lookup_mx_records, lookup_txt_records, DnsLookup, MxRecord,
};

/// `_dmarc.<domain>`
pub fn dmarc_name(domain: &str) -> String {
    format!("{}.{domain}", crate::config::DMARC_LABEL)
}

/// `<selector>._bimi.<domain>`
pub fn bimi_name(selector: &str, domain: &str) -> String {
    format!("{selector}.{}.{domain}", crate::config::BIMI_LABEL)
}

/// `<selector>._domainkey.<domain>`
pub fn dkim_name(selector: &str, domain: &str) -> String {
    format!("{selector}.{}.{domain}", crate::config::DKIM_LABEL)
}
