//! Record validators.
//!
//! One pure function per record type. Each takes the resolved values (and
//! the expected value where one applies) and returns a [`DomainRecordCheck`].
//! A failing check is ordinary data: nothing here returns an error.

mod bimi;
mod cname;
mod dmarc;
mod mx;
mod spf;
mod tags;
mod types;

// Re-export public API
pub use bimi::{check_bimi, parse_bimi, BimiTags};
pub use cname::check_cname_presence;
pub use dmarc::check_dmarc;
pub use mx::check_mx;
pub use spf::{check_spf, is_spf_record};
pub use types::{CheckStatus, DomainRecordCheck, RecordType};
