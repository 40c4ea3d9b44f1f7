//! Result aggregation.
//!
//! Merges the per-record checks and the VMC outcome for one domain into a
//! [`DomainReport`], and renders reports for the CLI.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use colored::*;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::error_handling::VerificationError;
use crate::retry::{PollOutcome, PollState};
use crate::validators::{BimiTags, CheckStatus, DomainRecordCheck, RecordType};

/// A record check, or the error that prevented it.
pub type RecordOutcome = Result<DomainRecordCheck, VerificationError>;

/// Everything known about one domain after a verification run.
#[derive(Debug)]
pub struct DomainReport {
    pub domain: String,
    pub records: BTreeMap<RecordType, RecordOutcome>,
    /// Tags of the BIMI record, when one was found
    pub bimi_tags: Option<BimiTags>,
    /// `None` when no validation service is configured
    pub vmc: Option<Result<PollOutcome, VerificationError>>,
    /// SPF, DKIM and DMARC all verified
    pub all_mandatory_passed: bool,
}

impl DomainReport {
    /// Builds a report and computes `all_mandatory_passed`.
    ///
    /// An errored mandatory record counts as not passed; MX, BIMI and VMC
    /// never affect the flag.
    pub fn new(
        domain: impl Into<String>,
        records: BTreeMap<RecordType, RecordOutcome>,
        bimi_tags: Option<BimiTags>,
        vmc: Option<Result<PollOutcome, VerificationError>>,
    ) -> Self {
        let all_mandatory_passed = RecordType::iter()
            .filter(|t| t.is_mandatory())
            .all(|t| matches!(records.get(&t), Some(Ok(check)) if check.verified));
        Self {
            domain: domain.into(),
            records,
            bimi_tags,
            vmc,
            all_mandatory_passed,
        }
    }

    /// True if any record type or the VMC check ended in an error.
    pub fn has_errors(&self) -> bool {
        self.records.values().any(Result::is_err) || matches!(self.vmc, Some(Err(_)))
    }
}

#[derive(Serialize)]
struct ErrorView {
    kind: &'static str,
    message: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutcomeView<'a, T: Serialize> {
    Ok(&'a T),
    Err { error: ErrorView },
}

impl<'a, T: Serialize> From<&'a Result<T, VerificationError>> for OutcomeView<'a, T> {
    fn from(outcome: &'a Result<T, VerificationError>) -> Self {
        match outcome {
            Ok(value) => OutcomeView::Ok(value),
            Err(e) => OutcomeView::Err {
                error: ErrorView {
                    kind: e.kind(),
                    message: e.to_string(),
                },
            },
        }
    }
}

impl Serialize for DomainReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let records: BTreeMap<RecordType, OutcomeView<'_, DomainRecordCheck>> = self
            .records
            .iter()
            .map(|(record_type, outcome)| (*record_type, OutcomeView::from(outcome)))
            .collect();

        let mut state = serializer.serialize_struct("DomainReport", 5)?;
        state.serialize_field("domain", &self.domain)?;
        state.serialize_field("all_mandatory_passed", &self.all_mandatory_passed)?;
        state.serialize_field("records", &records)?;
        state.serialize_field("bimi_tags", &self.bimi_tags)?;
        state.serialize_field("vmc", &self.vmc.as_ref().map(OutcomeView::from))?;
        state.end()
    }
}

/// Renders a report as a human-readable block.
pub fn render_plain(report: &DomainReport) -> String {
    let mut out = String::new();
    let verdict = if report.all_mandatory_passed {
        "mandatory records OK".green()
    } else {
        "mandatory records FAILING".red()
    };
    let _ = writeln!(out, "{} ({verdict})", report.domain.bold());

    for record_type in RecordType::iter() {
        let tier = if record_type.is_mandatory() {
            "required"
        } else {
            "optional"
        };
        match report.records.get(&record_type) {
            Some(Ok(check)) => {
                let mark = match check.status {
                    CheckStatus::Verified => "✔".green(),
                    CheckStatus::Fallback => "~".yellow(),
                    CheckStatus::Failed => "✘".red(),
                };
                let _ = write!(out, "  {mark} {record_type:<5} [{tier}]");
                if let Some(reason) = &check.reason {
                    let _ = write!(out, " {reason}");
                }
                out.push('\n');
            }
            Some(Err(e)) => {
                let _ = writeln!(out, "  {} {record_type:<5} [{tier}] {e}", "!".red());
            }
            None => {}
        }
    }

    match &report.vmc {
        Some(Ok(outcome)) => {
            let note = match outcome.state {
                PollState::Resolved => String::new(),
                PollState::Exhausted => " (still indeterminate after retries)".to_string(),
            };
            let _ = writeln!(
                out,
                "  VMC   [optional] {:?} after {} call(s){note}",
                outcome.result.status, outcome.attempts
            );
            for recommendation in &outcome.result.recommendations {
                let _ = writeln!(out, "        - {recommendation}");
            }
        }
        Some(Err(e)) => {
            let _ = writeln!(out, "  {} VMC   [optional] {e}", "!".red());
        }
        None => {}
    }
    out
}
