//! Domain verification pipeline.
//!
//! For one domain: issue the DNS lookups and the VMC validation concurrently,
//! run each record through its validator, poll the validation service while
//! its answer is pending, and aggregate everything into a [`DomainReport`].

use std::collections::BTreeMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, DEFAULT_MAX_CONCURRENCY};
use crate::dns::{bimi_name, dkim_name, dmarc_name, DnsLookup};
use crate::error_handling::VerificationError;
use crate::report::{DomainReport, RecordOutcome};
use crate::retry::{poll_until_settled, RetryPolicy};
use crate::validators::{
    check_bimi, check_cname_presence, check_dmarc, check_mx, check_spf, parse_bimi, RecordType,
};
use crate::vmc::VmcValidator;

/// Expected values the record validators compare against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectations {
    /// Required `include:` target in SPF
    pub spf_include: String,
    /// Required priority-0 MX exchange
    pub mx_target: String,
    pub dkim_selector: String,
    pub bimi_selector: String,
}

impl Expectations {
    pub fn from_config(config: &Config) -> Self {
        Self {
            spf_include: config.spf_include.clone(),
            mx_target: config.mx_target.clone(),
            dkim_selector: config.dkim_selector.clone(),
            bimi_selector: config.bimi_selector.clone(),
        }
    }
}

/// Verifies domains against one resolver, an optional validation service,
/// and a fixed set of expectations.
///
/// Holds no per-domain state; one `Verifier` can check many domains
/// concurrently.
pub struct Verifier<R, V> {
    resolver: R,
    validator: Option<V>,
    expectations: Expectations,
    policy: RetryPolicy,
    timeout: Option<Duration>,
    max_concurrency: usize,
}

impl<R: DnsLookup, V: VmcValidator> Verifier<R, V> {
    /// Builds a verifier from validated configuration.
    pub fn new(resolver: R, validator: Option<V>, config: &Config) -> Self {
        Self {
            resolver,
            validator,
            expectations: Expectations::from_config(config),
            policy: RetryPolicy::from_config(config),
            timeout: config.verification_timeout(),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    pub fn with_parts(
        resolver: R,
        validator: Option<V>,
        expectations: Expectations,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            resolver,
            validator,
            expectations,
            policy,
            timeout: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Bounds each verification by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Caps how many domains [`Verifier::verify_all`] checks at once.
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Verifies `domains`, at most `max_concurrency` at a time.
    ///
    /// Results come back in input order.
    pub async fn verify_all(
        &self,
        domains: &[String],
        cancel: &CancellationToken,
    ) -> Vec<Result<DomainReport, VerificationError>> {
        stream::iter(domains)
            .map(|domain| self.verify(domain, cancel))
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    /// Verifies one domain.
    ///
    /// Per-record errors are recorded in the report rather than returned.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::TimedOut` if a timeout is configured and
    /// the whole verification does not finish within it.
    pub async fn verify(
        &self,
        domain: &str,
        cancel: &CancellationToken,
    ) -> Result<DomainReport, VerificationError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.verify_unbounded(domain, cancel))
                .await
                .map_err(|_| {
                    log::warn!("Verification of {domain} timed out after {limit:?}");
                    VerificationError::TimedOut(limit.as_secs())
                }),
            None => Ok(self.verify_unbounded(domain, cancel).await),
        }
    }

    async fn verify_unbounded(&self, domain: &str, cancel: &CancellationToken) -> DomainReport {
        let expect = &self.expectations;
        let dmarc = dmarc_name(domain);
        let dkim = dkim_name(&expect.dkim_selector, domain);
        let bimi = bimi_name(&expect.bimi_selector, domain);

        log::debug!("Verifying {domain}");
        let (apex_txt, dmarc_txt, mx, bimi_txt, dkim_cname, vmc) = tokio::join!(
            self.resolver.lookup_txt(domain),
            self.resolver.lookup_txt(&dmarc),
            self.resolver.lookup_mx(domain),
            self.resolver.lookup_txt(&bimi),
            self.resolver.lookup_cname(&dkim),
            self.validate_vmc(domain, cancel),
        );

        let bimi_tags = bimi_txt.as_ref().ok().and_then(|values| parse_bimi(values));

        let mut records: BTreeMap<RecordType, RecordOutcome> = BTreeMap::new();
        records.insert(
            RecordType::Spf,
            apex_txt.map(|values| check_spf(&values, &expect.spf_include)),
        );
        records.insert(
            RecordType::Dkim,
            dkim_cname.map(|targets| check_cname_presence(&targets)),
        );
        records.insert(
            RecordType::Dmarc,
            dmarc_txt.map(|values| check_dmarc(&values)),
        );
        records.insert(
            RecordType::Mx,
            mx.map(|entries| check_mx(&entries, &expect.mx_target)),
        );
        records.insert(
            RecordType::Bimi,
            bimi_txt.map(|values| check_bimi(&values)),
        );

        let report = DomainReport::new(domain, records, bimi_tags, vmc);
        log::info!(
            "{domain}: mandatory records {}",
            if report.all_mandatory_passed {
                "passed"
            } else {
                "failing"
            }
        );
        report
    }

    async fn validate_vmc(
        &self,
        domain: &str,
        cancel: &CancellationToken,
    ) -> Option<Result<crate::retry::PollOutcome, VerificationError>> {
        let validator = self.validator.as_ref()?;
        Some(poll_until_settled(validator, domain, &self.policy, cancel).await)
    }
}

#[cfg(test)]
mod tests;
