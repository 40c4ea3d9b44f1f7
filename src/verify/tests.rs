use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use hickory_resolver::error::ResolveError;

use super::*;
use crate::dns::MxRecord;
use crate::retry::PollState;
use crate::validators::CheckStatus;
use crate::vmc::{
    BimiSnapshot, DnsSnapshot, RetrySuggestion, SvgSnapshot, VmcStatus, VmcValidationResult,
};

/// In-memory zone. Names listed in `failing` answer with a resolver error.
#[derive(Default)]
struct StaticDns {
    txt: HashMap<String, Vec<String>>,
    mx: HashMap<String, Vec<MxRecord>>,
    cname: HashMap<String, Vec<String>>,
    failing: Vec<String>,
}

impl StaticDns {
    fn txt(mut self, name: &str, value: &str) -> Self {
        self.txt
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    fn mx(mut self, name: &str, exchange: &str, priority: u16) -> Self {
        self.mx.entry(name.to_string()).or_default().push(MxRecord {
            exchange: exchange.to_string(),
            priority,
        });
        self
    }

    fn cname(mut self, name: &str, target: &str) -> Self {
        self.cname
            .entry(name.to_string())
            .or_default()
            .push(target.to_string());
        self
    }

    fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    fn answer<T: Clone>(
        &self,
        table: &HashMap<String, Vec<T>>,
        name: &str,
        kind: &'static str,
    ) -> Result<Vec<T>, VerificationError> {
        if self.failing.iter().any(|n| n == name) {
            return Err(VerificationError::ResolutionError {
                name: name.to_string(),
                kind,
                source: ResolveError::from("SERVFAIL"),
            });
        }
        Ok(table.get(name).cloned().unwrap_or_default())
    }
}

impl DnsLookup for StaticDns {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, VerificationError> {
        self.answer(&self.txt, name, "TXT")
    }

    async fn lookup_mx(&self, name: &str) -> Result<Vec<MxRecord>, VerificationError> {
        self.answer(&self.mx, name, "MX")
    }

    async fn lookup_cname(&self, name: &str) -> Result<Vec<String>, VerificationError> {
        self.answer(&self.cname, name, "CNAME")
    }
}

/// Answers every call with the same result.
struct FixedValidator {
    result: VmcValidationResult,
    calls: AtomicU32,
}

impl FixedValidator {
    fn new(result: VmcValidationResult) -> Self {
        Self {
            result,
            calls: AtomicU32::new(0),
        }
    }
}

impl VmcValidator for FixedValidator {
    async fn validate(&self, _domain: &str) -> Result<VmcValidationResult, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

/// Always slower than any test deadline.
struct StalledValidator;

impl VmcValidator for StalledValidator {
    async fn validate(&self, _domain: &str) -> Result<VmcValidationResult, VerificationError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(VerificationError::Cancelled)
    }
}

/// Records how many validations overlap.
#[derive(Default)]
struct GaugedValidator {
    in_flight: AtomicU32,
    peak: AtomicU32,
}

impl VmcValidator for GaugedValidator {
    async fn validate(&self, domain: &str) -> Result<VmcValidationResult, VerificationError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(1)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(VmcValidationResult {
            domain: domain.to_string(),
            ..vmc_result(VmcStatus::Pass, Some(true))
        })
    }
}

fn vmc_result(status: VmcStatus, revocation_ok: Option<bool>) -> VmcValidationResult {
    VmcValidationResult {
        domain: "example.com".into(),
        status,
        vmc_exists: true,
        vmc_authentic: true,
        chain_ok: true,
        valid_now: true,
        revocation_ok,
        retry_suggestion: None,
        message: None,
        dns: DnsSnapshot::default(),
        bimi: BimiSnapshot::default(),
        svg: SvgSnapshot::default(),
        recommendations: Vec::new(),
    }
}

fn expectations() -> Expectations {
    Expectations {
        spf_include: "_spf.example-provider.com".into(),
        mx_target: "mx.example-provider.com".into(),
        dkim_selector: "s1".into(),
        bimi_selector: "default".into(),
    }
}

fn healthy_zone() -> StaticDns {
    StaticDns::default()
        .txt(
            "example.com",
            "v=spf1 include:_spf.example-provider.com -all",
        )
        .txt("example.com", "google-site-verification=abc")
        .txt("_dmarc.example.com", "v=DMARC1; p=reject; rua=mailto:d@example.com")
        .mx("example.com", "mx.example-provider.com", 0)
        .cname("s1._domainkey.example.com", "s1.dkim.example-provider.com")
        .txt(
            "default._bimi.example.com",
            "v=BIMI1; l=https://example.com/logo.svg; a=https://example.com/vmc.pem",
        )
}

fn verifier<V: VmcValidator>(dns: StaticDns, validator: Option<V>) -> Verifier<StaticDns, V> {
    Verifier::with_parts(dns, validator, expectations(), RetryPolicy::default())
}

#[tokio::test]
async fn test_healthy_domain_passes_everything() {
    let verifier = verifier(healthy_zone(), None::<FixedValidator>);

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.all_mandatory_passed);
    assert!(!report.has_errors());
    assert_eq!(report.records.len(), 5);
    for outcome in report.records.values() {
        assert!(outcome.as_ref().unwrap().verified);
    }
    let tags = report.bimi_tags.unwrap();
    assert_eq!(tags.logo_url.as_deref(), Some("https://example.com/logo.svg"));
    assert_eq!(
        tags.authority_url.as_deref(),
        Some("https://example.com/vmc.pem")
    );
    assert!(report.vmc.is_none());
}

#[tokio::test]
async fn test_spf_keeps_every_txt_value() {
    let verifier = verifier(healthy_zone(), None::<FixedValidator>);

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    let spf = report.records[&RecordType::Spf].as_ref().unwrap();
    assert!(spf.verified);
    assert_eq!(spf.raw_values.len(), 2);
}

#[tokio::test]
async fn test_missing_dmarc_fails_mandatory() {
    let mut zone = healthy_zone();
    zone.txt.remove("_dmarc.example.com");
    let verifier = verifier(zone, None::<FixedValidator>);

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    let dmarc = report.records[&RecordType::Dmarc].as_ref().unwrap();
    assert!(!dmarc.verified);
    assert_eq!(dmarc.reason.as_deref(), Some("no records found for DMARC"));
    assert!(!report.all_mandatory_passed);
}

#[tokio::test]
async fn test_fallback_mx_does_not_affect_mandatory() {
    let mut zone = healthy_zone();
    zone.mx.clear();
    let zone = zone
        .mx("example.com", "mx1.other.net", 0)
        .mx("example.com", "mx.example-provider.com", 10);
    let verifier = verifier(zone, None::<FixedValidator>);

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    let mx = report.records[&RecordType::Mx].as_ref().unwrap();
    assert_eq!(mx.status, CheckStatus::Fallback);
    assert!(report.all_mandatory_passed);
}

#[tokio::test]
async fn test_lookup_error_is_isolated_to_its_record() {
    let zone = healthy_zone().failing("s1._domainkey.example.com");
    let verifier = verifier(zone, None::<FixedValidator>);

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        report.records[&RecordType::Dkim],
        Err(VerificationError::ResolutionError { kind: "CNAME", .. })
    ));
    assert!(report.records[&RecordType::Spf].as_ref().unwrap().verified);
    assert!(report.records[&RecordType::Dmarc].as_ref().unwrap().verified);
    assert!(!report.all_mandatory_passed);
    assert!(report.has_errors());
}

#[tokio::test]
async fn test_custom_selectors_are_queried() {
    let zone = healthy_zone()
        .cname("k2._domainkey.example.com", "k2.dkim.example-provider.com")
        .txt("brand._bimi.example.com", "v=BIMI1; l=https://example.com/b.svg");
    let expectations = Expectations {
        dkim_selector: "k2".into(),
        bimi_selector: "brand".into(),
        ..expectations()
    };
    let verifier = Verifier::with_parts(
        zone,
        None::<FixedValidator>,
        expectations,
        RetryPolicy::default(),
    );

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    let dkim = report.records[&RecordType::Dkim].as_ref().unwrap();
    assert_eq!(dkim.raw_values, vec!["k2.dkim.example-provider.com"]);
    assert_eq!(
        report.bimi_tags.unwrap().logo_url.as_deref(),
        Some("https://example.com/b.svg")
    );
}

#[tokio::test]
async fn test_vmc_result_is_attached() {
    let validator = FixedValidator::new(vmc_result(VmcStatus::Pass, Some(true)));
    let verifier = verifier(healthy_zone(), Some(validator));

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    let outcome = report.vmc.unwrap().unwrap();
    assert_eq!(outcome.state, PollState::Resolved);
    assert_eq!(outcome.result.status, VmcStatus::Pass);
    assert_eq!(outcome.attempts, 1);
}

#[tokio::test]
async fn test_vmc_failure_does_not_affect_mandatory() {
    let validator = FixedValidator::new(vmc_result(VmcStatus::Fail, Some(false)));
    let verifier = verifier(healthy_zone(), Some(validator));

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.all_mandatory_passed);
    assert_eq!(report.vmc.unwrap().unwrap().result.status, VmcStatus::Fail);
}

#[tokio::test(start_paused = true)]
async fn test_pending_vmc_is_polled_to_exhaustion() {
    let pending = VmcValidationResult {
        retry_suggestion: Some(RetrySuggestion {
            retry_after_seconds: 5,
            max_retries: 2,
        }),
        ..vmc_result(VmcStatus::IndeterminateRevocation, None)
    };
    let verifier = verifier(healthy_zone(), Some(FixedValidator::new(pending)));

    let report = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap();

    let outcome = report.vmc.unwrap().unwrap();
    assert_eq!(outcome.state, PollState::Exhausted);
    assert_eq!(outcome.attempts, 3);
    let calls = verifier.validator.as_ref().unwrap().calls.load(Ordering::SeqCst);
    assert_eq!(calls, 3);
}

#[tokio::test(start_paused = true)]
async fn test_verification_timeout() {
    let verifier = verifier(healthy_zone(), Some(StalledValidator))
        .with_timeout(Duration::from_secs(30));

    let err = verifier
        .verify("example.com", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::TimedOut(30)));
}

#[tokio::test(start_paused = true)]
async fn test_verify_all_bounds_concurrency_and_keeps_order() {
    let domains: Vec<String> = (0..7).map(|i| format!("d{i}.example.com")).collect();
    let verifier =
        verifier(healthy_zone(), Some(GaugedValidator::default())).with_concurrency(2);

    let results = verifier
        .verify_all(&domains, &CancellationToken::new())
        .await;

    assert_eq!(results.len(), domains.len());
    for (domain, result) in domains.iter().zip(&results) {
        assert_eq!(&result.as_ref().unwrap().domain, domain);
    }
    let gauge = verifier.validator.as_ref().unwrap();
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 2);
}

#[test]
fn test_expectations_from_config() {
    let config = Config {
        domains: vec!["example.com".into()],
        spf_include: "_spf.example-provider.com".into(),
        mx_target: "mx.example-provider.com".into(),
        dkim_selector: "s1".into(),
        ..Default::default()
    };
    assert_eq!(Expectations::from_config(&config), expectations());
}
