//! Integration tests for the VMC validation client.
//!
//! These tests run the real `reqwest` client against an `httptest` mock
//! server. They do not make external network requests.

use std::sync::Arc;
use std::time::Duration;

use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;

use mail_auth_status::retry::{poll_until_settled, PollState, RetryPolicy};
use mail_auth_status::vmc::VmcStatus;
use mail_auth_status::{VerificationError, VmcClient, VmcValidator};

fn client_for(server: &Server) -> VmcClient {
    let base = Url::parse(&server.url_str("/")).expect("mock server URL should parse");
    VmcClient::new(Arc::new(reqwest::Client::new()), &base, "secret")
        .expect("endpoint should derive from mock URL")
}

fn response(status: &str, revocation_ok: serde_json::Value) -> serde_json::Value {
    json!({
        "domain": "example.com",
        "status": status,
        "dns": { "bimi_record": "v=BIMI1; l=https://example.com/logo.svg" },
        "bimi": { "found": true, "logo_url": "https://example.com/logo.svg" },
        "svg": { "fetched": true, "tiny_ps": true },
        "vmc": {
            "exists": true,
            "authentic": true,
            "chain_ok": true,
            "valid_now": true,
            "revocation_ok": revocation_ok
        },
        "recommendations": []
    })
}

fn pending(retry_after_seconds: u64, max_retries: u32) -> serde_json::Value {
    let mut value = response("indeterminate_revocation", serde_json::Value::Null);
    value["retry_suggestion"] = json!({
        "retry_after_seconds": retry_after_seconds,
        "max_retries": max_retries
    });
    value
}

#[tokio::test]
async fn test_sends_domain_and_api_key() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/validate"),
            request::query(url_decoded(contains(("domain", "example.com")))),
            request::headers(contains(("x-api-key", "secret"))),
        ])
        .respond_with(json_encoded(response("pass", json!(true)))),
    );

    let result = client_for(&server)
        .validate("example.com")
        .await
        .expect("valid response should parse");

    assert_eq!(result.status, VmcStatus::Pass);
    assert_eq!(result.revocation_ok, Some(true));
    assert_eq!(
        result.bimi.logo_url.as_deref(),
        Some("https://example.com/logo.svg")
    );
}

#[tokio::test]
async fn test_service_unavailable_is_not_retried() {
    let server = Server::run();
    // Exactly one request: a 503 must surface without any retry
    server.expect(
        Expectation::matching(request::method_path("GET", "/validate"))
            .times(1)
            .respond_with(status_code(503).body("maintenance")),
    );
    let client = client_for(&server);

    let err = poll_until_settled(
        &client,
        "example.com",
        &RetryPolicy::default(),
        &CancellationToken::new(),
    )
    .await
    .expect_err("503 should be an error");

    assert!(matches!(
        err,
        VerificationError::ValidationServiceError { status: 503 }
    ));
}

#[tokio::test]
async fn test_malformed_body_is_schema_violation() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/validate"))
            .respond_with(status_code(200).body("{\"domain\": \"example.com\", \"status\": ")),
    );

    let err = client_for(&server)
        .validate("example.com")
        .await
        .expect_err("truncated JSON should be rejected");

    assert!(matches!(err, VerificationError::SchemaViolationError(_)));
}

#[tokio::test]
async fn test_response_for_other_domain_is_schema_violation() {
    let server = Server::run();
    let mut body = response("pass", json!(true));
    body["domain"] = json!("attacker.example");
    server.expect(
        Expectation::matching(request::method_path("GET", "/validate"))
            .respond_with(json_encoded(body)),
    );

    let err = client_for(&server)
        .validate("example.com")
        .await
        .expect_err("mismatched domain should be rejected");

    assert!(matches!(err, VerificationError::SchemaViolationError(ref m) if m.contains("attacker")));
}

#[tokio::test]
async fn test_pending_then_settled_over_http() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/validate"))
            .times(2)
            .respond_with(cycle![
                json_encoded(pending(1, 3)),
                json_encoded(response("pass", json!(true))),
            ]),
    );
    let client = client_for(&server);

    let outcome = poll_until_settled(
        &client,
        "example.com",
        &RetryPolicy::default(),
        &CancellationToken::new(),
    )
    .await
    .expect("polling should settle");

    assert_eq!(outcome.state, PollState::Resolved);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.result.status, VmcStatus::Pass);
}

#[tokio::test]
async fn test_hint_delay_is_clamped_over_http() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/validate"))
            .times(2)
            .respond_with(json_encoded(pending(3600, 1))),
    );
    let client = client_for(&server);
    let policy = RetryPolicy {
        max_retries: 10,
        max_delay: Duration::from_millis(50),
    };

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        poll_until_settled(&client, "example.com", &policy, &CancellationToken::new()),
    )
    .await
    .expect("clamped delay should finish quickly")
    .expect("polling should not error");

    assert_eq!(outcome.state, PollState::Exhausted);
    assert_eq!(outcome.attempts, 2);
}
