//! End-to-end decisions through the real pipeline: settings, resolver,
//! siteverify client (against a mock server), policy engine, and audit.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use tracing_test::traced_test;

use captcha_authz_audit::{InMemoryAuditWriter, TracingAuditWriter, AUDIT_TARGET};
use captcha_authz_contracts::{
    decision::{AuthDecision, DenyReason, Effect},
    error::{AuthzError, AuthzResult},
    request::AuthorizerRequest,
    secret::SecretSource,
};
use captcha_authz_core::{
    traits::{ParameterStore, SecretStore},
    Authorizer,
};
use captcha_authz_lambda::{
    authorize_event, build_authorizer, build_resolver, AuthorizerSettings, BackingStores,
};
use captcha_authz_policy::PolicyConfig;
use captcha_authz_secrets::SecretResolver;

const METHOD_ARN: &str = "arn:aws:execute-api:us-east-1:1234567890:abcdefghij/prod/GET/test";
const VERIFY_PATH: &str = "/recaptcha/api/siteverify";
const SECRET_ARN: &str = "arn:aws:secretsmanager:us-east-1:1234567890:secret:test-secret";

// ── Fakes ─────────────────────────────────────────────────────────────────────

/// Counts reads; answers with a fixed value.
struct CountingStore {
    reads: AtomicUsize,
    value: String,
}

impl CountingStore {
    fn new(value: &str) -> Arc<Self> {
        Arc::new(Self { reads: AtomicUsize::new(0), value: value.to_string() })
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParameterStore for CountingStore {
    async fn get_parameter(&self, name: &str) -> AuthzResult<String> {
        assert_eq!(name, "k");
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

#[async_trait]
impl SecretStore for CountingStore {
    async fn get_secret_string(&self, secret_id: &str) -> AuthzResult<String> {
        assert_eq!(secret_id, SECRET_ARN);
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.value.clone())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Harness {
    authorizer: Authorizer,
    resolver: Arc<SecretResolver>,
    audit: InMemoryAuditWriter,
}

fn settings(server: &ServerGuard, secret: SecretSource) -> AuthorizerSettings {
    AuthorizerSettings {
        secret,
        policy: PolicyConfig::new(0.5, ["submit"]).unwrap(),
        verify_url: format!("{}{}", server.url(), VERIFY_PATH),
        token_header: "X-reCAPTCHA-Token".to_string(),
    }
}

fn harness(settings: &AuthorizerSettings, stores: BackingStores) -> Harness {
    let resolver = Arc::new(build_resolver(settings, stores));
    let audit = InMemoryAuditWriter::new();
    let authorizer = build_authorizer(settings, resolver.clone(), Box::new(audit.clone()));
    Harness { authorizer, resolver, audit }
}

/// Like `harness`, but decisions also go to the structured log.
fn logged_harness(settings: &AuthorizerSettings) -> Harness {
    let resolver = Arc::new(build_resolver(settings, BackingStores::default()));
    let audit = InMemoryAuditWriter::tee(Arc::new(TracingAuditWriter::new()));
    let authorizer = build_authorizer(settings, resolver.clone(), Box::new(audit.clone()));
    Harness { authorizer, resolver, audit }
}

fn decision_lines(lines: &[&str]) -> usize {
    lines.iter().filter(|line| line.contains(AUDIT_TARGET)).count()
}

fn plain_text() -> SecretSource {
    SecretSource::PlainText { value: "test-secret-key".to_string() }
}

fn event(token: Option<&str>) -> AuthorizerRequest {
    let headers = match token {
        Some(token) => json!({ "x-recaptcha-token": token }),
        None => json!({ "accept": "application/json" }),
    };
    serde_json::from_value(json!({
        "type": "REQUEST",
        "methodArn": METHOD_ARN,
        "headers": headers,
        "requestContext": { "identity": { "sourceIp": "1.2.3.4" } }
    }))
    .unwrap()
}

async fn siteverify(server: &mut ServerGuard, body: serde_json::Value, hits: usize) -> Mock {
    server
        .mock("POST", VERIFY_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("secret".into(), "test-secret-key".into()),
            Matcher::UrlEncoded("response".into(), "tok".into()),
            Matcher::UrlEncoded("remoteip".into(), "1.2.3.4".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(hits)
        .create_async()
        .await
}

fn verdict(score: f64, action: &str) -> serde_json::Value {
    json!({
        "success": true,
        "score": score,
        "action": action,
        "challenge_ts": "2026-10-19T10:00:00Z",
        "hostname": "example.com"
    })
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

/// Scenario A: good score, allowed action → Allow for the request's resource.
#[tokio::test]
async fn scenario_a_allows_human_with_allowed_action() {
    let mut server = mockito::Server::new_async().await;
    let mock = siteverify(&mut server, verdict(0.9, "submit"), 1).await;
    let h = harness(&settings(&server, plain_text()), BackingStores::default());

    let decision = authorize_event(&h.authorizer, &event(Some("tok")), Some("req-a")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(decision, AuthDecision::allow(METHOD_ARN));
    assert_eq!(
        serde_json::to_value(&decision).unwrap(),
        json!({
            "principalId": "user",
            "policyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Action": "execute-api:Invoke",
                    "Effect": "Allow",
                    "Resource": METHOD_ARN
                }]
            }
        })
    );

    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].effect, Effect::Allow);
    assert_eq!(records[0].hostname.as_deref(), Some("example.com"));
}

/// Scenario B: low score → Deny(ScoreBelowThreshold).
#[tokio::test]
async fn scenario_b_denies_low_score() {
    let mut server = mockito::Server::new_async().await;
    let mock = siteverify(&mut server, verdict(0.1, "submit"), 1).await;
    let h = harness(&settings(&server, plain_text()), BackingStores::default());

    let decision = authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(decision, AuthDecision::deny(METHOD_ARN));
    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason, Some(DenyReason::ScoreBelowThreshold));
    assert_eq!(records[0].score, Some(0.1));
}

/// Scenario C: unlisted action → Deny(ActionNotAllowed).
#[tokio::test]
async fn scenario_c_denies_unlisted_action() {
    let mut server = mockito::Server::new_async().await;
    let mock = siteverify(&mut server, verdict(0.9, "blocked"), 1).await;
    let h = harness(&settings(&server, plain_text()), BackingStores::default());

    let decision = authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(decision, AuthDecision::deny(METHOD_ARN));
    assert_eq!(h.audit.records()[0].reason, Some(DenyReason::ActionNotAllowed));
    assert_eq!(h.audit.records()[0].action.as_deref(), Some("blocked"));
}

/// Scenario D: no token header → Deny(MissingToken), no upstream call.
#[tokio::test]
async fn scenario_d_denies_missing_token_without_upstream_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let store = CountingStore::new("test-secret-key");
    let h = harness(
        &settings(&server, SecretSource::ParameterStore { name: "k".to_string() }),
        BackingStores { parameters: Some(store.clone()), secrets: None },
    );

    let decision = authorize_event(&h.authorizer, &event(None), None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(decision, AuthDecision::deny(METHOD_ARN));
    assert_eq!(store.reads(), 0, "secret must not be fetched without a token");
    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason, Some(DenyReason::MissingToken));
}

/// Scenario E: parameter-store secret, two requests → one store read.
#[tokio::test]
async fn scenario_e_parameter_store_read_once_across_requests() {
    let mut server = mockito::Server::new_async().await;
    let mock = siteverify(&mut server, verdict(0.9, "submit"), 2).await;
    let store = CountingStore::new("test-secret-key");
    let h = harness(
        &settings(&server, SecretSource::ParameterStore { name: "k".to_string() }),
        BackingStores { parameters: Some(store.clone()), secrets: None },
    );

    authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();
    authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(store.reads(), 1);
    assert_eq!(h.audit.len(), 2);

    // Rotation: after a reset the next request reads exactly once more.
    mock.remove_async().await;
    h.resolver.reset();
    let mock = siteverify(&mut server, verdict(0.9, "submit"), 1).await;
    authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();
    mock.assert_async().await;
    assert_eq!(store.reads(), 2);
}

// ── Further properties ────────────────────────────────────────────────────────

#[tokio::test]
async fn rejected_token_denies_regardless_of_score() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "success": false,
        "score": 0.9,
        "action": "submit",
        "hostname": "example.com",
        "error-codes": ["timeout-or-duplicate"]
    });
    let _mock = siteverify(&mut server, body, 1).await;
    let h = harness(&settings(&server, plain_text()), BackingStores::default());

    let decision = authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();

    assert_eq!(decision.effect, Effect::Deny);
    assert_eq!(h.audit.records()[0].reason, Some(DenyReason::VerificationFailed));
}

#[tokio::test]
async fn secrets_manager_field_is_extracted_and_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = siteverify(&mut server, verdict(0.9, "submit"), 2).await;
    let store =
        CountingStore::new(r#"{"otherField":"other value","testField":"test-secret-key"}"#);
    let h = harness(
        &settings(
            &server,
            SecretSource::SecretStore {
                secret_id: SECRET_ARN.to_string(),
                field: Some("testField".to_string()),
            },
        ),
        BackingStores { parameters: None, secrets: Some(store.clone()) },
    );

    for _ in 0..2 {
        let decision = authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();
        assert_eq!(decision.effect, Effect::Allow);
    }

    // The mock only matches secret=test-secret-key, so the field was used.
    mock.assert_async().await;
    assert_eq!(store.reads(), 1);
}

#[tokio::test]
async fn upstream_failure_is_an_error_not_a_deny() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", VERIFY_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let h = harness(&settings(&server, plain_text()), BackingStores::default());

    let err = authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap_err();

    assert!(matches!(err, AuthzError::UpstreamError { .. }));
    assert!(h.audit.is_empty(), "failed requests must not produce a decision record");
}

#[tokio::test]
async fn missing_store_wiring_is_a_config_error() {
    let server = mockito::Server::new_async().await;
    let h = harness(
        &settings(&server, SecretSource::ParameterStore { name: "k".to_string() }),
        BackingStores::default(),
    );

    let err = authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap_err();
    assert!(matches!(err, AuthzError::ConfigError { .. }));
}

#[tokio::test]
async fn decision_is_scoped_to_each_requests_resource() {
    let mut server = mockito::Server::new_async().await;
    let _mock = siteverify(&mut server, verdict(0.9, "submit"), 2).await;
    let h = harness(&settings(&server, plain_text()), BackingStores::default());

    let other_arn = "arn:aws:execute-api:us-east-1:1234567890:abcdefghij/prod/POST/other";
    let mut other = event(Some("tok"));
    other.method_arn = other_arn.to_string();

    let first = authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();
    let second = authorize_event(&h.authorizer, &other, None).await.unwrap();

    assert_eq!(first.resource_arn, METHOD_ARN);
    assert_eq!(second.resource_arn, other_arn);
}

// ── Decision log ──────────────────────────────────────────────────────────────

#[tokio::test]
#[traced_test]
async fn one_decision_line_per_request() {
    let mut server = mockito::Server::new_async().await;
    let _mock = siteverify(&mut server, verdict(0.1, "submit"), 1).await;
    let h = logged_harness(&settings(&server, plain_text()));

    authorize_event(&h.authorizer, &event(None), None).await.unwrap();
    logs_assert(|lines: &[&str]| match decision_lines(lines) {
        1 => Ok(()),
        n => Err(format!("missing token: expected 1 decision line, got {n}")),
    });

    authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap();
    logs_assert(|lines: &[&str]| match decision_lines(lines) {
        2 => Ok(()),
        n => Err(format!("after second request: expected 2 decision lines, got {n}")),
    });

    assert!(logs_contain("MissingToken"));
    assert!(logs_contain("ScoreBelowThreshold"));
    assert!(logs_contain("score=0.1"));
    assert!(logs_contain("source_ip=1.2.3.4"));
    assert_eq!(h.audit.len(), 2);
}

#[tokio::test]
#[traced_test]
async fn failed_request_writes_no_decision_line() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", VERIFY_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let h = logged_harness(&settings(&server, plain_text()));

    authorize_event(&h.authorizer, &event(Some("tok")), None).await.unwrap_err();

    logs_assert(|lines: &[&str]| match decision_lines(lines) {
        0 => Ok(()),
        n => Err(format!("expected no decision line, got {n}")),
    });
    assert!(logs_contain("authorizer failed"));
}
