//! Offline decision scenarios.
//!
//! Each scenario wires the real policy engine, secret resolver, and audit
//! writer around a scripted verification client, so no network access or
//! cloud credentials are needed.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::json;

use captcha_authz_audit::{InMemoryAuditWriter, TracingAuditWriter};
use captcha_authz_contracts::{
    decision::{DenyReason, Effect},
    error::{AuthzError, AuthzResult},
    request::AuthorizerRequest,
    secret::SecretSource,
    verification::{VerificationRequest, VerificationResult},
};
use captcha_authz_core::{
    traits::{ParameterStore, VerificationClient},
    Authorizer,
};
use captcha_authz_policy::{PolicyConfig, ScorePolicyEngine};
use captcha_authz_secrets::SecretResolver;

const METHOD_ARN: &str = "arn:aws:execute-api:us-east-1:123456789012:demo123/prod/POST/contact";
const DEMO_SECRET: &str = "demo-secret-key";
const PARAMETER_NAME: &str = "/demo/recaptcha/secret-key";

// ── Scripted collaborators ────────────────────────────────────────────────────

/// Answers each token with a canned verification result and counts calls.
struct ScriptedVerifier {
    answers: HashMap<String, VerificationResult>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedVerifier {
    fn new(calls: Arc<AtomicUsize>) -> Self {
        let mut answers = HashMap::new();
        answers.insert("human-submit".to_string(), human(0.9, "submit"));
        answers.insert("bot-submit".to_string(), human(0.1, "submit"));
        answers.insert("human-login".to_string(), human(0.9, "login"));
        Self { answers, calls }
    }
}

fn human(score: f64, action: &str) -> VerificationResult {
    VerificationResult {
        success: true,
        score: Some(score),
        action: Some(action.to_string()),
        hostname: Some("demo.example.com".to_string()),
        challenge_ts: Some("2026-10-19T09:30:00Z".to_string()),
        error_codes: Vec::new(),
    }
}

#[async_trait]
impl VerificationClient for ScriptedVerifier {
    async fn verify(&self, request: &VerificationRequest) -> AuthzResult<VerificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.secret.expose_secret() != DEMO_SECRET {
            return Ok(VerificationResult {
                success: false,
                score: None,
                action: None,
                hostname: None,
                challenge_ts: None,
                error_codes: vec!["invalid-input-secret".to_string()],
            });
        }
        Ok(self.answers.get(&request.token).cloned().unwrap_or(VerificationResult {
            success: false,
            score: None,
            action: None,
            hostname: None,
            challenge_ts: None,
            error_codes: vec!["invalid-input-response".to_string()],
        }))
    }
}

/// A parameter store that counts reads.
struct CountingParameterStore {
    reads: Arc<AtomicUsize>,
}

#[async_trait]
impl ParameterStore for CountingParameterStore {
    async fn get_parameter(&self, name: &str) -> AuthzResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if name == PARAMETER_NAME {
            Ok(DEMO_SECRET.to_string())
        } else {
            Err(AuthzError::upstream(format!("parameter '{}' not found", name)))
        }
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

struct Rig {
    authorizer: Authorizer,
    audit: InMemoryAuditWriter,
    verify_calls: Arc<AtomicUsize>,
    store_reads: Arc<AtomicUsize>,
}

fn rig(source: SecretSource) -> AuthzResult<Rig> {
    let verify_calls = Arc::new(AtomicUsize::new(0));
    let store_reads = Arc::new(AtomicUsize::new(0));

    let resolver = SecretResolver::new(source).with_parameter_store(Arc::new(
        CountingParameterStore { reads: store_reads.clone() },
    ));
    let policy = PolicyConfig::new(0.5, ["submit"])?;
    let audit = InMemoryAuditWriter::tee(Arc::new(TracingAuditWriter::new()));

    let authorizer = Authorizer::new(
        Box::new(resolver),
        Box::new(ScriptedVerifier::new(verify_calls.clone())),
        Box::new(ScorePolicyEngine::new(policy)),
        Box::new(audit.clone()),
    );

    Ok(Rig { authorizer, audit, verify_calls, store_reads })
}

fn plain_text() -> SecretSource {
    SecretSource::PlainText { value: DEMO_SECRET.to_string() }
}

fn request(token: Option<&str>) -> AuthzResult<AuthorizerRequest> {
    let mut headers = json!({ "content-type": "application/json" });
    if let Some(token) = token {
        headers["X-reCAPTCHA-Token"] = json!(token);
    }
    serde_json::from_value(json!({
        "type": "REQUEST",
        "methodArn": METHOD_ARN,
        "headers": headers,
        "requestContext": { "identity": { "sourceIp": "203.0.113.7" } }
    }))
    .map_err(|e| AuthzError::config(format!("demo request is malformed: {}", e)))
}

/// Run one request and compare the recorded outcome with `expected`.
async fn decide(
    rig: &Rig,
    token: Option<&str>,
    expected: Effect,
    expected_reason: Option<DenyReason>,
) -> AuthzResult<bool> {
    let before = rig.audit.len();
    let decision = rig.authorizer.authorize(&request(token)?, Some("demo")).await?;
    let record = rig.audit.records().into_iter().nth(before);
    let reason = record.as_ref().and_then(|r| r.reason);

    println!("  Token:                  {}", token.unwrap_or("<none>"));
    if let Some(record) = &record {
        if let Some(score) = record.score {
            println!("  Score:                  {:.1}", score);
        }
        if let Some(action) = &record.action {
            println!("  Action:                 {}", action);
        }
    }
    println!("  Effect:                 {}", decision.effect);
    if let Some(reason) = reason {
        println!("  Deny reason:            {}", reason.describe());
    }

    let matched = decision.effect == expected && reason == expected_reason;
    if matched {
        println!("  RESULT: {} (expected)", decision.effect);
    } else {
        println!(
            "  RESULT: UNEXPECTED, wanted {} {:?}, got {} {:?}",
            expected, expected_reason, decision.effect, reason
        );
    }
    Ok(matched)
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

/// A: human score on an allowed action.
pub async fn allow_human() -> AuthzResult<bool> {
    println!("=== Scenario A: human on an allowed action ===");
    let rig = rig(plain_text())?;
    let ok = decide(&rig, Some("human-submit"), Effect::Allow, None).await?;
    println!();
    Ok(ok)
}

/// B: score below the threshold.
pub async fn deny_low_score() -> AuthzResult<bool> {
    println!("=== Scenario B: score below threshold ===");
    let rig = rig(plain_text())?;
    let ok = decide(
        &rig,
        Some("bot-submit"),
        Effect::Deny,
        Some(DenyReason::ScoreBelowThreshold),
    )
    .await?;
    println!();
    Ok(ok)
}

/// C: good score, action outside the allow-list.
pub async fn deny_unlisted_action() -> AuthzResult<bool> {
    println!("=== Scenario C: action not in the allow-list ===");
    let rig = rig(plain_text())?;
    let ok = decide(
        &rig,
        Some("human-login"),
        Effect::Deny,
        Some(DenyReason::ActionNotAllowed),
    )
    .await?;
    println!();
    Ok(ok)
}

/// D: no token header; verification must not run.
pub async fn deny_missing_token() -> AuthzResult<bool> {
    println!("=== Scenario D: missing token ===");
    let rig = rig(plain_text())?;
    let ok = decide(&rig, None, Effect::Deny, Some(DenyReason::MissingToken)).await?;
    let calls = rig.verify_calls.load(Ordering::SeqCst);
    println!("  Verification calls:     {}", calls);
    println!();
    Ok(ok && calls == 0)
}

/// E: parameter-store secret fetched once across requests.
pub async fn cached_parameter() -> AuthzResult<bool> {
    println!("=== Scenario E: parameter-store secret is read once ===");
    let rig = rig(SecretSource::ParameterStore { name: PARAMETER_NAME.to_string() })?;
    let first = decide(&rig, Some("human-submit"), Effect::Allow, None).await?;
    let second = decide(&rig, Some("human-submit"), Effect::Allow, None).await?;
    let reads = rig.store_reads.load(Ordering::SeqCst);
    println!("  Parameter store reads:  {}", reads);
    println!();
    Ok(first && second && reads == 1)
}

/// Print the audit trail of one allowed request as JSON.
pub async fn audit_trail() -> AuthzResult<bool> {
    println!("=== Audit trail ===");
    let rig = rig(plain_text())?;
    rig.authorizer.authorize(&request(Some("human-submit"))?, Some("demo")).await?;
    rig.authorizer.authorize(&request(None)?, Some("demo")).await?;
    let trail = rig.audit.export_json();
    println!(
        "{}",
        serde_json::to_string_pretty(&trail)
            .map_err(|e| AuthzError::config(format!("cannot render audit trail: {}", e)))?
    );
    println!();
    Ok(rig.audit.len() == 2)
}
