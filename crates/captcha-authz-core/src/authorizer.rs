//! The authorizer: the per-request decision pipeline.
//!
//! Every request walks the same path:
//!
//!   Token → Secret → Verify → Policy → Decision → Audit
//!
//! A request without a token goes straight to a Deny decision. The secret
//! provider and the verification client are only reachable after the token
//! check passes.

use chrono::Utc;
use tracing::{debug, warn};

use captcha_authz_contracts::{
    audit::{DecisionId, DecisionRecord},
    decision::{AuthDecision, Verdict},
    error::AuthzResult,
    request::{AuthorizerRequest, DEFAULT_TOKEN_HEADER},
    verification::{VerificationRequest, VerificationResult},
};

use crate::traits::{AuditWriter, PolicyEngine, SecretProvider, VerificationClient};

/// Drives one decision per call to [`Authorizer::authorize`].
///
/// Construct once per process and share across invocations. The only state
/// carried between requests is whatever the `SecretProvider` caches.
pub struct Authorizer {
    secrets: Box<dyn SecretProvider>,
    verifier: Box<dyn VerificationClient>,
    policy: Box<dyn PolicyEngine>,
    audit: Box<dyn AuditWriter>,
    token_header: String,
}

impl Authorizer {
    pub fn new(
        secrets: Box<dyn SecretProvider>,
        verifier: Box<dyn VerificationClient>,
        policy: Box<dyn PolicyEngine>,
        audit: Box<dyn AuditWriter>,
    ) -> Self {
        Self {
            secrets,
            verifier,
            policy,
            audit,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
        }
    }

    /// Read the token from `header` instead of the default header.
    pub fn with_token_header(mut self, header: impl Into<String>) -> Self {
        self.token_header = header.into();
        self
    }

    /// Decide whether `request` may reach its resource.
    ///
    /// # Pipeline
    ///
    /// 1. Read the token header. Missing → Deny(`MissingToken`) without any
    ///    network call.
    /// 2. Resolve the secret.
    /// 3. Call the verification service once.
    /// 4. Run the policy chain over the result.
    /// 5. Build the decision for exactly `request.method_arn` and write one
    ///    audit record.
    ///
    /// # Errors
    ///
    /// `ConfigError` and `UpstreamError` from the secret provider or the
    /// verifier are returned as-is. No decision is produced and nothing is
    /// audited for such requests; the gateway treats them as an authorizer
    /// failure, distinct from Deny.
    pub async fn authorize(
        &self,
        request: &AuthorizerRequest,
        request_id: Option<&str>,
    ) -> AuthzResult<AuthDecision> {
        let source_ip = request.source_ip();
        let token = request.header(&self.token_header);

        debug!(
            source_ip = %source_ip,
            resource_arn = %request.method_arn,
            token_present = token.is_some(),
            "authorizing request"
        );

        let result = match token {
            Some(token) => Some(self.verify(token, source_ip).await?),
            None => None,
        };

        let verdict = self.policy.evaluate(token, result.as_ref());
        Ok(self.respond(request, request_id, verdict, result.as_ref()))
    }

    async fn verify(&self, token: &str, source_ip: &str) -> AuthzResult<VerificationResult> {
        let secret = self.secrets.secret().await?;
        let verification = VerificationRequest {
            token: token.to_string(),
            remote_ip: source_ip.to_string(),
            secret,
        };

        let result = self.verifier.verify(&verification).await?;

        if !result.error_codes.is_empty() {
            warn!(
                source_ip = %source_ip,
                error_codes = ?result.error_codes,
                "verification service reported errors"
            );
        }

        Ok(result)
    }

    fn respond(
        &self,
        request: &AuthorizerRequest,
        request_id: Option<&str>,
        verdict: Verdict,
        result: Option<&VerificationResult>,
    ) -> AuthDecision {
        let decision = AuthDecision::new(verdict.effect(), request.method_arn.as_str());

        let record = DecisionRecord {
            decision_id: DecisionId::new(),
            request_id: request_id.map(str::to_string),
            effect: decision.effect,
            source_ip: request.source_ip().to_string(),
            resource_arn: decision.resource_arn.clone(),
            hostname: result.and_then(|r| r.hostname.clone()),
            score: result.and_then(|r| r.score),
            action: result.and_then(|r| r.action.clone()),
            reason: verdict.reason(),
            timestamp: Utc::now(),
        };
        self.audit.write(&record);

        decision
    }
}
