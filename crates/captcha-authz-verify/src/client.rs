//! siteverify HTTP client.
//!
//! Anti-corruption layer for the verification service: translates a
//! `VerificationRequest` into one POST and the JSON answer into a
//! `VerificationResult`.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;

use captcha_authz_contracts::{
    error::{AuthzError, AuthzResult},
    verification::{VerificationRequest, VerificationResult},
};
use captcha_authz_core::traits::VerificationClient;

/// The public verification endpoint.
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Query parameters, named as the service expects them.
#[derive(Serialize)]
struct SiteVerifyParams<'a> {
    secret: &'a str,
    response: &'a str,
    remoteip: &'a str,
}

pub struct SiteVerifyClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SiteVerifyClient {
    /// Client for the public endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_VERIFY_URL)
    }

    /// Client for a different endpoint (tests, proxies, private deployments).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_http_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for SiteVerifyClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationClient for SiteVerifyClient {
    /// One POST per call. Never retried; tokens are single-use upstream.
    async fn verify(&self, request: &VerificationRequest) -> AuthzResult<VerificationResult> {
        let params = SiteVerifyParams {
            secret: request.secret.expose_secret(),
            response: &request.token,
            remoteip: &request.remote_ip,
        };

        debug!(
            endpoint = %self.endpoint,
            remote_ip = %request.remote_ip,
            "calling verification service"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .query(&params)
            .send()
            .await
            // The URL carries the secret in its query string; keep it out of errors.
            .map_err(|e| {
                AuthzError::upstream(format!("verification request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthzError::upstream(format!(
                "verification service returned HTTP {}",
                status
            )));
        }

        response.json::<VerificationResult>().await.map_err(|e| {
            AuthzError::upstream(format!(
                "verification response not parseable: {}",
                e.without_url()
            ))
        })
    }
}
