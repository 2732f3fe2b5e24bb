//! Verification service request and response types.

use std::sync::Arc;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Inputs to one upstream verification call.
///
/// Built fresh for every request. The secret is shared with the resolver's
/// cache, so it is held behind an `Arc` rather than copied.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    /// Opaque token submitted by the end client.
    pub token: String,
    /// The caller's source address as reported by the gateway.
    pub remote_ip: String,
    /// Shared secret for the verification service.
    pub secret: Arc<SecretString>,
}

/// The verification service's answer for a single token.
///
/// Only `success` is guaranteed by the wire protocol. Score-less responses
/// (checkbox-style keys) leave `score` and `action` empty, and the policy
/// engine treats those as failing their respective checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub success: bool,

    /// Confidence in [0.0, 1.0] that the requester is human.
    #[serde(default)]
    pub score: Option<f64>,

    /// The client-side action label the token was minted for.
    #[serde(default)]
    pub action: Option<String>,

    /// Origin hostname the token was solved on.
    #[serde(default)]
    pub hostname: Option<String>,

    /// ISO-8601 timestamp of the challenge load.
    #[serde(default)]
    pub challenge_ts: Option<String>,

    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}
