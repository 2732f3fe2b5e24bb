//! Core trait definitions for the authorizer pipeline.
//!
//! These traits define the complete trust boundary:
//!
//! - `SecretProvider`: supplies the verification-service secret
//! - `ParameterStore`: backing store read by name, with decryption
//! - `SecretStore`: backing store read by secret identifier
//! - `VerificationClient`: the only path to the verification service
//! - `PolicyEngine`: trusted, pure decision over the verification result
//! - `AuditWriter`: trusted sink, one record per decision
//!
//! The `Authorizer` wires them together in order. Implementations of the
//! I/O traits are never called unless the request carries a token.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

use captcha_authz_contracts::{
    audit::DecisionRecord,
    decision::Verdict,
    error::AuthzResult,
    verification::{VerificationRequest, VerificationResult},
};

/// Supplies the shared secret for the verification service.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Return the secret, fetching it if needed.
    ///
    /// Fails with `ConfigError` for a misconfigured source and
    /// `UpstreamError` when a backing store fails.
    async fn secret(&self) -> AuthzResult<Arc<SecretString>>;
}

/// Lets the host keep a handle on a shared provider (e.g. to reset its
/// cache) while the `Authorizer` owns another.
#[async_trait]
impl<T: SecretProvider + ?Sized> SecretProvider for Arc<T> {
    async fn secret(&self) -> AuthzResult<Arc<SecretString>> {
        (**self).secret().await
    }
}

/// A parameter store that can decrypt values on read.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read the parameter `name`, decrypting it, and return its value.
    async fn get_parameter(&self, name: &str) -> AuthzResult<String>;
}

/// A secret store holding string secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the secret string stored under `secret_id`.
    async fn get_secret_string(&self, secret_id: &str) -> AuthzResult<String>;
}

/// The verification service client.
///
/// Tokens are single-use upstream, so implementations must neither retry nor
/// cache. Every call is one network round trip.
#[async_trait]
pub trait VerificationClient: Send + Sync {
    async fn verify(&self, request: &VerificationRequest) -> AuthzResult<VerificationResult>;
}

/// The policy chain. Deterministic and free of I/O.
pub trait PolicyEngine: Send + Sync {
    /// Decide on a request.
    ///
    /// `token` is `None` when the request carried no token, in which case
    /// `result` is `None` as well because verification never ran.
    fn evaluate(&self, token: Option<&str>, result: Option<&VerificationResult>) -> Verdict;
}

/// The audit sink: exactly one record per decided request.
///
/// `write` is infallible. It runs after the decision is final, and a sink
/// failure must not turn an Allow or Deny into an authorizer error.
/// Implementations handle their own failures (a poisoned lock, a closed
/// writer) and keep accepting records.
pub trait AuditWriter: Send + Sync {
    fn write(&self, record: &DecisionRecord);
}
