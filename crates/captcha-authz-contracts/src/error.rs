//! Error taxonomy for the authorizer pipeline.
//!
//! Only conditions that stop a decision from being produced are errors.
//! Policy denials are successful evaluations and live in
//! [`Verdict`](crate::decision::Verdict), never here.

use thiserror::Error;

/// The unified error type for the authorizer.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A required setting is missing or invalid.
    ///
    /// Indicates a deployment defect. Surfaced to the gateway as a hard
    /// failure, never converted into a Deny.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A backing secret store or the verification service failed, timed out,
    /// or returned something unusable. Propagated without retry.
    #[error("upstream error: {reason}")]
    UpstreamError { reason: String },
}

impl AuthzError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigError { reason: reason.into() }
    }

    pub fn upstream(reason: impl Into<String>) -> Self {
        Self::UpstreamError { reason: reason.into() }
    }
}

/// Convenience alias used throughout the captcha-authz crates.
pub type AuthzResult<T> = Result<T, AuthzError>;
