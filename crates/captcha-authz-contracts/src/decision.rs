//! Verdicts and the resource-scoped authorization artifact.
//!
//! The policy engine produces a `Verdict`. The authorizer turns it into an
//! `AuthDecision`, which serializes to the policy document the gateway
//! expects from a request authorizer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the gateway may forward the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => f.write_str("Allow"),
            Effect::Deny => f.write_str("Deny"),
        }
    }
}

/// Which rule in the chain produced a Deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenyReason {
    /// The request carried no verification token.
    MissingToken,
    /// The verification service rejected the token.
    VerificationFailed,
    /// The score was strictly below the configured threshold.
    ScoreBelowThreshold,
    /// The action label is not in the allow-list.
    ActionNotAllowed,
}

impl DenyReason {
    /// Human-readable explanation, written to the audit line.
    pub fn describe(&self) -> &'static str {
        match self {
            DenyReason::MissingToken => "verification token header missing",
            DenyReason::VerificationFailed => "verification token not valid",
            DenyReason::ScoreBelowThreshold => "score less than threshold",
            DenyReason::ActionNotAllowed => "action not in allowed actions",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DenyReason::MissingToken => "MissingToken",
            DenyReason::VerificationFailed => "VerificationFailed",
            DenyReason::ScoreBelowThreshold => "ScoreBelowThreshold",
            DenyReason::ActionNotAllowed => "ActionNotAllowed",
        };
        f.write_str(name)
    }
}

/// The outcome of the policy chain for one request.
///
/// Deny-by-default: anything other than `Allow` blocks the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    pub fn effect(&self) -> Effect {
        match self {
            Verdict::Allow => Effect::Allow,
            Verdict::Deny(_) => Effect::Deny,
        }
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(reason) => Some(*reason),
        }
    }
}

/// An Allow/Deny decision scoped to exactly one resource.
///
/// Serializes as the gateway authorizer response (see [`AuthorizerResponse`]).
/// The resource is always the one from the request; wildcards are never
/// produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub effect: Effect,
    pub resource_arn: String,
}

impl AuthDecision {
    /// Build the artifact for `effect` on `resource_arn`. Pure and total.
    pub fn new(effect: Effect, resource_arn: impl Into<String>) -> Self {
        Self { effect, resource_arn: resource_arn.into() }
    }

    pub fn allow(resource_arn: impl Into<String>) -> Self {
        Self::new(Effect::Allow, resource_arn)
    }

    pub fn deny(resource_arn: impl Into<String>) -> Self {
        Self::new(Effect::Deny, resource_arn)
    }

    pub fn to_response(&self) -> AuthorizerResponse {
        AuthorizerResponse {
            principal_id: AuthorizerResponse::PRINCIPAL_ID.to_string(),
            policy_document: PolicyDocument {
                version: PolicyDocument::VERSION.to_string(),
                statement: vec![PolicyStatement {
                    action: PolicyStatement::INVOKE_ACTION.to_string(),
                    effect: self.effect,
                    resource: self.resource_arn.clone(),
                }],
            },
        }
    }
}

impl Serialize for AuthDecision {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_response().serialize(serializer)
    }
}

/// Wire shape of a gateway request-authorizer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

impl AuthorizerResponse {
    /// The authorizer does not identify end users; every decision is issued
    /// for the same anonymous principal.
    pub const PRINCIPAL_ID: &'static str = "user";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub const VERSION: &'static str = "2012-10-17";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

impl PolicyStatement {
    pub const INVOKE_ACTION: &'static str = "execute-api:Invoke";
}
