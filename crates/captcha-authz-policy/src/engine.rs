//! Score and action policy engine.
//!
//! `ScorePolicyEngine` implements the `PolicyEngine` trait from
//! captcha-authz-core.
//!
//! Evaluation algorithm (first failing rule wins, later rules never run):
//!
//! 1. No token → `Deny(MissingToken)`.
//! 2. No result, or `success == false` → `Deny(VerificationFailed)`.
//! 3. Score missing or strictly below the threshold → `Deny(ScoreBelowThreshold)`.
//! 4. Action missing or not in the allow-list → `Deny(ActionNotAllowed)`.
//! 5. Otherwise → `Allow`.

use tracing::debug;

use captcha_authz_contracts::{
    decision::{DenyReason, Verdict},
    verification::VerificationResult,
};
use captcha_authz_core::traits::PolicyEngine;

use crate::config::PolicyConfig;

#[derive(Debug, Clone)]
pub struct ScorePolicyEngine {
    config: PolicyConfig,
}

impl ScorePolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }
}

impl PolicyEngine for ScorePolicyEngine {
    fn evaluate(&self, token: Option<&str>, result: Option<&VerificationResult>) -> Verdict {
        if token.is_none() {
            return Verdict::Deny(DenyReason::MissingToken);
        }

        let result = match result {
            Some(result) if result.success => result,
            _ => return Verdict::Deny(DenyReason::VerificationFailed),
        };

        // Score-less responses cannot prove a human; treat as below threshold.
        match result.score {
            Some(score) if score >= self.config.score_threshold => {}
            score => {
                debug!(
                    ?score,
                    threshold = self.config.score_threshold,
                    "score below threshold"
                );
                return Verdict::Deny(DenyReason::ScoreBelowThreshold);
            }
        }

        match result.action.as_deref() {
            Some(action) if self.config.allows_action(action) => Verdict::Allow,
            action => {
                debug!(
                    ?action,
                    allowed = ?self.config.allowed_actions,
                    "action not in allow-list"
                );
                Verdict::Deny(DenyReason::ActionNotAllowed)
            }
        }
    }
}
