//! `AuditWriter` that emits one structured log line per decision.
//!
//! Allows are logged at `info`, denials at `warn`. Both carry the same
//! field set so a log query can filter on `effect` and `reason` directly.
//! Optional fields are left out of the line when absent, and `score` is
//! recorded as a number.

use tracing::{info, warn};

use captcha_authz_contracts::{audit::DecisionRecord, decision::Effect};
use captcha_authz_core::traits::AuditWriter;

/// Target used for decision lines, so they can be filtered independently.
pub const AUDIT_TARGET: &str = "captcha_authz::decision";

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditWriter;

impl TracingAuditWriter {
    pub fn new() -> Self {
        Self
    }
}

impl AuditWriter for TracingAuditWriter {
    fn write(&self, record: &DecisionRecord) {
        let decision_id = record.decision_id.0.to_string();
        let request_id = record.request_id.as_deref();
        let hostname = record.hostname.as_deref();
        let action = record.action.as_deref();
        let reason = record.reason.map(|r| r.to_string());
        let detail = record.reason.map(|r| r.describe());

        match record.effect {
            Effect::Allow => info!(
                target: AUDIT_TARGET,
                decision_id = %decision_id,
                request_id = request_id,
                effect = %record.effect,
                source_ip = %record.source_ip,
                resource_arn = %record.resource_arn,
                hostname = hostname,
                score = record.score,
                action = action,
                "ALLOW"
            ),
            Effect::Deny => warn!(
                target: AUDIT_TARGET,
                decision_id = %decision_id,
                request_id = request_id,
                effect = %record.effect,
                source_ip = %record.source_ip,
                resource_arn = %record.resource_arn,
                hostname = hostname,
                score = record.score,
                action = action,
                reason = reason.as_deref(),
                detail = detail,
                "DENY"
            ),
        }
    }
}
