//! The per-decision audit record.
//!
//! Every decided request produces exactly one `DecisionRecord`. Requests that
//! fail with an error produce none.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::{DenyReason, Effect};

/// Unique identifier for one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub uuid::Uuid);

impl DecisionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision_id: DecisionId,
    /// The host's invocation id, when the runtime supplies one.
    pub request_id: Option<String>,
    pub effect: Effect,
    pub source_ip: String,
    pub resource_arn: String,
    /// Verification details. Absent when the token was missing.
    pub hostname: Option<String>,
    pub score: Option<f64>,
    pub action: Option<String>,
    /// Set only on Deny.
    pub reason: Option<DenyReason>,
    pub timestamp: DateTime<Utc>,
}
