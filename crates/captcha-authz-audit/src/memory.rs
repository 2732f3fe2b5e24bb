//! In-memory implementation of `AuditWriter`.
//!
//! Keeps every record in a `Vec` behind a `Mutex`. Meant for tests and the
//! offline demo, where the caller needs to count and inspect decisions.

use std::sync::{Arc, Mutex, PoisonError};

use captcha_authz_contracts::audit::DecisionRecord;
use captcha_authz_core::traits::AuditWriter;

/// An append-only audit writer that also forwards to an inner writer.
///
/// Clones share the same record list, so a test can keep one clone and hand
/// another to the `Authorizer`.
#[derive(Clone, Default)]
pub struct InMemoryAuditWriter {
    records: Arc<Mutex<Vec<DecisionRecord>>>,
    inner: Option<Arc<dyn AuditWriter>>,
}

impl InMemoryAuditWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record in memory and also pass every record on to `inner`.
    pub fn tee(inner: Arc<dyn AuditWriter>) -> Self {
        Self { records: Arc::default(), inner: Some(inner) }
    }

    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export all records as a JSON array.
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.records()).unwrap_or(serde_json::Value::Null)
    }
}

impl AuditWriter for InMemoryAuditWriter {
    fn write(&self, record: &DecisionRecord) {
        // A panic while holding the lock leaves the vector intact.
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        if let Some(inner) = &self.inner {
            inner.write(record);
        }
    }
}
