//! # captcha-authz-audit
//!
//! The audit surface of the captcha-authz authorizer.
//!
//! ## Overview
//!
//! Every decided request produces exactly one
//! [`DecisionRecord`](captcha_authz_contracts::audit::DecisionRecord).
//! [`TracingAuditWriter`] turns it into a single structured `tracing` event;
//! [`InMemoryAuditWriter`] keeps records for inspection and can forward them
//! to another writer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use captcha_authz_audit::TracingAuditWriter;
//!
//! let authorizer = Authorizer::new(secrets, verifier, policy, Box::new(TracingAuditWriter::new()));
//! ```

pub mod memory;
pub mod tracing_writer;

pub use memory::InMemoryAuditWriter;
pub use tracing_writer::{TracingAuditWriter, AUDIT_TARGET};

// ── Tests ─────────────────────────────────────────────────────────────────────
