//! # captcha-authz-core
//!
//! The request-time decision pipeline for the captcha-authz authorizer.
//!
//! This crate provides:
//! - The trust-boundary traits (`SecretProvider`, `ParameterStore`,
//!   `SecretStore`, `VerificationClient`, `PolicyEngine`, `AuditWriter`)
//! - The `Authorizer` that wires them together in the correct order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use captcha_authz_core::Authorizer;
//!
//! let authorizer = Authorizer::new(secrets, verifier, policy, audit);
//! let decision = authorizer.authorize(&request, Some(request_id)).await?;
//! ```

pub mod authorizer;
pub mod traits;

pub use authorizer::Authorizer;
