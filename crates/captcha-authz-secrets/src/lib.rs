//! # captcha-authz-secrets
//!
//! Resolves the shared secret the verification service requires.
//!
//! ## Overview
//!
//! A [`SecretSource`](captcha_authz_contracts::secret::SecretSource) names
//! where the secret lives. [`SecretResolver`] dispatches on it:
//!
//! - plain text: returned as-is, never cached
//! - parameter store: read once with decryption, then cached
//! - secret store: read once, optionally narrowed to one JSON field, then cached
//!
//! ## Usage
//!
//! ```rust,ignore
//! use captcha_authz_secrets::{source, SecretResolver};
//!
//! let source = source::from_lookup(|key| std::env::var(key).ok())?;
//! let resolver = SecretResolver::new(source).with_parameter_store(ssm);
//! let secret = resolver.resolve().await?;
//! ```

pub mod resolver;
pub mod source;

pub use resolver::SecretResolver;

// ── Tests ─────────────────────────────────────────────────────────────────────
