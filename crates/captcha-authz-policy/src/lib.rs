//! # captcha-authz-policy
//!
//! The deny-by-default policy chain for the captcha-authz authorizer.
//!
//! ## Overview
//!
//! This crate provides [`ScorePolicyEngine`], which implements the
//! [`PolicyEngine`](captcha_authz_core::traits::PolicyEngine) trait, and the
//! [`PolicyConfig`] it reads its threshold and allow-list from.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use captcha_authz_policy::{PolicyConfig, ScorePolicyEngine};
//!
//! let config = PolicyConfig::from_env_values(Some("0.7"), Some(r#"["login"]"#))?;
//! let engine = ScorePolicyEngine::new(config);
//! ```
//!
//! ## Rule order
//!
//! Token presence, upstream success, score threshold, action allow-list.
//! The first rule that fails decides the deny reason.

pub mod config;
pub mod engine;

pub use config::{PolicyConfig, DEFAULT_SCORE_THRESHOLD};
pub use engine::ScorePolicyEngine;

// ── Tests ─────────────────────────────────────────────────────────────────────
