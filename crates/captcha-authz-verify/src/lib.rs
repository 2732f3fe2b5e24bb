//! # captcha-authz-verify
//!
//! Client for the human/bot verification service.
//!
//! [`SiteVerifyClient`] implements the
//! [`VerificationClient`](captcha_authz_core::traits::VerificationClient)
//! trait with a single HTTPS POST per call, carrying the secret, the token,
//! and the caller's IP as query parameters.

pub mod client;

pub use client::{SiteVerifyClient, DEFAULT_VERIFY_URL};
