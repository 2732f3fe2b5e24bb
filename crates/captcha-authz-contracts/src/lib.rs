//! # captcha-authz-contracts
//!
//! Shared types, wire formats, and contracts for the captcha-authz request
//! authorizer.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions and error types.

pub mod audit;
pub mod decision;
pub mod error;
pub mod request;
pub mod secret;
pub mod verification;
