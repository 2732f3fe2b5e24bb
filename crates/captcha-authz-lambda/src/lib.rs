//! # captcha-authz-lambda
//!
//! Hosts the captcha-authz pipeline as an API Gateway REQUEST authorizer on
//! AWS Lambda.
//!
//! - [`settings`] loads configuration at cold start
//! - [`aws`] adapts SSM Parameter Store and Secrets Manager to the store traits
//! - [`handler`] builds the `Authorizer` and serves invocations

pub mod aws;
pub mod handler;
pub mod settings;

pub use handler::{authorize_event, build_authorizer, build_resolver, handle, init, BackingStores};
pub use settings::AuthorizerSettings;
