//! Lambda bootstrap for the captcha-authz request authorizer.
//!
//! Configuration is read once from the environment (see
//! `captcha_authz_lambda::settings`). A configuration error aborts the cold
//! start; the runtime then reports the function as failed to initialise.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing_subscriber::EnvFilter;

use captcha_authz_contracts::request::AuthorizerRequest;
use captcha_authz_lambda::{handle, init, AuthorizerSettings};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // JSON lines for CloudWatch. Set RUST_LOG=debug for pipeline detail.
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_current_span(false)
        .without_time()
        .init();

    let settings = AuthorizerSettings::from_env()?;
    let authorizer = init(&settings).await;
    let authorizer = &authorizer;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<AuthorizerRequest>| async move {
        handle(authorizer, event).await
    }))
    .await
}
