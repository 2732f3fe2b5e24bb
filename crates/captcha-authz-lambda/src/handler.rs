//! Wiring settings into an `Authorizer` and serving Lambda invocations.

use std::sync::Arc;

use lambda_runtime::LambdaEvent;
use tracing::{error, info};

use captcha_authz_audit::TracingAuditWriter;
use captcha_authz_contracts::{
    decision::AuthDecision, error::AuthzResult, request::AuthorizerRequest, secret::SecretSource,
};
use captcha_authz_core::{
    traits::{AuditWriter, ParameterStore, SecretStore},
    Authorizer,
};
use captcha_authz_policy::ScorePolicyEngine;
use captcha_authz_secrets::SecretResolver;
use captcha_authz_verify::SiteVerifyClient;

use crate::{
    aws::{SecretsManagerStore, SsmParameterStore},
    settings::AuthorizerSettings,
};

/// Backing stores available to the secret resolver.
#[derive(Default, Clone)]
pub struct BackingStores {
    pub parameters: Option<Arc<dyn ParameterStore>>,
    pub secrets: Option<Arc<dyn SecretStore>>,
}

impl BackingStores {
    /// Create AWS clients for whichever store `source` needs.
    ///
    /// Plain-text sources need no store, so no SDK configuration is loaded.
    pub async fn for_source(source: &SecretSource) -> Self {
        match source {
            SecretSource::PlainText { .. } => Self::default(),
            SecretSource::ParameterStore { .. } => {
                let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                Self {
                    parameters: Some(Arc::new(SsmParameterStore::new(aws_sdk_ssm::Client::new(
                        &config,
                    )))),
                    secrets: None,
                }
            }
            SecretSource::SecretStore { .. } => {
                let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                Self {
                    parameters: None,
                    secrets: Some(Arc::new(SecretsManagerStore::new(
                        aws_sdk_secretsmanager::Client::new(&config),
                    ))),
                }
            }
        }
    }
}

/// Build the secret resolver for `settings` over `stores`.
pub fn build_resolver(settings: &AuthorizerSettings, stores: BackingStores) -> SecretResolver {
    let mut resolver = SecretResolver::new(settings.secret.clone());
    if let Some(parameters) = stores.parameters {
        resolver = resolver.with_parameter_store(parameters);
    }
    if let Some(secrets) = stores.secrets {
        resolver = resolver.with_secret_store(secrets);
    }
    resolver
}

/// Assemble the full pipeline.
pub fn build_authorizer(
    settings: &AuthorizerSettings,
    resolver: Arc<SecretResolver>,
    audit: Box<dyn AuditWriter>,
) -> Authorizer {
    Authorizer::new(
        Box::new(resolver),
        Box::new(SiteVerifyClient::with_endpoint(settings.verify_url.clone())),
        Box::new(ScorePolicyEngine::new(settings.policy.clone())),
        audit,
    )
    .with_token_header(settings.token_header.clone())
}

/// Cold-start initialisation: settings, AWS clients, pipeline.
pub async fn init(settings: &AuthorizerSettings) -> Authorizer {
    let stores = BackingStores::for_source(&settings.secret).await;
    let resolver = Arc::new(build_resolver(settings, stores));

    info!(
        secret_source = settings.secret.kind(),
        score_threshold = settings.policy.score_threshold,
        allowed_actions = ?settings.policy.allowed_actions,
        token_header = %settings.token_header,
        "authorizer initialised"
    );

    build_authorizer(settings, resolver, Box::new(TracingAuditWriter::new()))
}

/// Decide one request. Errors are logged here once and then returned.
pub async fn authorize_event(
    authorizer: &Authorizer,
    request: &AuthorizerRequest,
    request_id: Option<&str>,
) -> AuthzResult<AuthDecision> {
    authorizer.authorize(request, request_id).await.inspect_err(|e| {
        let request_id = request_id.unwrap_or("");
        error!(
            request_id = %request_id,
            source_ip = %request.source_ip(),
            resource_arn = %request.method_arn,
            error = %e,
            "authorizer failed"
        );
    })
}

/// Lambda entry point for one invocation.
///
/// Failures are surfaced as invocation errors so the gateway reports an
/// authorizer failure instead of an explicit Deny.
pub async fn handle(
    authorizer: &Authorizer,
    event: LambdaEvent<AuthorizerRequest>,
) -> Result<AuthDecision, lambda_runtime::Error> {
    let request_id = event.context.request_id.clone();
    let decision = authorize_event(authorizer, &event.payload, Some(&request_id)).await?;
    Ok(decision)
}
