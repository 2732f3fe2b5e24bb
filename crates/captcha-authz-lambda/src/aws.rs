//! AWS-backed secret stores.
//!
//! Anti-corruption layer over the SDK clients: SDK errors become
//! `UpstreamError`, and a response without a value is an error too.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext as SecretsErrorContext;
use aws_sdk_ssm::error::DisplayErrorContext as SsmErrorContext;

use captcha_authz_contracts::error::{AuthzError, AuthzResult};
use captcha_authz_core::traits::{ParameterStore, SecretStore};

/// SSM Parameter Store, read with decryption.
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str) -> AuthzResult<String> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                AuthzError::upstream(format!(
                    "SSM GetParameter '{}' failed: {}",
                    name,
                    SsmErrorContext(&e)
                ))
            })?;

        output
            .parameter()
            .and_then(|p| p.value())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AuthzError::upstream("SSM parameter response missing parameter value"))
    }
}

/// Secrets Manager, read as a secret string.
pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret_string(&self, secret_id: &str) -> AuthzResult<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                AuthzError::upstream(format!(
                    "Secrets Manager GetSecretValue '{}' failed: {}",
                    secret_id,
                    SecretsErrorContext(&e)
                ))
            })?;

        output
            .secret_string()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AuthzError::upstream("Secrets Manager secret response missing secret string")
            })
    }
}
