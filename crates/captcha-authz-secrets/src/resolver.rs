//! The secret resolver and its single-slot cache.
//!
//! Plain-text sources are a pure lookup. Store-backed sources are read once
//! and then served from the cache for the rest of the process lifetime, or
//! until [`SecretResolver::reset`] is called.
//!
//! The cache slot is an `ArcSwapOption`, not a lock held across the fetch.
//! Concurrent first resolutions may each read the backing store; they all
//! converge on the same value, so the duplicate read is only wasted work.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, info};

use captcha_authz_contracts::{
    error::{AuthzError, AuthzResult},
    secret::SecretSource,
};
use captcha_authz_core::traits::{ParameterStore, SecretProvider, SecretStore};

/// Resolves the verification-service secret from one configured source.
///
/// Construct one per process. The cache lives inside the resolver, so the
/// process-wide cache is simply the resolver shared by every invocation.
pub struct SecretResolver {
    source: SecretSource,
    parameters: Option<Arc<dyn ParameterStore>>,
    secrets: Option<Arc<dyn SecretStore>>,
    cached: ArcSwapOption<SecretString>,
}

impl SecretResolver {
    /// Create a resolver for `source` with no backing stores wired.
    ///
    /// Store-backed sources need the matching store attached with
    /// [`with_parameter_store`](Self::with_parameter_store) or
    /// [`with_secret_store`](Self::with_secret_store).
    pub fn new(source: SecretSource) -> Self {
        Self {
            source,
            parameters: None,
            secrets: None,
            cached: ArcSwapOption::empty(),
        }
    }

    pub fn with_parameter_store(mut self, store: Arc<dyn ParameterStore>) -> Self {
        self.parameters = Some(store);
        self
    }

    pub fn with_secret_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(store);
        self
    }

    /// Return the secret for the configured source.
    ///
    /// Fails with `ConfigError` when a locator is empty or no store is wired
    /// for the source kind, and with `UpstreamError` when the store read fails
    /// or yields nothing usable. A failed resolution leaves the cache empty.
    pub async fn resolve(&self) -> AuthzResult<Arc<SecretString>> {
        match &self.source {
            SecretSource::PlainText { value } => {
                if value.is_empty() {
                    return Err(AuthzError::config("SECRET_KEY was not defined"));
                }
                Ok(Arc::new(SecretString::from(value.clone())))
            }

            SecretSource::ParameterStore { name } => {
                if name.is_empty() {
                    return Err(AuthzError::config("SECRET_KEY_PARAMETER was not defined"));
                }
                if let Some(secret) = self.cached.load_full() {
                    return Ok(secret);
                }
                let store = self
                    .parameters
                    .as_ref()
                    .ok_or_else(|| AuthzError::config("no parameter store configured"))?;

                debug!(parameter = %name, "fetching secret from parameter store");
                let value = store.get_parameter(name).await?;
                if value.is_empty() {
                    return Err(AuthzError::upstream(format!(
                        "parameter '{}' has no value",
                        name
                    )));
                }
                Ok(self.populate(value))
            }

            SecretSource::SecretStore { secret_id, field } => {
                if secret_id.is_empty() {
                    return Err(AuthzError::config("SECRET_KEY_SECRET_ARN was not defined"));
                }
                if let Some(secret) = self.cached.load_full() {
                    return Ok(secret);
                }
                let store = self
                    .secrets
                    .as_ref()
                    .ok_or_else(|| AuthzError::config("no secret store configured"))?;

                debug!(secret_id = %secret_id, field = ?field, "fetching secret from secret store");
                let raw = store.get_secret_string(secret_id).await?;
                let value = match field {
                    Some(field) => extract_field(&raw, field)?,
                    None => raw,
                };
                if value.is_empty() {
                    return Err(AuthzError::upstream(format!(
                        "secret '{}' has no value",
                        secret_id
                    )));
                }
                Ok(self.populate(value))
            }
        }
    }

    /// Drop the cached secret. The next store-backed resolution reads again.
    ///
    /// Resolutions already in flight still complete and may repopulate the
    /// slot with the value they fetched.
    pub fn reset(&self) {
        self.cached.store(None);
    }

    pub fn is_cached(&self) -> bool {
        self.cached.load().is_some()
    }

    fn populate(&self, value: String) -> Arc<SecretString> {
        let secret = Arc::new(SecretString::from(value));
        self.cached.store(Some(secret.clone()));
        info!(source = self.source.kind(), "verification secret cached");
        secret
    }
}

#[async_trait]
impl SecretProvider for SecretResolver {
    async fn secret(&self) -> AuthzResult<Arc<SecretString>> {
        self.resolve().await
    }
}

/// Parse `raw` as a JSON object and return its string field `field`.
fn extract_field(raw: &str, field: &str) -> AuthzResult<String> {
    let document: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
        AuthzError::upstream(format!("secret string is not a JSON document: {}", e))
    })?;

    match document.get(field) {
        Some(serde_json::Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(AuthzError::upstream(format!(
            "secret field '{}' is not a string",
            field
        ))),
        None => Err(AuthzError::upstream(format!(
            "secret field '{}' not found",
            field
        ))),
    }
}
