//! Building a `SecretSource` from the deployment's environment variables.

use captcha_authz_contracts::{
    error::{AuthzError, AuthzResult},
    secret::SecretSource,
};

/// Selects the source kind.
pub const SECRET_KEY_TYPE: &str = "SECRET_KEY_TYPE";
/// Inline secret for `PLAIN_TEXT`.
pub const SECRET_KEY: &str = "SECRET_KEY";
/// Parameter name for `SSM_PARAMETER`.
pub const SECRET_KEY_PARAMETER: &str = "SECRET_KEY_PARAMETER";
/// Secret identifier for `SECRETS_MANAGER`.
pub const SECRET_KEY_SECRET_ARN: &str = "SECRET_KEY_SECRET_ARN";
/// Optional JSON field for `SECRETS_MANAGER`.
pub const SECRET_KEY_FIELD: &str = "SECRET_KEY_FIELD";

/// Build a `SecretSource` by reading settings through `lookup`.
///
/// `lookup` returns the value of a named setting, or `None` when unset.
/// Empty values count as unset. Fails with `ConfigError` for an unknown
/// selector or a missing locator.
pub fn from_lookup<F>(lookup: F) -> AuthzResult<SecretSource>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
    let require = |key: &str| {
        get(key).ok_or_else(|| AuthzError::ConfigError {
            reason: format!("{} was not defined", key),
        })
    };

    match get(SECRET_KEY_TYPE).as_deref() {
        Some("PLAIN_TEXT") => Ok(SecretSource::PlainText { value: require(SECRET_KEY)? }),
        Some("SSM_PARAMETER") => Ok(SecretSource::ParameterStore {
            name: require(SECRET_KEY_PARAMETER)?,
        }),
        Some("SECRETS_MANAGER") => Ok(SecretSource::SecretStore {
            secret_id: require(SECRET_KEY_SECRET_ARN)?,
            field: get(SECRET_KEY_FIELD),
        }),
        Some(other) => Err(AuthzError::ConfigError {
            reason: format!("unsupported secret key type {}", other),
        }),
        None => Err(AuthzError::ConfigError {
            reason: format!("{} was not defined", SECRET_KEY_TYPE),
        }),
    }
}
