//! Process-start configuration.
//!
//! Settings come from the environment the deployment layer provides, or,
//! when `AUTHORIZER_CONFIG_FILE` points at one, from a TOML file:
//!
//! ```toml
//! verify_url = "https://www.google.com/recaptcha/api/siteverify"
//! token_header = "X-reCAPTCHA-Token"
//!
//! [policy]
//! score_threshold = 0.5
//! allowed_actions = ["submit"]
//!
//! [secret]
//! kind = "parameter_store"
//! name = "/recaptcha/secret-key"
//! ```

use std::path::Path;

use serde::Deserialize;

use captcha_authz_contracts::{
    error::{AuthzError, AuthzResult},
    request::DEFAULT_TOKEN_HEADER,
    secret::SecretSource,
};
use captcha_authz_policy::PolicyConfig;
use captcha_authz_secrets::source;
use captcha_authz_verify::DEFAULT_VERIFY_URL;

pub const AUTHORIZER_CONFIG_FILE: &str = "AUTHORIZER_CONFIG_FILE";
pub const SCORE_THRESHOLD: &str = "SCORE_THRESHOLD";
pub const ALLOWED_ACTIONS: &str = "ALLOWED_ACTIONS";
pub const VERIFY_URL: &str = "VERIFY_URL";
pub const TOKEN_HEADER: &str = "TOKEN_HEADER";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorizerSettings {
    pub secret: SecretSource,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    #[serde(default = "default_token_header")]
    pub token_header: String,
}

fn default_verify_url() -> String {
    DEFAULT_VERIFY_URL.to_string()
}

fn default_token_header() -> String {
    DEFAULT_TOKEN_HEADER.to_string()
}

impl AuthorizerSettings {
    /// Load from the process environment.
    pub fn from_env() -> AuthzResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`, which returns a setting's value or `None`.
    ///
    /// A non-empty `AUTHORIZER_CONFIG_FILE` switches to the TOML file and the
    /// other variables are ignored.
    pub fn from_lookup<F>(lookup: F) -> AuthzResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(path) = get(AUTHORIZER_CONFIG_FILE) {
            return Self::from_file(Path::new(&path));
        }

        let secret = source::from_lookup(&lookup)?;
        let policy = PolicyConfig::from_env_values(
            get(SCORE_THRESHOLD).as_deref(),
            get(ALLOWED_ACTIONS).as_deref(),
        )?;

        Ok(Self {
            secret,
            policy,
            verify_url: get(VERIFY_URL).unwrap_or_else(default_verify_url),
            token_header: get(TOKEN_HEADER).unwrap_or_else(default_token_header),
        })
    }

    /// Parse `s` as TOML settings and validate the policy section.
    pub fn from_toml_str(s: &str) -> AuthzResult<Self> {
        let settings: AuthorizerSettings = toml::from_str(s).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to parse settings TOML: {}", e),
        })?;
        settings.policy.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> AuthzResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to read settings file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
