//! Where the verification-service secret lives.

use serde::{Deserialize, Serialize};

/// A closed set of credential sources, selected once at process start.
///
/// In TOML:
/// ```toml
/// [secret]
/// kind = "secret_store"
/// secret_id = "arn:aws:secretsmanager:us-east-1:123456789012:secret:recaptcha"
/// field = "secretKey"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretSource {
    /// The secret itself, configured inline. Never cached, never fetched.
    PlainText { value: String },

    /// A parameter-store entry, read with decryption.
    ParameterStore { name: String },

    /// A secret-store entry. With `field` set, the secret string is parsed as
    /// a JSON object and only that field is used.
    SecretStore {
        secret_id: String,
        #[serde(default)]
        field: Option<String>,
    },
}

impl SecretSource {
    /// Short label for logs. Never includes the secret itself.
    pub fn kind(&self) -> &'static str {
        match self {
            SecretSource::PlainText { .. } => "plain_text",
            SecretSource::ParameterStore { .. } => "parameter_store",
            SecretSource::SecretStore { .. } => "secret_store",
        }
    }
}
