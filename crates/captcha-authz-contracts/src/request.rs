//! The gateway's request-authorizer input event.
//!
//! Only the fields the authorizer reads are modelled; everything else in the
//! event is ignored during deserialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Header the client puts its verification token in, unless overridden.
pub const DEFAULT_TOKEN_HEADER: &str = "X-reCAPTCHA-Token";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// Identifier of the exact resource/method being invoked.
    pub method_arn: String,

    /// Request headers. The gateway sends `null` when there are none.
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,

    #[serde(default)]
    pub request_context: RequestContext,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub identity: RequestIdentity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdentity {
    #[serde(default)]
    pub source_ip: String,
}

impl AuthorizerRequest {
    /// Look up `name` case-insensitively.
    ///
    /// HTTP/1 clients keep their own casing while HTTP/2 lowercases, so an
    /// exact-match lookup would miss tokens depending on the client. Empty
    /// values are treated as absent, so a non-empty value under any casing
    /// wins over an empty one.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, value)| key.eq_ignore_ascii_case(name) && !value.is_empty())
            .map(|(_, value)| value.as_str())
    }

    pub fn source_ip(&self) -> &str {
        &self.request_context.identity.source_ip
    }
}
