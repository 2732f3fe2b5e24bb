//! Policy configuration: score threshold and action allow-list.
//!
//! A `PolicyConfig` is loaded once at process start and never mutated.
//! It can come from a TOML document or from the two environment values the
//! deployment layer sets (`SCORE_THRESHOLD`, `ALLOWED_ACTIONS`).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use captcha_authz_contracts::error::{AuthzError, AuthzResult};

/// Lowest accepted threshold.
pub const MIN_SCORE_THRESHOLD: f64 = 0.0;
/// Highest accepted threshold.
pub const MAX_SCORE_THRESHOLD: f64 = 1.0;
/// Threshold used when none is configured.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

/// Example in TOML:
/// ```toml
/// score_threshold = 0.7
/// allowed_actions = ["login", "submit"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Minimum score a request needs. A score equal to the threshold passes.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,

    /// Action labels that may pass. Empty means nothing passes.
    #[serde(default)]
    pub allowed_actions: BTreeSet<String>,
}

fn default_score_threshold() -> f64 {
    DEFAULT_SCORE_THRESHOLD
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            allowed_actions: BTreeSet::new(),
        }
    }
}

impl PolicyConfig {
    /// Build a validated configuration.
    pub fn new<I, S>(score_threshold: f64, allowed_actions: I) -> AuthzResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = Self {
            score_threshold,
            allowed_actions: allowed_actions.into_iter().map(Into::into).collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse `s` as TOML and validate it.
    ///
    /// Returns `AuthzError::ConfigError` if the TOML is malformed, does not
    /// match the expected schema, or carries an out-of-range threshold.
    pub fn from_toml_str(s: &str) -> AuthzResult<Self> {
        let config: PolicyConfig = toml::from_str(s).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Build from the raw environment values.
    ///
    /// `score_threshold` is a numeric string; absent means the default.
    /// `allowed_actions` is a JSON array of strings; absent means empty.
    pub fn from_env_values(
        score_threshold: Option<&str>,
        allowed_actions: Option<&str>,
    ) -> AuthzResult<Self> {
        let score_threshold = match score_threshold.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<f64>().map_err(|e| AuthzError::ConfigError {
                reason: format!("SCORE_THRESHOLD '{}' is not a number: {}", raw, e),
            })?,
            None => DEFAULT_SCORE_THRESHOLD,
        };

        let allowed_actions: Vec<String> =
            match allowed_actions.map(str::trim).filter(|s| !s.is_empty()) {
                Some(raw) => serde_json::from_str(raw).map_err(|e| AuthzError::ConfigError {
                    reason: format!("ALLOWED_ACTIONS must be a JSON array of strings: {}", e),
                })?,
                None => Vec::new(),
            };

        Self::new(score_threshold, allowed_actions)
    }

    /// Reject thresholds outside [0.0, 1.0], including NaN.
    pub fn validate(&self) -> AuthzResult<()> {
        if !(MIN_SCORE_THRESHOLD..=MAX_SCORE_THRESHOLD).contains(&self.score_threshold) {
            return Err(AuthzError::ConfigError {
                reason: format!(
                    "score threshold must be between {:.1} and {:.1}, got {}",
                    MIN_SCORE_THRESHOLD, MAX_SCORE_THRESHOLD, self.score_threshold
                ),
            });
        }
        Ok(())
    }

    pub fn allows_action(&self, action: &str) -> bool {
        self.allowed_actions.contains(action)
    }
}
