//! Provider configuration.
//!
//! Configuration arrives either as a deserialized file (the CLI reads TOML)
//! or as the flat `okta.*` property map a host query engine hands to its
//! group-provider factory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Property key for the Okta org domain.
pub const PROP_DOMAIN: &str = "okta.domain";
/// Property key for the OAuth client id.
pub const PROP_CLIENT_ID: &str = "okta.client.id";
/// Property key for the comma-separated OAuth scopes.
pub const PROP_SCOPES: &str = "okta.scopes";
/// Property key for the private key file path.
pub const PROP_PRIVATE_KEY_PATH: &str = "okta.private.key.path";
/// Property key for the group name pattern.
pub const PROP_GROUP_PATTERN: &str = "okta.group.pattern";

/// Configuration for [`crate::provider::OktaGroupProvider`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OktaProviderConfig {
    /// The Okta org domain (e.g., "dev-123456.okta.com").
    pub domain: String,

    /// OAuth client id of the service app registered with Okta.
    pub client_id: String,

    /// OAuth scopes to request (default: `["okta.users.read"]`).
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Path to the PEM-style private key file.
    pub private_key_path: PathBuf,

    /// Group name pattern (default: `.*`, passing names through unchanged).
    #[serde(default = "default_group_pattern")]
    pub group_pattern: String,

    /// HTTP request timeout (default: 30 seconds).
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Whether to allow a plain-HTTP org URL.
    /// This should only be enabled for testing.
    #[serde(default)]
    pub allow_http: bool,
}

fn default_scopes() -> Vec<String> {
    vec!["okta.users.read".to_string()]
}

fn default_group_pattern() -> String {
    ".*".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl OktaProviderConfig {
    /// Creates a configuration with required fields and defaults elsewhere.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        private_key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            scopes: default_scopes(),
            private_key_path: private_key_path.into(),
            group_pattern: default_group_pattern(),
            request_timeout: default_request_timeout(),
            allow_http: false,
        }
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the group name pattern.
    #[must_use]
    pub fn with_group_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.group_pattern = pattern.into();
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Allows a plain-HTTP org URL (for testing only).
    #[must_use]
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }

    /// Builds a configuration from flat `okta.*` engine properties.
    ///
    /// Recognized keys: [`PROP_DOMAIN`], [`PROP_CLIENT_ID`],
    /// [`PROP_SCOPES`] (comma-separated), [`PROP_PRIVATE_KEY_PATH`],
    /// [`PROP_GROUP_PATTERN`]. Domain, client id, and key path are
    /// required; the rest fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required property is absent or a
    /// value is unusable.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let domain = required(properties, PROP_DOMAIN)?;
        let client_id = required(properties, PROP_CLIENT_ID)?;
        let private_key_path = PathBuf::from(required(properties, PROP_PRIVATE_KEY_PATH)?);

        let scopes = match properties.get(PROP_SCOPES) {
            Some(value) => {
                let scopes: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if scopes.is_empty() {
                    return Err(ConfigError::InvalidProperty {
                        key: PROP_SCOPES,
                        message: "scope list is empty".to_string(),
                    });
                }
                scopes
            }
            None => default_scopes(),
        };

        let group_pattern = properties
            .get(PROP_GROUP_PATTERN)
            .cloned()
            .unwrap_or_else(default_group_pattern);

        Ok(Self {
            domain,
            client_id,
            scopes,
            private_key_path,
            group_pattern,
            request_timeout: default_request_timeout(),
            allow_http: false,
        })
    }
}

fn required(properties: &HashMap<String, String>, key: &'static str) -> Result<String, ConfigError> {
    properties
        .get(key)
        .filter(|value| !value.trim().is_empty())
        .cloned()
        .ok_or(ConfigError::MissingProperty(key))
}
