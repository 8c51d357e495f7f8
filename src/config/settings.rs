//! Client Settings
//!
//! Defines the configuration schema used to build an [`ApiClient`].

use crate::client::{ApiClient, ContentType, RateLimitConfig, DEFAULT_TIMEOUT};
use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Platform URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://qualysapi.qg3.apps.qualys.com";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL every request path is appended to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Username for basic authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Bearer token (takes precedence over basic authentication)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,

    /// Request body format, as a MIME string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_type: Option<ContentType>,

    /// Response body format, as a MIME string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ContentType>,

    /// Additional headers to send with requests
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Per-attempt transport timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Rate limit configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitSettings>,
}

/// Rate limit overrides; unset fields keep the client defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Header carrying the reset time (default: "X-RateLimit-Reset")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,

    /// Retries after the initial attempt (default: 3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Wait when the header is unparsable, in seconds (default: 5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_wait_secs: Option<u64>,
}

impl RateLimitSettings {
    /// Apply these overrides on top of the defaults
    pub fn resolve(&self) -> RateLimitConfig {
        let defaults = RateLimitConfig::default();
        RateLimitConfig {
            header_name: self.header_name.clone().unwrap_or(defaults.header_name),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            default_wait: self
                .default_wait_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_wait),
        }
    }

    fn merge(&mut self, other: RateLimitSettings) {
        if other.header_name.is_some() {
            self.header_name = other.header_name;
        }
        if other.max_retries.is_some() {
            self.max_retries = other.max_retries;
        }
        if other.default_wait_secs.is_some() {
            self.default_wait_secs = other.default_wait_secs;
        }
    }
}

impl ClientSettings {
    /// Merge another layer into this one (set fields in `other` win)
    pub fn merge(&mut self, other: ClientSettings) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        if other.bearer_token.is_some() {
            self.bearer_token = other.bearer_token;
        }
        if other.request_type.is_some() {
            self.request_type = other.request_type;
        }
        if other.response_type.is_some() {
            self.response_type = other.response_type;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }

        for (name, value) in other.headers {
            self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
            self.headers.insert(name, value);
        }

        if let Some(next) = other.rate_limit {
            self.rate_limit
                .get_or_insert_with(RateLimitSettings::default)
                .merge(next);
        }
    }

    /// Effective base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Effective transport timeout
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Effective rate limit policy
    pub fn rate_limit_config(&self) -> RateLimitConfig {
        self.rate_limit
            .as_ref()
            .map(RateLimitSettings::resolve)
            .unwrap_or_default()
    }

    /// Check the settings describe a usable client
    pub fn validate(&self) -> Result<()> {
        if self.base_url().trim().is_empty() {
            return Err(ApiError::Config("base_url must not be empty".to_string()));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(ApiError::InvalidArgument(
                "username and password must be configured together".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(ApiError::InvalidArgument(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.rate_limit_config().validate()
    }

    /// Build a client configured from these settings
    pub fn build_client(&self) -> Result<ApiClient> {
        self.validate()?;

        let mut client = ApiClient::with_timeout(self.base_url(), self.timeout())?;
        if let Some(request_type) = self.request_type {
            client.set_request_type(request_type);
        }
        if let Some(response_type) = self.response_type {
            client.set_response_type(response_type);
        }
        client.set_rate_limit_config(self.rate_limit_config());

        for (name, value) in &self.headers {
            client.set_header(name.as_str(), value.as_str());
        }

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            client.set_basic_auth(username, password);
        }
        if let Some(token) = &self.bearer_token {
            client.set_bearer_token(token);
        }

        Ok(client)
    }
}
