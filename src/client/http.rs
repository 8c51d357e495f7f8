//! API Client
//!
//! HTTP client with configurable content types, header authentication and a
//! retry loop driven by the rate-limit reset header.

use crate::client::content::ContentType;
use crate::client::context::RequestContext;
use crate::client::rate_limiter::{RateLimitConfig, RateLimitDecision};
use crate::config::ClientSettings;
use crate::error::{ApiError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Request, Response};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// Per-attempt transport timeout unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const AUTHORIZATION_HEADER: &str = "Authorization";

/// Client for one API base URL
///
/// Configuration setters take `&mut self` while requests take `&self`, so a
/// client cannot be reconfigured while one of its requests is in flight.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Prefix every request path is appended to
    base_url: String,

    /// Inner reqwest client
    http: Client,

    /// Static headers sent with every request
    headers: HashMap<String, String>,

    /// Format of request bodies
    request_type: ContentType,

    /// Format of response bodies
    response_type: ContentType,

    /// Retry policy for throttled responses
    rate_limit: RateLimitConfig,
}

impl ApiClient {
    /// Create a client with JSON requests, XML responses and a 30 second timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-attempt timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            base_url: base_url.into(),
            http,
            headers: HashMap::new(),
            request_type: ContentType::Json,
            response_type: ContentType::Xml,
            rate_limit: RateLimitConfig::default(),
        })
    }

    /// Create a client from loaded settings
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        settings.build_client()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn request_type(&self) -> ContentType {
        self.request_type
    }

    pub fn response_type(&self) -> ContentType {
        self.response_type
    }

    pub fn rate_limit(&self) -> &RateLimitConfig {
        &self.rate_limit
    }

    /// Set the format of request bodies
    pub fn set_request_type(&mut self, content_type: ContentType) {
        self.request_type = content_type;
    }

    /// Set the format of response bodies
    pub fn set_response_type(&mut self, content_type: ContentType) {
        self.response_type = content_type;
    }

    /// Alias for [`ApiClient::set_request_type`]
    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.request_type = content_type;
    }

    /// Replace the rate limiting configuration
    pub fn set_rate_limit_config(&mut self, config: RateLimitConfig) {
        self.rate_limit = config;
    }

    /// Send `Authorization: Bearer <token>`
    pub fn set_bearer_token(&mut self, token: &str) {
        self.set_header(AUTHORIZATION_HEADER, format!("Bearer {}", token));
    }

    /// Send `Authorization: Basic <base64(username:password)>`
    pub fn set_basic_auth(&mut self, username: &str, password: &str) {
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        self.set_header(AUTHORIZATION_HEADER, format!("Basic {}", encoded));
    }

    /// Set a custom header, replacing any previous value for the same name
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        // Header names are case-insensitive on the wire; keep one entry per name.
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
    }

    /// GET `path` and decode the response body
    pub async fn get<R: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<R> {
        let bytes = self.execute(ctx, Method::GET, path, body).await?;
        self.response_type.decode(&bytes)
    }

    /// POST `path` and decode the response body
    pub async fn post<R: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<R> {
        let bytes = self.execute(ctx, Method::POST, path, body).await?;
        self.response_type.decode(&bytes)
    }

    /// GET `path` and return the raw response body without decoding
    pub async fn get_raw(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Bytes> {
        self.execute(ctx, Method::GET, path, body).await
    }

    /// POST `path` and return the raw response body without decoding
    pub async fn post_raw(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Bytes> {
        self.execute(ctx, Method::POST, path, body).await
    }

    /// Build the request once; every attempt sends a clone of it
    fn build_request(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<Request> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let mut request = builder
            .build()
            .map_err(|e| ApiError::RequestConstruction(e.to_string()))?;

        let headers = request.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(self.request_type.as_mime()),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(self.response_type.as_mime()));

        for (key, value) in &self.headers {
            let name = HeaderName::try_from(key.as_str()).map_err(|e| {
                ApiError::RequestConstruction(format!("invalid header name '{}': {}", key, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ApiError::RequestConstruction(format!("invalid value for header '{}': {}", key, e))
            })?;
            headers.insert(name, value);
        }

        Ok(request)
    }

    /// Run the rate-limit retry loop and return the successful response body
    async fn execute(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Bytes> {
        let request = self.build_request(method, path, body)?;
        ctx.check()?;

        let max_attempts = self.rate_limit.max_attempts();
        let mut attempt = 0;

        let response = loop {
            attempt += 1;
            let response = self.send(ctx, &request).await?;

            let decision = self.rate_limit.inspect(response.headers());
            let wait = match decision {
                RateLimitDecision::NotLimited | RateLimitDecision::ResetElapsed => break response,
                RateLimitDecision::Unparsable(wait) => {
                    tracing::warn!(
                        header = %self.rate_limit.header_name,
                        attempt,
                        "unparsable rate limit reset value, using default wait"
                    );
                    wait
                }
                RateLimitDecision::WaitForReset(wait) => wait,
            };

            if attempt >= max_attempts {
                tracing::warn!(
                    url = %request.url(),
                    attempts = attempt,
                    "rate limit retries exhausted, using last response"
                );
                break response;
            }

            tracing::debug!(
                url = %request.url(),
                attempt,
                wait_ms = wait.as_millis() as u64,
                "rate limited, waiting before retry"
            );
            drop(response);
            ctx.sleep(wait).await?;
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = ctx.run(response.text()).await?.unwrap_or_default();
            return Err(ApiError::Status {
                code: status.as_u16(),
                body,
            });
        }

        ctx.run(response.bytes()).await?.map_err(ApiError::Transport)
    }

    /// Send one attempt; transport failures are never retried
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        let attempt = request.try_clone().ok_or_else(|| {
            ApiError::InvalidArgument("request body cannot be replayed".to_string())
        })?;

        ctx.run(self.http.execute(attempt))
            .await?
            .map_err(ApiError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let client = ApiClient::new("https://qualysapi.qualys.com").unwrap();
        assert_eq!(client.base_url(), "https://qualysapi.qualys.com");
        assert_eq!(client.request_type(), ContentType::Json);
        assert_eq!(client.response_type(), ContentType::Xml);
        assert_eq!(client.rate_limit(), &RateLimitConfig::default());
        assert!(client.headers().is_empty());
    }

    #[test]
    fn test_basic_auth_encoding() {
        let mut client = ApiClient::new("http://localhost").unwrap();
        client.set_basic_auth("alice", "secret");
        assert_eq!(
            client.headers().get("Authorization").map(String::as_str),
            Some("Basic YWxpY2U6c2VjcmV0")
        );
    }

    #[test]
    fn test_auth_helpers_overwrite_each_other() {
        let mut client = ApiClient::new("http://localhost").unwrap();
        client.set_basic_auth("u", "p");
        client.set_bearer_token("abc");
        assert_eq!(client.headers().len(), 1);
        assert_eq!(
            client.headers().get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_set_header_overwrites_by_name() {
        let mut client = ApiClient::new("http://localhost").unwrap();
        client.set_header("X-Requested-With", "first");
        client.set_header("x-requested-with", "second");
        assert_eq!(client.headers().len(), 1);
        assert_eq!(
            client.headers().get("x-requested-with").map(String::as_str),
            Some("second")
        );
    }

    #[test]
    fn test_content_type_alias_sets_request_only() {
        let mut client = ApiClient::new("http://localhost").unwrap();
        client.set_content_type(ContentType::Xml);
        client.set_response_type(ContentType::Json);
        assert_eq!(client.request_type(), ContentType::Xml);
        assert_eq!(client.response_type(), ContentType::Json);
    }

    #[test]
    fn test_build_request_applies_headers() {
        let mut client = ApiClient::new("http://localhost:8080").unwrap();
        client.set_response_type(ContentType::Json);
        client.set_header("X-Requested-With", "qualysapi");

        let request = client
            .build_request(
                Method::POST,
                "/qps/rest/2.0/search/am/asset",
                Some(Bytes::from("{}")),
            )
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/qps/rest/2.0/search/am/asset"
        );
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert_eq!(request.headers()["x-requested-with"], "qualysapi");
    }

    #[test]
    fn test_custom_header_overrides_content_type() {
        let mut client = ApiClient::new("http://localhost").unwrap();
        client.set_header("Content-Type", "application/x-www-form-urlencoded");

        let request = client.build_request(Method::POST, "/msp/user.php", None).unwrap();
        let values: Vec<_> = request.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["application/x-www-form-urlencoded"]);
    }

    #[test]
    fn test_invalid_header_fails_construction() {
        let mut client = ApiClient::new("http://localhost").unwrap();
        client.set_header("X-Bad", "line\nbreak");
        let err = client.build_request(Method::GET, "/", None).unwrap_err();
        assert!(matches!(err, ApiError::RequestConstruction(_)));
    }

    #[test]
    fn test_invalid_url_fails_construction() {
        let client = ApiClient::new("not a url").unwrap();
        let err = client.build_request(Method::GET, "/path", None).unwrap_err();
        assert!(matches!(err, ApiError::RequestConstruction(_)));
    }
}
