//! Rate Limit Policy
//!
//! Reads the reset-timestamp header from a response and decides whether the
//! request should be retried, and after how long.

use crate::error::{ApiError, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName};
use std::time::Duration;

/// Header inspected for the rate-limit reset time unless configured otherwise
pub const DEFAULT_RATE_LIMIT_HEADER: &str = "X-RateLimit-Reset";

/// Retries attempted after the first request unless configured otherwise
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Wait used when the reset header cannot be parsed
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Response header carrying the reset time as Unix epoch seconds
    pub header_name: String,

    /// Retries allowed after the initial attempt
    pub max_retries: u32,

    /// Wait applied when the header is present but unparsable
    pub default_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            header_name: DEFAULT_RATE_LIMIT_HEADER.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            default_wait: DEFAULT_WAIT,
        }
    }
}

/// What to do with a response after looking at its rate-limit header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Header absent: the endpoint is not throttling us
    NotLimited,

    /// Header present but the reset time has already passed
    ResetElapsed,

    /// Header present but unparsable: wait the configured default, then retry
    Unparsable(Duration),

    /// Header names a future reset time: wait until then, then retry
    WaitForReset(Duration),
}

impl RateLimitDecision {
    /// Wait before the next attempt, or `None` if the response is final
    pub fn wait(&self) -> Option<Duration> {
        match self {
            RateLimitDecision::NotLimited | RateLimitDecision::ResetElapsed => None,
            RateLimitDecision::Unparsable(wait) | RateLimitDecision::WaitForReset(wait) => {
                Some(*wait)
            }
        }
    }
}

impl RateLimitConfig {
    /// Create a configuration
    pub fn new(header_name: impl Into<String>, max_retries: u32, default_wait: Duration) -> Self {
        Self {
            header_name: header_name.into(),
            max_retries,
            default_wait,
        }
    }

    /// Reject header names that could never match a response header
    pub fn validate(&self) -> Result<()> {
        if self.header_name.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "rate limit header name must not be empty".to_string(),
            ));
        }
        HeaderName::try_from(self.header_name.as_str()).map_err(|e| {
            ApiError::InvalidArgument(format!(
                "invalid rate limit header name '{}': {}",
                self.header_name, e
            ))
        })?;
        Ok(())
    }

    /// Total attempts the retry loop may make
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Classify a response's headers against the current time
    pub fn inspect(&self, headers: &HeaderMap) -> RateLimitDecision {
        self.inspect_at(headers, Utc::now())
    }

    /// Classify a response's headers against `now`
    pub fn inspect_at(&self, headers: &HeaderMap, now: DateTime<Utc>) -> RateLimitDecision {
        let value = match headers.get(self.header_name.as_str()) {
            Some(value) if !value.is_empty() => value,
            _ => return RateLimitDecision::NotLimited,
        };

        let reset = value
            .to_str()
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        let Some(reset) = reset else {
            return RateLimitDecision::Unparsable(self.default_wait);
        };

        match (reset - now).to_std() {
            Ok(wait) if !wait.is_zero() => RateLimitDecision::WaitForReset(wait),
            _ => RateLimitDecision::ResetElapsed,
        }
    }
}
