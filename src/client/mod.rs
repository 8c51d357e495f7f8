//! Client Module
//!
//! HTTP client, content types, request context and rate limiting.

pub mod content;
pub mod context;
pub mod http;
pub mod rate_limiter;

pub use content::ContentType;
pub use context::RequestContext;
pub use http::{ApiClient, DEFAULT_TIMEOUT};
pub use rate_limiter::{RateLimitConfig, RateLimitDecision, DEFAULT_RATE_LIMIT_HEADER};
