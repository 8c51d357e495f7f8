//! qualysapi - thin client for the Qualys REST/XML APIs
//!
//! One [`ApiClient`] per base URL: configure authentication, headers and
//! content types once, then issue `get`/`post` calls. Responses carrying a
//! rate-limit reset header are retried after waiting for the reset time.
//!
//! ```no_run
//! use qualysapi::{ApiClient, ContentType, RequestContext};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct ScanListOutput {
//!     #[serde(rename = "RESPONSE")]
//!     response: serde_json::Value,
//! }
//!
//! # async fn run() -> qualysapi::Result<()> {
//! let mut client = ApiClient::new("https://qualysapi.qg3.apps.qualys.com")?;
//! client.set_basic_auth("username", "password");
//! client.set_response_type(ContentType::Xml);
//! client.set_header("X-Requested-With", "qualysapi");
//!
//! let ctx = RequestContext::background();
//! let scans: ScanListOutput = client
//!     .get(&ctx, "/api/2.0/fo/scan/?action=list", None)
//!     .await?;
//! println!("{:?}", scans);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;

pub use client::{
    ApiClient, ContentType, RateLimitConfig, RateLimitDecision, RequestContext,
    DEFAULT_RATE_LIMIT_HEADER, DEFAULT_TIMEOUT,
};
pub use config::{ClientSettings, ConfigLoader, RateLimitSettings};
pub use error::{ApiError, CancelReason, Result};
