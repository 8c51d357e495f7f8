//! Error Types
//!
//! Every failure the client can surface to its caller.

use crate::client::ContentType;
use std::fmt;

/// Why an operation was abandoned before it completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's cancellation token fired
    Cancelled,

    /// The context deadline passed
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => write!(f, "context cancelled"),
            CancelReason::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

/// Main error type for API client operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed call or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The HTTP request could not be built (bad URL, bad header, ...)
    #[error("Error creating request: {0}")]
    RequestConstruction(String),

    /// Network, DNS or timeout failure while sending or reading
    #[error("Error performing request: {0}")]
    Transport(#[source] reqwest::Error),

    /// Final response status was 400 or above
    #[error("Request failed with status {code}: {body}")]
    Status { code: u16, body: String },

    /// Response body did not parse as the configured content type
    #[error("Error decoding {content_type} response: {message}")]
    Decode {
        content_type: ContentType,
        message: String,
    },

    /// A QPS call answered HTTP 200 but reported a failure `responseCode`
    #[error("Service returned {response_code}: {details}")]
    Service {
        response_code: String,
        details: String,
    },

    /// A MIME string that is neither JSON nor XML
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Cancellation or deadline fired during a send or a rate-limit wait
    #[error("Request aborted: {0}")]
    Cancelled(CancelReason),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status code for `Status` errors
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the operation was abandoned because of its context
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled(_))
    }

    /// Whether the transport gave up because the per-attempt timeout elapsed
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

/// Result type alias for API client operations
pub type Result<T> = std::result::Result<T, ApiError>;
