//! Error types for the Market Data Gateway

use crate::notify::Severity;
use thiserror::Error;

/// Classified failure of a gateway operation
///
/// Every upstream failure is mapped onto one of the first four variants
/// before it reaches the caller or the notification sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Upstream answered with HTTP 429
    #[error("Rate limit exceeded. Please wait a moment.")]
    RateLimited,

    /// Request exceeded its deadline or was aborted by the transport
    #[error("Request timeout")]
    Timeout,

    /// No response was received at all (DNS or connectivity failure)
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Any other non-2xx response or a malformed payload
    #[error("Upstream error{}: {message}", status_suffix(.status))]
    Upstream {
        /// HTTP status, absent when the body could not be decoded
        status: Option<u16>,
        /// Response body or decoder message
        message: String,
    },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl GatewayError {
    /// Creates an Upstream error for a non-2xx status
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates an Upstream error for a body that is not valid JSON
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// Severity the failure is reported with
    pub fn severity(&self) -> Severity {
        match self {
            GatewayError::RateLimited => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RateLimited => "rate_limited",
            GatewayError::Timeout => "timeout",
            GatewayError::NetworkUnavailable(_) => "network_unavailable",
            GatewayError::Upstream { .. } => "upstream",
            GatewayError::Client(_) => "client",
        }
    }

    /// True for HTTP 429 responses
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::RateLimited)
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return GatewayError::Timeout;
        }

        if let Some(status) = err.status() {
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return GatewayError::RateLimited;
            }
            return GatewayError::status(status.as_u16(), err.to_string());
        }

        if err.is_decode() || err.is_body() {
            return GatewayError::malformed(err.to_string());
        }

        GatewayError::NetworkUnavailable(err.to_string())
    }
}
