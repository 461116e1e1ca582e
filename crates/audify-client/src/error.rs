//! Error taxonomy for gateway calls.

use thiserror::Error;

/// Result alias for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures surfaced by the backend and Spotify gateways.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The caller cancelled the request before it settled.
    #[error("request cancelled")]
    Cancelled,
    /// The request never produced an HTTP response.
    #[error("request to {endpoint} failed: {message}")]
    Network {
        /// Endpoint path or URL.
        endpoint: String,
        /// Transport error detail.
        message: String,
    },
    /// The server refused the credentials (401/403).
    #[error("{endpoint} rejected the credentials: {message}")]
    Auth {
        /// Endpoint path or URL.
        endpoint: String,
        /// Server-provided detail.
        message: String,
    },
    /// Any other non-success status.
    #[error("{endpoint} returned status {status}: {message}")]
    Status {
        /// Endpoint path or URL.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Server-provided detail.
        message: String,
    },
    /// A success status carrying an `{"error": ...}` body.
    #[error("{endpoint} reported an error: {message}")]
    Rejected {
        /// Endpoint path or URL.
        endpoint: String,
        /// Server-provided detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode {
        /// Endpoint path or URL.
        endpoint: String,
        /// Decoder error detail.
        message: String,
    },
    /// An endpoint URL could not be built.
    #[error("invalid URL for {endpoint}: {message}")]
    InvalidUrl {
        /// Endpoint path or URL.
        endpoint: String,
        /// Parser error detail.
        message: String,
    },
}

impl GatewayError {
    /// Whether the failure is a user-initiated cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the failure stems from missing or insufficient permissions.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::Rejected { .. })
    }

    /// Short text suitable for an error dialog.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Cancelled => "Request cancelled".to_string(),
            Self::Network { .. } => {
                "Unable to reach the optimization service. Please try again later.".to_string()
            }
            Self::Auth { message, .. } | Self::Rejected { message, .. } => message.clone(),
            Self::Status {
                status, message, ..
            } => {
                if message.is_empty() {
                    format!("request failed with status {status}")
                } else {
                    message.clone()
                }
            }
            Self::Decode { .. } => "The service returned an unexpected response.".to_string(),
            Self::InvalidUrl { message, .. } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_distinguishable() {
        assert!(GatewayError::Cancelled.is_cancelled());
        let network = GatewayError::Network {
            endpoint: "/optimize_playlist".into(),
            message: "connection refused".into(),
        };
        assert!(!network.is_cancelled());
        assert!(!network.is_auth());
        assert_eq!(
            network.to_string(),
            "request to /optimize_playlist failed: connection refused"
        );
    }

    #[test]
    fn user_message_prefers_server_detail() {
        let rejected = GatewayError::Rejected {
            endpoint: "/reorder_playlist".into(),
            message: "Insufficient client scope".into(),
        };
        assert!(rejected.is_auth());
        assert_eq!(rejected.user_message(), "Insufficient client scope");

        let status = GatewayError::Status {
            endpoint: "/optimize_playlist".into(),
            status: 502,
            message: String::new(),
        };
        assert_eq!(status.user_message(), "request failed with status 502");
    }
}
