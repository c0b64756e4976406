//! Error types for the SonarQube client.

use thiserror::Error;

/// Result type alias using [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by [`SonarQubeClient`](crate::SonarQubeClient) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Upstream {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected schema.
    #[error("Failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    /// The API path the failing call targeted, if any.
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Upstream { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Transport { endpoint, .. } => Some(*endpoint),
            Self::Build(_) => None,
        }
    }
}
